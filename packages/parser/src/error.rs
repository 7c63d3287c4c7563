use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Malformed markup. Every variant means the source has no usable
/// single-root element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed markup: no root element found")]
    MissingRoot,

    #[error("Malformed markup at {pos}: <{tag}> is never closed")]
    UnclosedTag { tag: String, pos: usize },

    #[error("Malformed markup: duplicate element id '{id}'")]
    DuplicateId { id: String },
}

impl ParseError {
    pub fn unclosed(tag: impl Into<String>, pos: usize) -> Self {
        Self::UnclosedTag {
            tag: tag.into(),
            pos,
        }
    }

    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }
}

/// Structural mutation failures. A failed mutation leaves the tree untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Element id already exists: {0}")]
    DuplicateId(String),

    #[error("Cannot delete the root element")]
    CannotDeleteRoot,

    #[error("Cannot insert before the root element")]
    CannotInsertBeforeRoot,

    #[error("Element tag must not be empty")]
    EmptyTag,

    #[error("Element id must not be empty")]
    EmptyId,
}
