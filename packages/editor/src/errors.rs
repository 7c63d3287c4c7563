//! Error types for the editor

use crate::document::DocumentKind;
use quire_parser::{ParseError, TreeError};
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable editing failures. A failed command leaves the document and
/// its history untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("No active document")]
    NoActiveDocument,

    #[error("Document is not open: {}", .0.display())]
    NotOpen(PathBuf),

    #[error("Document is already open: {}", .0.display())]
    AlreadyOpen(PathBuf),

    #[error("Nothing to {0}")]
    EmptyHistory(HistoryAction),

    #[error("Command needs a {expected} document, active document is {found}")]
    WrongKind {
        expected: DocumentKind,
        found: DocumentKind,
    },

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),
}

/// Which way through the history a replay was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryAction::Undo => write!(f, "undo"),
            HistoryAction::Redo => write!(f, "redo"),
        }
    }
}

impl EditorError {
    pub fn wrong_kind(expected: DocumentKind, found: DocumentKind) -> Self {
        Self::WrongKind { expected, found }
    }

    pub fn invalid_position(message: impl Into<String>) -> Self {
        Self::InvalidPosition(message.into())
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::OutOfRange(message.into())
    }
}
