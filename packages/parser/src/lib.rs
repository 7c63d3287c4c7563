//! # Quire Parser
//!
//! Structural document model for Quire: the arena-backed [`ElementTree`]
//! with its id index, the markup tokenizer and parser, the line serializer
//! and the box-drawing tree view.

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod tokenizer;
pub mod tree;
pub mod tree_view;

pub use ast::{Attributes, Element, ID_ATTRIBUTE};
pub use error::{ParseError, ParseResult, TreeError};
pub use parser::{parse, Markup, Parser, DEFAULT_DECLARATION, LOG_DIRECTIVE_PREFIX};
pub use serializer::{serialize, Serializer};
pub use tokenizer::{tokenize, Token};
pub use tree::{ElementRef, ElementTree, NodeId, Subtree};
pub use tree_view::render_tree;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tree_has_root_id() {
        let markup = Markup::default();
        assert_eq!(markup.tree.root_element().id(), Some("root"));
        assert_eq!(
            serialize(&markup),
            vec![DEFAULT_DECLARATION.to_string(), r#"<root id="root"></root>"#.to_string()]
        );
    }
}
