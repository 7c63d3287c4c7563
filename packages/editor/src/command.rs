//! Commands accepted by a document.

use crate::line_edits::{LineRange, TextMutation};
use crate::mutations::TreeMutation;

/// Something the interpreter asks a document to do.
///
/// Mutations are recorded in the document's history. Queries only report.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tree(TreeMutation),
    Text(TextMutation),
    Query(Query),
}

/// Read-only reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Box-drawing outline of a structural document
    Tree,
    /// Numbered lines of a flat document
    Show { range: Option<LineRange> },
}

impl Command {
    /// Only mutations are recorded.
    pub fn can_undo(&self) -> bool {
        !matches!(self, Command::Query(_))
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Command::Tree(mutation) => mutation.verb(),
            Command::Text(mutation) => mutation.verb(),
            Command::Query(Query::Tree) => "xml-tree",
            Command::Query(Query::Show { .. }) => "show",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Command::Tree(mutation) => mutation.describe(),
            Command::Text(mutation) => mutation.describe(),
            Command::Query(Query::Show {
                range: Some(LineRange { start, end }),
            }) => format!("show {start}:{end}"),
            Command::Query(_) => self.verb().to_string(),
        }
    }
}

impl From<TreeMutation> for Command {
    fn from(mutation: TreeMutation) -> Self {
        Command::Tree(mutation)
    }
}

impl From<TextMutation> for Command {
    fn from(mutation: TextMutation) -> Self {
        Command::Text(mutation)
    }
}

impl From<Query> for Command {
    fn from(query: Query) -> Self {
        Command::Query(query)
    }
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// A mutation was applied and recorded; carries its description
    Applied(String),
    /// A mutation succeeded without changing anything; not recorded
    Unchanged(String),
    /// A query produced these lines
    Report(Vec<String>),
}
