//! # Document Handle
//!
//! A Document is one open file: its content, its modification state and its
//! private edit history.
//!
//! Content is either:
//! - **Flat**: a list of lines edited by `line:col` position
//! - **Structural**: an element tree edited by element id
//!
//! ## State
//!
//! ```text
//!            apply / redo
//!   Normal ───────────────▶ Modified
//!     ▲                        │
//!     └────────────────────────┘
//!      undo back to origin, or save
//! ```

use crate::command::{Command, CommandOutput, Query};
use crate::errors::EditorError;
use crate::line_edits::{LineBuffer, TextEdit};
use crate::mutation_trait::Reversible;
use crate::mutations::TreeEdit;
use crate::undo_stack::UndoStack;
use quire_parser::{parse, render_tree, serialize, ElementTree, Markup, LOG_DIRECTIVE_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Flat text or structural markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "text")]
    Flat,
    #[serde(rename = "xml")]
    Structural,
}

impl DocumentKind {
    /// `.xml` files are structural, everything else is flat.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => DocumentKind::Structural,
            _ => DocumentKind::Flat,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Flat => "txt",
            DocumentKind::Structural => "xml",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Flat => write!(f, "text"),
            DocumentKind::Structural => write!(f, "xml"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    #[default]
    Normal,
    Modified,
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentState::Normal => write!(f, "normal"),
            DocumentState::Modified => write!(f, "modified"),
        }
    }
}

/// Owned content plus the history that edits it.
#[derive(Debug)]
pub enum DocumentContent {
    Flat {
        buffer: LineBuffer,
        history: UndoStack<TextEdit>,
    },
    Structural {
        markup: Markup,
        history: UndoStack<TreeEdit>,
    },
}

/// Editable document
#[derive(Debug)]
pub struct Document {
    /// Identity within the workspace
    pub path: PathBuf,

    /// Increments on every apply, undo and redo
    pub version: u64,

    state: DocumentState,
    content: DocumentContent,
}

impl Document {
    pub fn flat(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        Self::with_content(
            path.into(),
            DocumentContent::Flat {
                buffer: LineBuffer::from_lines(lines),
                history: UndoStack::new(),
            },
        )
    }

    pub fn structural(path: impl Into<PathBuf>, markup: Markup) -> Self {
        Self::with_content(
            path.into(),
            DocumentContent::Structural {
                markup,
                history: UndoStack::new(),
            },
        )
    }

    /// Empty document of the given kind. Structural documents start with
    /// `<root id="root"></root>`.
    pub fn empty(path: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Flat => Self::flat(path, Vec::new()),
            DocumentKind::Structural => Self::structural(path, Markup::default()),
        }
    }

    /// Build a document from raw file lines.
    pub fn from_lines(
        path: impl Into<PathBuf>,
        kind: DocumentKind,
        lines: Vec<String>,
    ) -> Result<Self, EditorError> {
        match kind {
            DocumentKind::Flat => Ok(Self::flat(path, lines)),
            DocumentKind::Structural => {
                let markup = parse(&lines.join("\n"))?;
                Ok(Self::structural(path, markup))
            }
        }
    }

    fn with_content(path: PathBuf, content: DocumentContent) -> Self {
        Self {
            path,
            version: 0,
            state: DocumentState::Normal,
            content,
        }
    }

    pub fn with_state(mut self, state: DocumentState) -> Self {
        self.state = state;
        self
    }

    /// Limit the number of undo levels (0 = unlimited)
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        match &mut self.content {
            DocumentContent::Flat { history, .. } => history.set_max_levels(limit),
            DocumentContent::Structural { history, .. } => history.set_max_levels(limit),
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> DocumentKind {
        match self.content {
            DocumentContent::Flat { .. } => DocumentKind::Flat,
            DocumentContent::Structural { .. } => DocumentKind::Structural,
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn is_modified(&self) -> bool {
        self.state == DocumentState::Modified
    }

    pub fn content(&self) -> &DocumentContent {
        &self.content
    }

    pub fn markup(&self) -> Option<&Markup> {
        match &self.content {
            DocumentContent::Structural { markup, .. } => Some(markup),
            DocumentContent::Flat { .. } => None,
        }
    }

    pub fn tree(&self) -> Option<&ElementTree> {
        self.markup().map(|markup| &markup.tree)
    }

    pub fn lines(&self) -> Option<&[String]> {
        match &self.content {
            DocumentContent::Flat { buffer, .. } => Some(buffer.lines()),
            DocumentContent::Structural { .. } => None,
        }
    }

    /// The `# log …` directive, if the document carries one.
    pub fn log_directive(&self) -> Option<&str> {
        match &self.content {
            DocumentContent::Flat { buffer, .. } => buffer
                .line(1)
                .filter(|line| line.trim_start().starts_with(LOG_DIRECTIVE_PREFIX)),
            DocumentContent::Structural { markup, .. } => markup.log_directive.as_deref(),
        }
    }

    /// Execute a command against the owned content.
    ///
    /// Mutations are recorded and mark the document modified. Queries and
    /// mutations that change nothing leave both history and state alone.
    /// On error nothing changes.
    pub fn apply(&mut self, command: &Command) -> Result<CommandOutput, EditorError> {
        let found = self.kind();
        let description = match command {
            Command::Query(query) => return self.query(query),

            Command::Tree(mutation) => match &mut self.content {
                DocumentContent::Structural { markup, history } => {
                    let edit = mutation.apply(&mut markup.tree)?;
                    debug_assert_eq!(markup.tree.check_invariants(), Ok(()));
                    if edit.is_noop() {
                        return Ok(CommandOutput::Unchanged(mutation.describe()));
                    }
                    history.record(edit);
                    mutation.describe()
                }
                DocumentContent::Flat { .. } => {
                    return Err(EditorError::wrong_kind(DocumentKind::Structural, found))
                }
            },

            Command::Text(mutation) => match &mut self.content {
                DocumentContent::Flat { buffer, history } => {
                    let edit = mutation.apply(buffer)?;
                    if edit.is_noop() {
                        return Ok(CommandOutput::Unchanged(mutation.describe()));
                    }
                    history.record(edit);
                    mutation.describe()
                }
                DocumentContent::Structural { .. } => {
                    return Err(EditorError::wrong_kind(DocumentKind::Flat, found))
                }
            },
        };

        self.version += 1;
        self.state = DocumentState::Modified;
        tracing::debug!(path = %self.path.display(), command = %description, version = self.version, "applied");
        Ok(CommandOutput::Applied(description))
    }

    /// Run a read-only report.
    pub fn query(&self, query: &Query) -> Result<CommandOutput, EditorError> {
        let lines = match (query, &self.content) {
            (Query::Tree, DocumentContent::Structural { markup, .. }) => render_tree(&markup.tree),
            (Query::Show { range }, DocumentContent::Flat { buffer, .. }) => buffer.show(*range)?,
            (Query::Tree, DocumentContent::Flat { .. }) => {
                return Err(EditorError::wrong_kind(DocumentKind::Structural, self.kind()))
            }
            (Query::Show { .. }, DocumentContent::Structural { .. }) => {
                return Err(EditorError::wrong_kind(DocumentKind::Flat, self.kind()))
            }
        };
        Ok(CommandOutput::Report(lines))
    }

    /// Undo the most recent edit. The document is back to Normal once the
    /// history returns to where it started.
    pub fn undo(&mut self) -> Result<String, EditorError> {
        let (description, at_origin) = match &mut self.content {
            DocumentContent::Flat { buffer, history } => {
                (history.undo(buffer)?, history.at_origin())
            }
            DocumentContent::Structural { markup, history } => {
                let description = history.undo(&mut markup.tree)?;
                debug_assert_eq!(markup.tree.check_invariants(), Ok(()));
                (description, history.at_origin())
            }
        };

        self.version += 1;
        if at_origin {
            self.state = DocumentState::Normal;
        }
        tracing::debug!(path = %self.path.display(), command = %description, state = %self.state, "undone");
        Ok(description)
    }

    /// Redo the most recently undone edit. Always marks the document
    /// modified.
    pub fn redo(&mut self) -> Result<String, EditorError> {
        let description = match &mut self.content {
            DocumentContent::Flat { buffer, history } => history.redo(buffer)?,
            DocumentContent::Structural { markup, history } => {
                let description = history.redo(&mut markup.tree)?;
                debug_assert_eq!(markup.tree.check_invariants(), Ok(()));
                description
            }
        };

        self.version += 1;
        self.state = DocumentState::Modified;
        tracing::debug!(path = %self.path.display(), command = %description, "redone");
        Ok(description)
    }

    pub fn can_undo(&self) -> bool {
        match &self.content {
            DocumentContent::Flat { history, .. } => history.can_undo(),
            DocumentContent::Structural { history, .. } => history.can_undo(),
        }
    }

    pub fn can_redo(&self) -> bool {
        match &self.content {
            DocumentContent::Flat { history, .. } => history.can_redo(),
            DocumentContent::Structural { history, .. } => history.can_redo(),
        }
    }

    pub fn undo_levels(&self) -> usize {
        match &self.content {
            DocumentContent::Flat { history, .. } => history.undo_levels(),
            DocumentContent::Structural { history, .. } => history.undo_levels(),
        }
    }

    pub fn redo_levels(&self) -> usize {
        match &self.content {
            DocumentContent::Flat { history, .. } => history.redo_levels(),
            DocumentContent::Structural { history, .. } => history.redo_levels(),
        }
    }

    /// Lines to write to disk.
    pub fn serialize(&self) -> Vec<String> {
        match &self.content {
            DocumentContent::Flat { buffer, .. } => buffer.lines().to_vec(),
            DocumentContent::Structural { markup, .. } => serialize(markup),
        }
    }

    /// Called once the serialized lines are on disk.
    pub fn mark_saved(&mut self) {
        self.state = DocumentState::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_edits::{Position, TextMutation};
    use crate::mutations::TreeMutation;

    fn append(text: &str) -> Command {
        Command::Text(TextMutation::Append {
            text: text.to_string(),
        })
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(DocumentKind::from_path(Path::new("a.xml")), DocumentKind::Structural);
        assert_eq!(DocumentKind::from_path(Path::new("a.XML")), DocumentKind::Structural);
        assert_eq!(DocumentKind::from_path(Path::new("a.txt")), DocumentKind::Flat);
        assert_eq!(DocumentKind::from_path(Path::new("notes")), DocumentKind::Flat);
    }

    #[test]
    fn test_apply_marks_modified() {
        let mut doc = Document::flat("a.txt", Vec::new());
        assert_eq!(doc.state(), DocumentState::Normal);

        let output = doc.apply(&append("hello")).unwrap();
        assert_eq!(output, CommandOutput::Applied(r#"append "hello""#.to_string()));
        assert!(doc.is_modified());
        assert_eq!(doc.version, 1);
        assert_eq!(doc.serialize(), vec!["hello"]);
    }

    #[test]
    fn test_query_is_not_recorded() {
        let mut doc = Document::flat("a.txt", vec!["one".to_string()]);
        let output = doc.apply(&Command::Query(Query::Show { range: None })).unwrap();

        assert_eq!(output, CommandOutput::Report(vec!["1: one".to_string()]));
        assert_eq!(doc.state(), DocumentState::Normal);
        assert!(!doc.can_undo());
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn test_wrong_kind() {
        let mut doc = Document::flat("a.txt", Vec::new());
        let err = doc
            .apply(&Command::Tree(TreeMutation::DeleteSubtree {
                id: "x".to_string(),
            }))
            .unwrap_err();
        assert_eq!(
            err,
            EditorError::wrong_kind(DocumentKind::Structural, DocumentKind::Flat)
        );
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_failed_command_keeps_state_and_history() {
        let mut doc = Document::flat("a.txt", vec!["abc".to_string()]);
        let err = doc.apply(&Command::Text(TextMutation::Insert {
            at: Position::new(4, 1),
            text: "x".to_string(),
        }));
        assert!(err.is_err());
        assert!(!doc.is_modified());
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_undo_to_origin_returns_to_normal() {
        let mut doc = Document::flat("a.txt", Vec::new());
        doc.apply(&append("a")).unwrap();
        doc.apply(&append("b")).unwrap();

        doc.undo().unwrap();
        assert!(doc.is_modified());
        doc.undo().unwrap();
        assert_eq!(doc.state(), DocumentState::Normal);

        doc.redo().unwrap();
        assert!(doc.is_modified());
    }

    #[test]
    fn test_mark_saved() {
        let mut doc = Document::flat("a.txt", Vec::new());
        doc.apply(&append("a")).unwrap();
        doc.mark_saved();
        assert_eq!(doc.state(), DocumentState::Normal);
        assert!(doc.can_undo());
    }

    #[test]
    fn test_log_directive() {
        let flat = Document::flat("a.txt", vec!["# log -e append".to_string(), "x".to_string()]);
        assert_eq!(flat.log_directive(), Some("# log -e append"));

        let plain = Document::flat("b.txt", vec!["x".to_string()]);
        assert_eq!(plain.log_directive(), None);

        let xml = Document::from_lines(
            "c.xml",
            DocumentKind::Structural,
            vec!["# log".to_string(), r#"<root id="root"></root>"#.to_string()],
        )
        .unwrap();
        assert_eq!(xml.log_directive(), Some("# log"));
    }

    #[test]
    fn test_empty_structural_document() {
        let doc = Document::empty("new.xml", DocumentKind::Structural);
        assert_eq!(doc.tree().unwrap().root_element().id(), Some("root"));
        assert_eq!(doc.serialize().len(), 2);
    }

    #[test]
    fn test_malformed_markup_rejected() {
        let err = Document::from_lines(
            "bad.xml",
            DocumentKind::Structural,
            vec!["not markup".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::Parse(_)));
    }
}
