//! # Quire Editor
//!
//! Document model and command engine for Quire.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup text → ElementTree           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: documents + reversible commands     │
//! │  - TreeMutation / TextMutation → edits      │
//! │  - per-document UndoStack                   │
//! │  - Workspace registry (active, recent)      │
//! │  - EditSession notifies post-effects        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ workspace: storage, snapshots, command log  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Every edit is invertible**: applying a command yields an edit that
//!    carries its own inverse data
//! 2. **Fail before writing**: a rejected command leaves document and history
//!    untouched
//! 3. **History is private**: each document owns its undo stack
//! 4. **No ambient state**: one explicitly constructed workspace per session
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_editor::{Command, Document, DocumentKind, EditSession, TreeMutation};
//!
//! let mut session = EditSession::default();
//! session.open(Document::empty("books.xml", DocumentKind::Structural))?;
//!
//! session.execute(&Command::Tree(TreeMutation::AppendChild {
//!     tag: "book".into(),
//!     new_id: "book1".into(),
//!     parent_id: "root".into(),
//!     text: Some("Rust".into()),
//! }))?;
//!
//! session.undo()?;
//! session.redo()?;
//! ```

mod command;
mod document;
mod errors;
mod line_edits;
mod mutation_trait;
mod mutations;
mod post_effects;
mod session;
mod undo_stack;
mod workspace;

pub use command::{Command, CommandOutput, Query};
pub use document::{Document, DocumentContent, DocumentKind, DocumentState};
pub use errors::{EditorError, HistoryAction};
pub use line_edits::{LineBuffer, LineRange, Position, TextEdit, TextMutation};
pub use mutation_trait::Reversible;
pub use mutations::{TreeEdit, TreeMutation};
pub use post_effects::PostEffect;
pub use session::EditSession;
pub use undo_stack::UndoStack;
pub use workspace::Workspace;

// Re-export parser types for convenience
pub use quire_parser::{Element, ElementTree, Markup, ParseError, TreeError};
