//! # Undo/Redo Stack
//!
//! Per-document edit history.
//!
//! ## Design
//!
//! - Each recorded edit carries its own inverse data
//! - Undo pops the most recent edit, inverts it and moves it to the redo stack
//! - Redo pops the most recently undone edit and replays it
//! - Recording a new edit clears the redo stack
//! - An edit lives in exactly one of the two stacks
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let edit = TreeMutation::DeleteSubtree { id: "book1".into() }.apply(&mut tree)?;
//! stack.record(edit);
//!
//! stack.undo(&mut tree)?;
//! stack.redo(&mut tree)?;
//! ```

use crate::errors::{EditorError, HistoryAction};
use crate::mutation_trait::Reversible;

/// Undo/redo stack over edits of type `E`
#[derive(Debug)]
pub struct UndoStack<E> {
    /// Applied edits (most recent last)
    undo_stack: Vec<E>,

    /// Undone edits (most recent last)
    redo_stack: Vec<E>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Edits dropped off the bottom because of `max_levels`
    dropped: usize,
}

impl<E> UndoStack<E> {
    /// Create an unlimited undo stack
    pub fn new() -> Self {
        Self::with_max_levels(0)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            dropped: 0,
        }
    }

    /// Record an edit that has just been applied
    pub fn record(&mut self, edit: E) {
        self.undo_stack.push(edit);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
            self.dropped += 1;
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Undo the most recent edit, returning its description
    pub fn undo(&mut self, target: &mut E::Target) -> Result<String, EditorError>
    where
        E: Reversible,
    {
        let mut edit = self
            .undo_stack
            .pop()
            .ok_or(EditorError::EmptyHistory(HistoryAction::Undo))?;
        edit.undo(target);
        let description = edit.description();
        self.redo_stack.push(edit);
        Ok(description)
    }

    /// Redo the most recently undone edit, returning its description
    pub fn redo(&mut self, target: &mut E::Target) -> Result<String, EditorError>
    where
        E: Reversible,
    {
        let mut edit = self
            .redo_stack
            .pop()
            .ok_or(EditorError::EmptyHistory(HistoryAction::Redo))?;
        edit.redo(target);
        let description = edit.description();
        self.undo_stack.push(edit);
        Ok(description)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// True when every recorded edit has been undone and none was trimmed
    pub fn at_origin(&self) -> bool {
        self.undo_stack.is_empty() && self.dropped == 0
    }

    pub fn set_max_levels(&mut self, max_levels: usize) {
        self.max_levels = max_levels;
        if max_levels > 0 && self.undo_stack.len() > max_levels {
            let excess = self.undo_stack.len() - max_levels;
            self.undo_stack.drain(..excess);
            self.dropped += excess;
        }
    }
}

impl<E: Reversible> UndoStack<E> {
    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|edit| edit.description())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|edit| edit.description())
    }
}

impl<E> Default for UndoStack<E> {
    fn default() -> Self {
        Self::new()
    }
}
