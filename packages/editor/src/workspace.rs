//! # Workspace Registry
//!
//! The set of open documents, which one is active, and the order in which
//! they were last activated.
//!
//! ## Invariants
//!
//! - `recent` holds every open path exactly once, most recently activated last
//! - if a document is active it is open and it is the last entry of `recent`
//!
//! Closing a modified document is the caller's decision. The registry only
//! removes it.

use crate::command::{Command, CommandOutput};
use crate::document::Document;
use crate::errors::EditorError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct Workspace {
    documents: HashMap<PathBuf, Document>,
    active: Option<PathBuf>,
    recent: Vec<PathBuf>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document and make it active.
    pub fn open(&mut self, document: Document) -> Result<(), EditorError> {
        let path = document.path.clone();
        if self.documents.contains_key(&path) {
            return Err(EditorError::AlreadyOpen(path));
        }

        tracing::info!(path = %path.display(), kind = %document.kind(), "opened document");
        self.documents.insert(path.clone(), document);
        self.activate(&path)
    }

    /// Remove a document. If it was active, the most recently activated
    /// remaining document becomes active.
    pub fn close(&mut self, path: &Path) -> Result<Document, EditorError> {
        let document = self
            .documents
            .remove(path)
            .ok_or_else(|| EditorError::NotOpen(path.to_path_buf()))?;

        self.recent.retain(|p| p != path);
        if self.active.as_deref() == Some(path) {
            self.active = self.recent.last().cloned();
        }

        tracing::info!(
            path = %path.display(),
            active = ?self.active,
            "closed document"
        );
        Ok(document)
    }

    /// Make an open document active and move it to the tail of `recent`.
    pub fn activate(&mut self, path: &Path) -> Result<(), EditorError> {
        if !self.documents.contains_key(path) {
            return Err(EditorError::NotOpen(path.to_path_buf()));
        }

        self.recent.retain(|p| p != path);
        self.recent.push(path.to_path_buf());
        self.active = Some(path.to_path_buf());
        Ok(())
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    pub fn current(&self) -> Result<&Document, EditorError> {
        self.active
            .as_ref()
            .and_then(|path| self.documents.get(path))
            .ok_or(EditorError::NoActiveDocument)
    }

    pub fn current_mut(&mut self) -> Result<&mut Document, EditorError> {
        self.active
            .as_ref()
            .and_then(|path| self.documents.get_mut(path))
            .ok_or(EditorError::NoActiveDocument)
    }

    pub fn get(&self, path: &Path) -> Result<&Document, EditorError> {
        self.documents
            .get(path)
            .ok_or_else(|| EditorError::NotOpen(path.to_path_buf()))
    }

    pub fn get_mut(&mut self, path: &Path) -> Result<&mut Document, EditorError> {
        self.documents
            .get_mut(path)
            .ok_or_else(|| EditorError::NotOpen(path.to_path_buf()))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.documents.contains_key(path)
    }

    /// Open paths, least recently activated first.
    pub fn recent(&self) -> &[PathBuf] {
        &self.recent
    }

    /// Open documents in `recent` order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.recent.iter().filter_map(|path| self.documents.get(path))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn has_modified(&self) -> bool {
        self.documents.values().any(Document::is_modified)
    }

    /// Run a command against the active document.
    pub fn execute(&mut self, command: &Command) -> Result<CommandOutput, EditorError> {
        self.current_mut()?.apply(command)
    }

    pub fn undo(&mut self) -> Result<String, EditorError> {
        self.current_mut()?.undo()
    }

    pub fn redo(&mut self) -> Result<String, EditorError> {
        self.current_mut()?.redo()
    }

    /// Check the registry invariants. Used by tests.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.recent.len() != self.documents.len() {
            return Err(format!(
                "{} recent entries for {} open documents",
                self.recent.len(),
                self.documents.len()
            ));
        }
        for path in &self.recent {
            if !self.documents.contains_key(path) {
                return Err(format!("{} is recent but not open", path.display()));
            }
        }
        match &self.active {
            Some(active) if self.recent.last() != Some(active) => {
                Err(format!("active {} is not the most recent", active.display()))
            }
            None if !self.documents.is_empty() => Err("documents open but none active".to_string()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;

    fn doc(path: &str) -> Document {
        Document::empty(path, DocumentKind::Flat)
    }

    #[test]
    fn test_open_activates() {
        let mut ws = Workspace::new();
        ws.open(doc("a.txt")).unwrap();
        ws.open(doc("b.txt")).unwrap();

        assert_eq!(ws.active_path(), Some(Path::new("b.txt")));
        assert_eq!(ws.recent(), &[PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert!(ws.check_invariants().is_ok());
    }

    #[test]
    fn test_open_twice_fails() {
        let mut ws = Workspace::new();
        ws.open(doc("a.txt")).unwrap();
        assert_eq!(
            ws.open(doc("a.txt")).unwrap_err(),
            EditorError::AlreadyOpen(PathBuf::from("a.txt"))
        );
    }

    #[test]
    fn test_reactivation_moves_to_tail() {
        let mut ws = Workspace::new();
        ws.open(doc("a.txt")).unwrap();
        ws.open(doc("b.txt")).unwrap();
        ws.open(doc("c.txt")).unwrap();

        ws.activate(Path::new("a.txt")).unwrap();
        assert_eq!(
            ws.recent(),
            &[
                PathBuf::from("b.txt"),
                PathBuf::from("c.txt"),
                PathBuf::from("a.txt")
            ]
        );
        assert!(ws.check_invariants().is_ok());
    }

    #[test]
    fn test_close_active_falls_back_to_recent_tail() {
        let mut ws = Workspace::new();
        ws.open(doc("a.txt")).unwrap();
        ws.open(doc("b.txt")).unwrap();
        ws.activate(Path::new("a.txt")).unwrap();

        ws.close(Path::new("a.txt")).unwrap();
        assert_eq!(ws.active_path(), Some(Path::new("b.txt")));

        ws.close(Path::new("b.txt")).unwrap();
        assert_eq!(ws.active_path(), None);
        assert!(ws.is_empty());
        assert!(ws.check_invariants().is_ok());
    }

    #[test]
    fn test_close_inactive_keeps_active() {
        let mut ws = Workspace::new();
        ws.open(doc("a.txt")).unwrap();
        ws.open(doc("b.txt")).unwrap();

        ws.close(Path::new("a.txt")).unwrap();
        assert_eq!(ws.active_path(), Some(Path::new("b.txt")));
    }

    #[test]
    fn test_not_open_errors() {
        let mut ws = Workspace::new();
        assert_eq!(
            ws.activate(Path::new("x.txt")).unwrap_err(),
            EditorError::NotOpen(PathBuf::from("x.txt"))
        );
        assert!(ws.close(Path::new("x.txt")).is_err());
        assert_eq!(ws.current().unwrap_err(), EditorError::NoActiveDocument);
        assert_eq!(ws.undo().unwrap_err(), EditorError::NoActiveDocument);
    }
}
