//! Workspace snapshots.
//!
//! A snapshot records which documents are open, their order of use and
//! their current lines. Undo histories are not part of it: a restored
//! document starts with an empty history.

use crate::filesystem::FileSystem;
use quire_editor::{Document, DocumentKind, DocumentState, EditSession, PostEffect, Workspace};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub state: DocumentState,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub active: Option<PathBuf>,
    pub recent: Vec<PathBuf>,
    pub documents: Vec<DocumentSnapshot>,
}

impl WorkspaceSnapshot {
    pub fn capture(workspace: &Workspace) -> Self {
        Self {
            active: workspace.active_path().map(Path::to_path_buf),
            recent: workspace.recent().to_vec(),
            documents: workspace
                .documents()
                .map(|doc| DocumentSnapshot {
                    path: doc.path().to_path_buf(),
                    kind: doc.kind(),
                    state: doc.state(),
                    lines: doc.serialize(),
                })
                .collect(),
        }
    }

    /// Reopen the recorded documents in order of use and reactivate the
    /// recorded active document. Documents that no longer parse are
    /// skipped. Returns how many documents were opened.
    pub fn restore<E: PostEffect>(self, session: &mut EditSession<E>) -> usize {
        let mut documents = self.documents;
        documents.sort_by_key(|doc| self.recent.iter().position(|p| *p == doc.path));

        let mut opened = 0;
        for snapshot in documents {
            let path = snapshot.path.clone();
            let document = match Document::from_lines(&path, snapshot.kind, snapshot.lines) {
                Ok(document) => document.with_state(snapshot.state),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable document");
                    continue;
                }
            };
            match session.open(document) {
                Ok(()) => opened += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "skipping document"),
            }
        }

        if let Some(active) = self.active {
            if session.workspace().active_path() != Some(active.as_path())
                && session.workspace().contains(&active)
            {
                if let Err(e) = session.activate(&active) {
                    warn!(path = %active.display(), error = %e, "cannot reactivate");
                }
            }
        }

        info!(documents = opened, "restored workspace");
        opened
    }
}

/// Somewhere to keep the workspace between sessions
pub trait SnapshotStore {
    fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<(), SnapshotError>;

    /// `None` when no snapshot has been written yet
    fn load(&self) -> Result<Option<WorkspaceSnapshot>, SnapshotError>;
}

/// Snapshot stored as pretty JSON in a single file
pub struct JsonSnapshotStore<F> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> JsonSnapshotStore<F> {
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<F: FileSystem> SnapshotStore for JsonSnapshotStore<F> {
    fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs.create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        self.fs.write(&self.path, &json)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<WorkspaceSnapshot>, SnapshotError> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let json = self.fs.read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}
