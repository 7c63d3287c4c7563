//! # Edit Session
//!
//! One user's editing session: the workspace plus the post-effects that
//! observe it.
//!
//! All workspace changes made through the session notify the effects. The
//! workspace itself is only handed out read-only.

use crate::command::{Command, CommandOutput};
use crate::document::Document;
use crate::errors::EditorError;
use crate::post_effects::PostEffect;
use crate::workspace::Workspace;
use std::path::Path;

pub struct EditSession<E = ()> {
    workspace: Workspace,
    effects: E,

    /// Undo levels applied to every opened document (0 = unlimited)
    undo_limit: usize,
}

impl<E: PostEffect> EditSession<E> {
    pub fn new(effects: E) -> Self {
        Self {
            workspace: Workspace::new(),
            effects,
            undo_limit: 0,
        }
    }

    pub fn with_undo_limit(mut self, undo_limit: usize) -> Self {
        self.undo_limit = undo_limit;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut E {
        &mut self.effects
    }

    /// Open a document and make it active.
    pub fn open(&mut self, document: Document) -> Result<(), EditorError> {
        let path = document.path.clone();
        self.workspace
            .open(document.with_undo_limit(self.undo_limit))?;

        let document = self.workspace.get(&path)?;
        self.effects.document_opened(document);
        self.effects.document_activated(&path);
        Ok(())
    }

    pub fn activate(&mut self, path: &Path) -> Result<(), EditorError> {
        self.workspace.activate(path)?;
        self.effects.document_activated(path);
        Ok(())
    }

    /// Close a document. The caller has already decided what to do with
    /// unsaved changes.
    pub fn close(&mut self, path: &Path) -> Result<Document, EditorError> {
        let was_active = self.workspace.active_path() == Some(path);
        let document = self.workspace.close(path)?;
        self.effects.document_closed(path);

        if was_active {
            if let Some(next) = self.workspace.active_path().map(Path::to_path_buf) {
                self.effects.document_activated(&next);
            }
        }
        Ok(document)
    }

    /// Run a command against the active document.
    pub fn execute(&mut self, command: &Command) -> Result<CommandOutput, EditorError> {
        let output = self.workspace.execute(command)?;
        if let CommandOutput::Applied(description) = &output {
            let document = self.workspace.current()?;
            self.effects.command_applied(document, description);
        }
        Ok(output)
    }

    pub fn undo(&mut self) -> Result<String, EditorError> {
        let description = self.workspace.undo()?;
        self.notify_current("undo")?;
        Ok(description)
    }

    pub fn redo(&mut self) -> Result<String, EditorError> {
        let description = self.workspace.redo()?;
        self.notify_current("redo")?;
        Ok(description)
    }

    /// Mark a document saved after its lines reached disk.
    pub fn mark_saved(&mut self, path: &Path) -> Result<(), EditorError> {
        self.workspace.get_mut(path)?.mark_saved();
        Ok(())
    }

    /// Report a workspace-level command (`save`, `load`, …) to the effects.
    pub fn notify(&mut self, path: &Path, description: &str) -> Result<(), EditorError> {
        let document = self.workspace.get(path)?;
        self.effects.command_applied(document, description);
        Ok(())
    }

    fn notify_current(&mut self, description: &str) -> Result<(), EditorError> {
        let document = self.workspace.current()?;
        self.effects.command_applied(document, description);
        Ok(())
    }
}

impl Default for EditSession<()> {
    fn default() -> Self {
        Self::new(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;
    use crate::line_edits::TextMutation;
    use std::path::PathBuf;

    /// Records every notification as a string.
    #[derive(Default)]
    struct Journal(Vec<String>);

    impl PostEffect for Journal {
        fn document_opened(&mut self, document: &Document) {
            self.0.push(format!("open {}", document.path.display()));
        }

        fn document_activated(&mut self, path: &Path) {
            self.0.push(format!("activate {}", path.display()));
        }

        fn document_closed(&mut self, path: &Path) {
            self.0.push(format!("close {}", path.display()));
        }

        fn command_applied(&mut self, document: &Document, description: &str) {
            self.0
                .push(format!("{} {}", document.path.display(), description));
        }
    }

    fn append(text: &str) -> Command {
        Command::Text(TextMutation::Append {
            text: text.to_string(),
        })
    }

    #[test]
    fn test_session_creation() {
        let session = EditSession::default();
        assert!(session.workspace().is_empty());
    }

    #[test]
    fn test_effects_see_successful_commands_only() {
        let mut session = EditSession::new(Journal::default());
        session
            .open(Document::empty("a.txt", DocumentKind::Flat))
            .unwrap();

        session.execute(&append("hello")).unwrap();
        assert!(session
            .execute(&Command::Tree(crate::TreeMutation::DeleteSubtree {
                id: "x".to_string()
            }))
            .is_err());
        session.undo().unwrap();
        assert!(session.undo().is_err());

        assert_eq!(
            session.effects().0,
            vec![
                "open a.txt",
                "activate a.txt",
                r#"a.txt append "hello""#,
                "a.txt undo",
            ]
        );
    }

    #[test]
    fn test_unchanged_commands_are_not_reported() {
        let mut session = EditSession::new(Journal::default());
        session
            .open(Document::empty("a.txt", DocumentKind::Flat))
            .unwrap();
        session.execute(&append("abc")).unwrap();
        session.effects_mut().0.clear();

        let output = session
            .execute(&Command::Text(TextMutation::Delete {
                at: crate::line_edits::Position::new(1, 2),
                len: 0,
            }))
            .unwrap();

        assert!(matches!(output, CommandOutput::Unchanged(_)));
        assert!(session.effects().0.is_empty());
        assert_eq!(session.workspace().current().unwrap().undo_levels(), 1);
    }

    #[test]
    fn test_close_reports_new_active() {
        let mut session = EditSession::new(Journal::default());
        session
            .open(Document::empty("a.txt", DocumentKind::Flat))
            .unwrap();
        session
            .open(Document::empty("b.txt", DocumentKind::Flat))
            .unwrap();
        session.effects_mut().0.clear();

        session.close(Path::new("b.txt")).unwrap();
        assert_eq!(session.effects().0, vec!["close b.txt", "activate a.txt"]);
        assert_eq!(
            session.workspace().active_path(),
            Some(PathBuf::from("a.txt").as_path())
        );
    }

    #[test]
    fn test_undo_limit_applies_to_opened_documents() {
        let mut session = EditSession::default().with_undo_limit(1);
        session
            .open(Document::empty("a.txt", DocumentKind::Flat))
            .unwrap();
        session.execute(&append("1")).unwrap();
        session.execute(&append("2")).unwrap();

        assert_eq!(session.workspace().current().unwrap().undo_levels(), 1);
        session.undo().unwrap();
        assert!(session.workspace().current().unwrap().is_modified());
    }
}
