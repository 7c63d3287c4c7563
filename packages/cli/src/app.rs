//! The interpreter behind the REPL: owns the session and its collaborators
//! and turns requests into output lines.

use crate::commands::{parse_request, Request, SaveTarget, HELP};
use crate::config::Config;
use anyhow::{anyhow, bail, Result};
use quire_editor::{
    CommandOutput, Document, DocumentKind, EditSession, EditorError, Query,
};
use quire_workspace::{
    check_document, render_path_tree, CommandLog, EditTimer, FileSystem, JsonSnapshotStore,
    KnownMisspellings, LogFilter, PathValidator, SnapshotStore, SpellChecker, Storage,
    WorkspaceSnapshot,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Post-effects observing the session
pub type Effects<F> = (CommandLog<F>, EditTimer);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// Asks the user what to do with unsaved changes.
pub trait Prompt {
    fn confirm_close(&mut self, path: &Path) -> CloseChoice;
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub exit: bool,
}

pub struct App<F> {
    session: EditSession<Effects<F>>,
    storage: Storage<F>,
    snapshots: JsonSnapshotStore<F>,
    spell_checker: Box<dyn SpellChecker>,
}

impl<F: FileSystem + Clone> App<F> {
    pub fn new(fs: F, root: &Path, config: &Config) -> Self {
        let validator = PathValidator::new(root, config.extensions.clone());
        let effects = (
            CommandLog::new(fs.clone(), validator.root()),
            EditTimer::new(),
        );
        Self {
            session: EditSession::new(effects).with_undo_limit(config.undo_limit),
            snapshots: JsonSnapshotStore::new(fs.clone(), config.get_snapshot_path(root)),
            storage: Storage::new(fs, validator),
            spell_checker: Box::new(KnownMisspellings::default()),
        }
    }

    pub fn session(&self) -> &EditSession<Effects<F>> {
        &self.session
    }

    /// Reopen the documents of the previous session. An unreadable snapshot
    /// is ignored.
    pub fn restore(&mut self) -> usize {
        match self.snapshots.load() {
            Ok(Some(snapshot)) => snapshot.restore(&mut self.session),
            Ok(None) => 0,
            Err(e) => {
                warn!(path = %self.snapshots.path().display(), error = %e, "ignoring workspace snapshot");
                0
            }
        }
    }

    /// Handle one input line. Errors are per line; the session stays usable.
    pub fn handle(&mut self, line: &str, prompt: &mut dyn Prompt) -> Result<Reply> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Reply::default());
        }

        let active = self.session.workspace().current().ok().map(Document::kind);
        let request = parse_request(line, active)?;
        debug!(?request, "handling request");

        let lines = match request {
            Request::Load(file) => self.load(&file)?,
            Request::Save(target) => self.save(target)?,
            Request::Init { kind, with_log } => self.init(kind, with_log)?,
            Request::Close(file) => self.close(file.as_deref(), prompt)?,
            Request::Activate(file) => self.activate(&file)?,
            Request::EditorList => self.editor_list(),
            Request::DirTree => {
                render_path_tree(self.session.workspace().documents().map(Document::path))
            }
            Request::Undo => vec![format!("undo: {}", self.session.undo()?)],
            Request::Redo => vec![format!("redo: {}", self.session.redo()?)],
            Request::Execute(command) => report(self.session.execute(&command)?),
            Request::TreeOf(file) => {
                let path = self.open_path(Some(&file))?;
                report(self.session.workspace().get(&path)?.query(&Query::Tree)?)
            }
            Request::LogOn(file) => self.log_on(file.as_deref())?,
            Request::LogOff(file) => self.log_off(file.as_deref())?,
            Request::LogShow(file) => self.log_show(file.as_deref())?,
            Request::SpellCheck(file) => {
                let path = self.open_path(file.as_deref())?;
                let document = self.session.workspace().get(&path)?;
                check_document(self.spell_checker.as_ref(), document)
            }
            Request::Help => HELP.iter().map(|line| line.to_string()).collect(),
            Request::Exit => return Ok(self.exit()),
        };
        Ok(Reply { lines, exit: false })
    }

    /// Stop the timers and write the snapshot.
    pub fn exit(&mut self) -> Reply {
        self.session.effects_mut().1.stop_all();
        self.persist();
        Reply {
            lines: vec!["Workspace saved. Bye.".to_string()],
            exit: true,
        }
    }

    fn load(&mut self, file: &str) -> Result<Vec<String>> {
        let path = self.storage.check_path(file)?;
        if self.session.workspace().contains(&path) {
            bail!(
                "{} is already open, use 'edit {}' to switch to it",
                path.display(),
                path.display()
            );
        }

        let document = self.storage.load(&path)?;
        self.session.open(document)?;
        self.session
            .notify(&path, &format!("load {}", path.display()))?;
        self.persist();
        Ok(vec![format!("Loaded {}", path.display())])
    }

    fn save(&mut self, target: SaveTarget) -> Result<Vec<String>> {
        let paths = match target {
            SaveTarget::Active => vec![self.open_path(None)?],
            SaveTarget::File(file) => vec![self.open_path(Some(&file))?],
            SaveTarget::All => {
                let paths: Vec<PathBuf> = self
                    .session
                    .workspace()
                    .documents()
                    .map(|doc| doc.path().to_path_buf())
                    .collect();
                if paths.is_empty() {
                    bail!("no open documents");
                }
                paths
            }
        };

        let lines = paths
            .iter()
            .map(|path| self.save_one(path))
            .collect::<Result<Vec<_>>>()?;
        self.persist();
        Ok(lines)
    }

    fn save_one(&mut self, path: &Path) -> Result<String> {
        self.storage.save(self.session.workspace().get(path)?)?;
        self.session.mark_saved(path)?;
        self.session
            .notify(path, &format!("save {}", path.display()))?;
        Ok(format!("Saved {}", path.display()))
    }

    fn init(&mut self, kind: DocumentKind, with_log: bool) -> Result<Vec<String>> {
        let workspace = self.session.workspace();
        let document = self
            .storage
            .init(kind, with_log, |path| workspace.contains(path));
        let path = document.path().to_path_buf();

        self.session.open(document)?;
        let description = if with_log {
            format!("init {kind} with-log")
        } else {
            format!("init {kind}")
        };
        self.session.notify(&path, &description)?;
        self.persist();
        Ok(vec![format!("Created {}", path.display())])
    }

    fn close(&mut self, file: Option<&str>, prompt: &mut dyn Prompt) -> Result<Vec<String>> {
        let path = self.open_path(file)?;
        let mut lines = Vec::new();

        if self.session.workspace().get(&path)?.is_modified() {
            match prompt.confirm_close(&path) {
                CloseChoice::Save => lines.push(self.save_one(&path)?),
                CloseChoice::Discard => {}
                CloseChoice::Cancel => return Ok(vec!["Close cancelled".to_string()]),
            }
        }

        self.session
            .notify(&path, &format!("close {}", path.display()))?;
        self.session.close(&path)?;
        self.persist();
        lines.push(format!("Closed {}", path.display()));
        Ok(lines)
    }

    fn activate(&mut self, file: &str) -> Result<Vec<String>> {
        let path = self.open_path(Some(file))?;
        self.session.activate(&path)?;
        self.session
            .notify(&path, &format!("edit {}", path.display()))?;
        self.persist();
        Ok(vec![format!("Switched to {}", path.display())])
    }

    fn editor_list(&self) -> Vec<String> {
        let workspace = self.session.workspace();
        if workspace.is_empty() {
            return vec!["(no open documents)".to_string()];
        }
        let timer = &self.session.effects().1;
        workspace
            .documents()
            .map(|doc| timer.describe(doc, workspace.active_path() == Some(doc.path())))
            .collect()
    }

    fn log_on(&mut self, file: Option<&str>) -> Result<Vec<String>> {
        let path = self.open_path(file)?;
        let log = &mut self.session.effects_mut().0;
        Ok(vec![if log.enable(&path, LogFilter::default()) {
            format!("Logging enabled for {}", path.display())
        } else {
            format!("{} is already logging", path.display())
        }])
    }

    fn log_off(&mut self, file: Option<&str>) -> Result<Vec<String>> {
        let path = self.open_path(file)?;
        let log = &mut self.session.effects_mut().0;
        Ok(vec![if log.disable(&path) {
            format!("Logging disabled for {}", path.display())
        } else {
            format!("{} was not logging", path.display())
        }])
    }

    fn log_show(&self, file: Option<&str>) -> Result<Vec<String>> {
        let path = match file {
            Some(file) => self.storage.check_path(file)?,
            None => self.open_path(None)?,
        };
        let lines = self
            .session
            .effects()
            .0
            .show(&path)
            .map_err(|_| anyhow!("no log for {}", path.display()))?;
        if lines.is_empty() {
            return Ok(vec!["(log is empty)".to_string()]);
        }
        Ok(lines)
    }

    /// The active document's path, or `file` validated and required to be
    /// open.
    fn open_path(&self, file: Option<&str>) -> Result<PathBuf> {
        let workspace = self.session.workspace();
        match file {
            None => Ok(workspace.current()?.path().to_path_buf()),
            Some(file) => {
                let path = self.storage.check_path(file)?;
                if !workspace.contains(&path) {
                    return Err(EditorError::NotOpen(path).into());
                }
                Ok(path)
            }
        }
    }

    fn persist(&self) {
        let snapshot = WorkspaceSnapshot::capture(self.session.workspace());
        if let Err(e) = self.snapshots.save(&snapshot) {
            warn!(path = %self.snapshots.path().display(), error = %e, "cannot write workspace snapshot");
        }
    }
}

fn report(output: CommandOutput) -> Vec<String> {
    match output {
        CommandOutput::Applied(_) => Vec::new(),
        CommandOutput::Unchanged(_) => vec!["Nothing changed".to_string()],
        CommandOutput::Report(lines) => lines,
    }
}
