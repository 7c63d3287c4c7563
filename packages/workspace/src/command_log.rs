//! # Command Log
//!
//! Appends each successful command to a per-document log file
//! `.<file name>.log` kept next to the document.
//!
//! A document logs when it carries a `# log` directive at open time or after
//! `log-on`. The directive may exclude verbs:
//!
//! ```text
//! # log -e append -e delete
//! ```
//!
//! Log writes never fail a command; problems are reported as warnings.

use crate::filesystem::FileSystem;
use chrono::{Local, NaiveDateTime};
use quire_editor::{Document, PostEffect};
use quire_parser::LOG_DIRECTIVE_PREFIX;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Verbs excluded from one document's log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    excluded: BTreeSet<String>,
}

impl LogFilter {
    /// Read exclusions from a `# log [-e verb]…` directive. Unknown tokens
    /// are ignored with a warning.
    pub fn from_directive(directive: &str) -> Self {
        let rest = directive
            .trim()
            .strip_prefix(LOG_DIRECTIVE_PREFIX)
            .unwrap_or_default();

        let mut excluded = BTreeSet::new();
        let mut tokens = rest.split_whitespace();
        while let Some(token) = tokens.next() {
            match (token, tokens.next()) {
                ("-e", Some(verb)) => {
                    excluded.insert(verb.to_string());
                }
                (other, _) => warn!(token = other, "ignoring log directive token"),
            }
        }
        Self { excluded }
    }

    pub fn excludes(&self, command: &str) -> bool {
        command
            .split_whitespace()
            .next()
            .is_some_and(|verb| self.excluded.contains(verb))
    }
}

pub struct CommandLog<F> {
    fs: F,
    root: PathBuf,
    enabled: HashMap<PathBuf, LogFilter>,
    clock: fn() -> NaiveDateTime,
}

impl<F: FileSystem> CommandLog<F> {
    /// Log files for document path `p` live at `root/p`'s directory.
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
            enabled: HashMap::new(),
            clock: || Local::now().naive_local(),
        }
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn log_path(&self, document: &Path) -> PathBuf {
        let name = document
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = document.parent().unwrap_or(Path::new(""));
        self.root.join(dir).join(format!(".{name}.log"))
    }

    pub fn is_enabled(&self, document: &Path) -> bool {
        self.enabled.contains_key(document)
    }

    pub fn filter(&self, document: &Path) -> Option<&LogFilter> {
        self.enabled.get(document)
    }

    /// Start logging a document and write a session header. Returns
    /// `false` if it was already logging.
    pub fn enable(&mut self, document: &Path, filter: LogFilter) -> bool {
        if self.enabled.contains_key(document) {
            return false;
        }
        self.enabled.insert(document.to_path_buf(), filter);
        let header = format!("session start at {}", self.timestamp());
        self.write(document, &header);
        true
    }

    /// Stop logging a document; its exclusions are forgotten.
    pub fn disable(&mut self, document: &Path) -> bool {
        self.enabled.remove(document).is_some()
    }

    /// Append `command` if the document is logging and the verb is not
    /// excluded.
    pub fn record(&mut self, document: &Path, command: &str) {
        let Some(filter) = self.enabled.get(document) else {
            return;
        };
        if filter.excludes(command) {
            debug!(path = %document.display(), command, "excluded from log");
            return;
        }
        let line = format!("{} {command}", self.timestamp());
        self.write(document, &line);
    }

    /// Contents of a document's log file
    pub fn show(&self, document: &Path) -> io::Result<Vec<String>> {
        self.fs.read_lines(&self.log_path(document))
    }

    fn timestamp(&self) -> String {
        (self.clock)().format(TIMESTAMP_FORMAT).to_string()
    }

    fn write(&self, document: &Path, line: &str) {
        let path = self.log_path(document);
        if let Err(e) = self.fs.append(&path, &format!("{line}\n")) {
            warn!(log = %path.display(), error = %e, "cannot write command log");
        }
    }
}

impl<F: FileSystem> PostEffect for CommandLog<F> {
    fn document_opened(&mut self, document: &Document) {
        if let Some(directive) = document.log_directive() {
            let filter = LogFilter::from_directive(directive);
            self.enable(document.path(), filter);
        }
    }

    fn document_closed(&mut self, path: &Path) {
        self.disable(path);
    }

    fn command_applied(&mut self, document: &Document, description: &str) {
        self.record(document.path(), description);
    }
}
