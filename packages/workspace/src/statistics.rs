//! Editing time per document.
//!
//! Only the active document accumulates time. Activating another document
//! stops the previous timer, opening a document resets its total and closing
//! it drops the timer.

use quire_editor::{Document, PostEffect};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Timer {
    total: Duration,
    started: Option<Instant>,
}

pub struct EditTimer {
    timers: HashMap<PathBuf, Timer>,
    active: Option<PathBuf>,
    clock: Box<dyn Fn() -> Instant>,
}

impl EditTimer {
    pub fn new() -> Self {
        Self::with_clock(Instant::now)
    }

    pub fn with_clock(clock: impl Fn() -> Instant + 'static) -> Self {
        Self {
            timers: HashMap::new(),
            active: None,
            clock: Box::new(clock),
        }
    }

    pub fn start(&mut self, path: &Path) {
        if let Some(active) = self.active.take() {
            if active != path {
                self.stop(&active);
            }
        }
        let now = (self.clock)();
        let timer = self.timers.entry(path.to_path_buf()).or_default();
        if timer.started.is_none() {
            timer.started = Some(now);
        }
        self.active = Some(path.to_path_buf());
    }

    pub fn stop(&mut self, path: &Path) {
        let now = (self.clock)();
        if let Some(timer) = self.timers.get_mut(path) {
            if let Some(started) = timer.started.take() {
                timer.total += now.saturating_duration_since(started);
            }
        }
        if self.active.as_deref() == Some(path) {
            self.active = None;
        }
    }

    pub fn stop_all(&mut self) {
        let paths: Vec<PathBuf> = self.timers.keys().cloned().collect();
        for path in paths {
            self.stop(&path);
        }
    }

    pub fn reset(&mut self, path: &Path) {
        self.timers.remove(path);
        if self.active.as_deref() == Some(path) {
            self.active = None;
        }
    }

    pub fn elapsed(&self, path: &Path) -> Duration {
        self.timers.get(path).map_or(Duration::ZERO, |timer| {
            let running = timer
                .started
                .map_or(Duration::ZERO, |started| {
                    (self.clock)().saturating_duration_since(started)
                });
            timer.total + running
        })
    }

    /// One `editor-list` entry: `* path [modified] (duration)`
    pub fn describe(&self, document: &Document, is_active: bool) -> String {
        format!(
            "{}{}{} ({})",
            if is_active { "* " } else { "  " },
            document.path().display(),
            if document.is_modified() { " [modified]" } else { "" },
            format_duration(self.elapsed(document.path())),
        )
    }
}

impl Default for EditTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PostEffect for EditTimer {
    fn document_opened(&mut self, document: &Document) {
        self.reset(document.path());
    }

    fn document_activated(&mut self, path: &Path) {
        self.start(path);
    }

    fn document_closed(&mut self, path: &Path) {
        self.stop(path);
        self.timers.remove(path);
    }
}

/// Format a duration in its largest units: `42s`, `5m`, `2h 3m`, `1d 4h`.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    match seconds {
        0..=59 => format!("{seconds}s"),
        60..=3599 => format!("{}m", seconds / 60),
        3600..=86_399 => {
            let (hours, minutes) = (seconds / 3600, seconds % 3600 / 60);
            if minutes > 0 {
                format!("{hours}h {minutes}m")
            } else {
                format!("{hours}h")
            }
        }
        _ => {
            let (days, hours) = (seconds / 86_400, seconds % 86_400 / 3600);
            if hours > 0 {
                format!("{days}d {hours}h")
            } else {
                format!("{days}d")
            }
        }
    }
}
