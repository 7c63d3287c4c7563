//! # Post-Effect System
//!
//! Successful workspace events trigger side effects outside the document
//! model: command logs, editing timers.
//!
//! ## Design
//!
//! Post-effects are:
//! - **Observers only**: they never mutate documents or history
//! - **After success**: a failed command or a query triggers nothing
//! - **Infallible to the caller**: an effect that fails (say, a log file that
//!   cannot be written) reports it through `tracing` and the command still
//!   succeeds
//! - **Composable**: `(A, B)` runs `A` then `B`

use crate::document::Document;
use std::path::Path;

/// Hook notified by [`EditSession`](crate::EditSession) after each event.
pub trait PostEffect {
    /// A document was opened (loaded, created or restored).
    fn document_opened(&mut self, _document: &Document) {}

    /// A document became active.
    fn document_activated(&mut self, _path: &Path) {}

    /// A document was removed from the workspace.
    fn document_closed(&mut self, _path: &Path) {}

    /// A command succeeded against `document`. Covers edits, undo/redo and
    /// workspace commands such as `save`.
    fn command_applied(&mut self, _document: &Document, _description: &str) {}
}

/// No effects.
impl PostEffect for () {}

impl<A: PostEffect, B: PostEffect> PostEffect for (A, B) {
    fn document_opened(&mut self, document: &Document) {
        self.0.document_opened(document);
        self.1.document_opened(document);
    }

    fn document_activated(&mut self, path: &Path) {
        self.0.document_activated(path);
        self.1.document_activated(path);
    }

    fn document_closed(&mut self, path: &Path) {
        self.0.document_closed(path);
        self.1.document_closed(path);
    }

    fn command_applied(&mut self, document: &Document, description: &str) {
        self.0.command_applied(document, description);
        self.1.command_applied(document, description);
    }
}

impl<E: PostEffect + ?Sized> PostEffect for Box<E> {
    fn document_opened(&mut self, document: &Document) {
        (**self).document_opened(document);
    }

    fn document_activated(&mut self, path: &Path) {
        (**self).document_activated(path);
    }

    fn document_closed(&mut self, path: &Path) {
        (**self).document_closed(path);
    }

    fn command_applied(&mut self, document: &Document, description: &str) {
        (**self).command_applied(document, description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;

    #[derive(Default)]
    struct Count(usize);

    impl PostEffect for Count {
        fn command_applied(&mut self, _document: &Document, _description: &str) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_pair_notifies_both() {
        let doc = Document::empty("a.txt", DocumentKind::Flat);
        let mut pair = (Count::default(), Count::default());
        pair.command_applied(&doc, "append \"x\"");
        pair.document_closed(Path::new("a.txt"));

        assert_eq!(pair.0 .0, 1);
        assert_eq!(pair.1 .0, 1);
    }
}
