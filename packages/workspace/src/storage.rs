//! Loading and saving documents.

use crate::filesystem::FileSystem;
use crate::validation::{PathValidator, ValidationError};
use quire_editor::{Document, DocumentKind, DocumentState, EditorError, Markup};
use quire_parser::LOG_DIRECTIVE_PREFIX;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Moves documents between the workspace and disk.
pub struct Storage<F> {
    fs: F,
    validator: PathValidator,
}

impl<F: FileSystem> Storage<F> {
    pub fn new(fs: F, validator: PathValidator) -> Self {
        Self { fs, validator }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn validator(&self) -> &PathValidator {
        &self.validator
    }

    /// Validate a user-supplied path; the result is relative to the root.
    pub fn check_path(&self, input: &str) -> StorageResult<PathBuf> {
        Ok(self.validator.validate(&self.fs, input)?)
    }

    /// Read a document from disk, or start an empty one if the file does
    /// not exist yet. The kind follows the extension.
    pub fn load(&self, path: &Path) -> StorageResult<Document> {
        let kind = DocumentKind::from_path(path);
        let location = self.validator.resolve(path);

        if !self.fs.exists(&location) {
            info!(path = %path.display(), %kind, "new document");
            return Ok(Document::empty(path, kind));
        }

        let lines = self
            .fs
            .read_lines(&location)
            .map_err(|e| StorageError::io(&location, e))?;
        info!(path = %path.display(), %kind, lines = lines.len(), "loaded document");
        Ok(Document::from_lines(path, kind, lines)?)
    }

    /// Write the serialized document. The caller marks it saved.
    pub fn save(&self, document: &Document) -> StorageResult<()> {
        let location = self.validator.resolve(document.path());
        self.fs
            .write_lines(&location, &document.serialize())
            .map_err(|e| StorageError::io(&location, e))?;
        info!(path = %document.path().display(), "saved document");
        Ok(())
    }

    /// Create `untitled-N.<ext>` with the first N not taken by an open
    /// document or an existing file. The new document starts Modified.
    pub fn init(
        &self,
        kind: DocumentKind,
        with_log: bool,
        is_open: impl Fn(&Path) -> bool,
    ) -> Document {
        let path = (1..)
            .map(|n| PathBuf::from(format!("untitled-{n}.{}", kind.extension())))
            .find(|path| !is_open(path) && !self.fs.exists(&self.validator.resolve(path)))
            .unwrap_or_default();

        let document = match (kind, with_log) {
            (DocumentKind::Flat, true) => {
                Document::flat(path, vec![LOG_DIRECTIVE_PREFIX.to_string()])
            }
            (DocumentKind::Structural, true) => Document::structural(
                path,
                Markup::default().with_log_directive(LOG_DIRECTIVE_PREFIX),
            ),
            (kind, false) => Document::empty(path, kind),
        };
        info!(path = %document.path().display(), %kind, with_log, "initialized document");
        document.with_state(DocumentState::Modified)
    }
}

/// Render document paths as a directory tree.
///
/// Entries are sorted, directories before their contents.
pub fn render_path_tree<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Vec<String> {
    #[derive(Default)]
    struct Dir(BTreeMap<String, Dir>);

    let mut root = Dir::default();
    for path in paths {
        let mut current = &mut root;
        for part in path.iter() {
            current = current
                .0
                .entry(part.to_string_lossy().into_owned())
                .or_default();
        }
    }

    fn render(dir: &Dir, prefix: &str, lines: &mut Vec<String>) {
        let count = dir.0.len();
        for (i, (name, child)) in dir.0.iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };
            lines.push(format!("{prefix}{connector}{name}"));

            let next = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            render(child, &next, lines);
        }
    }

    let mut lines = Vec::new();
    render(&root, "", &mut lines);
    if lines.is_empty() {
        lines.push("(empty)".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MockFileSystem;
    use quire_editor::{Command, TextMutation};
    use std::rc::Rc;

    fn storage() -> (Storage<Rc<MockFileSystem>>, Rc<MockFileSystem>) {
        let fs = Rc::new(MockFileSystem::new());
        fs.add_dir("/work");
        let validator = PathValidator::new(
            "/work",
            vec!["txt".to_string(), "xml".to_string()],
        );
        (Storage::new(Rc::clone(&fs), validator), fs)
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let (storage, _) = storage();
        let doc = storage.load(Path::new("new.xml")).unwrap();
        assert_eq!(doc.kind(), DocumentKind::Structural);
        assert_eq!(doc.tree().unwrap().root_element().id(), Some("root"));
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_load_existing_flat_file() {
        let (storage, fs) = storage();
        fs.add_file("/work/a.txt", "one\ntwo\n");
        let doc = storage.load(Path::new("a.txt")).unwrap();
        assert_eq!(doc.lines().unwrap(), ["one", "two"]);
    }

    #[test]
    fn test_load_broken_markup_fails() {
        let (storage, fs) = storage();
        fs.add_file("/work/b.xml", "<root id=\"root\"><a id=\"a\">");
        let err = storage.load(Path::new("b.xml")).unwrap_err();
        assert!(matches!(err, StorageError::Editor(EditorError::Parse(_))));
    }

    #[test]
    fn test_save_writes_terminated_lines() {
        let (storage, fs) = storage();
        let mut doc = Document::empty("a.txt", DocumentKind::Flat);
        doc.apply(&Command::Text(TextMutation::Append {
            text: "hello".to_string(),
        }))
        .unwrap();

        storage.save(&doc).unwrap();
        assert_eq!(fs.contents(Path::new("/work/a.txt")).unwrap(), "hello\n");
    }

    #[test]
    fn test_check_path_rejects_other_extensions() {
        let (storage, _) = storage();
        assert!(matches!(
            storage.check_path("a.md"),
            Err(StorageError::Validation(
                ValidationError::UnsupportedExtension { .. }
            ))
        ));
    }

    #[test]
    fn test_init_skips_taken_names() {
        let (storage, fs) = storage();
        fs.add_file("/work/untitled-1.txt", "");

        let doc = storage.init(DocumentKind::Flat, true, |p| p == Path::new("untitled-2.txt"));
        assert_eq!(doc.path(), Path::new("untitled-3.txt"));
        assert!(doc.is_modified());
        assert_eq!(doc.log_directive(), Some("# log"));
    }

    #[test]
    fn test_init_structural_with_log() {
        let (storage, _) = storage();
        let doc = storage.init(DocumentKind::Structural, true, |_| false);
        assert_eq!(doc.path(), Path::new("untitled-1.xml"));
        assert_eq!(doc.serialize()[0], "# log");
    }

    #[test]
    fn test_render_path_tree() {
        let paths = [
            PathBuf::from("notes/b.txt"),
            PathBuf::from("a.xml"),
            PathBuf::from("notes/a.txt"),
        ];
        assert_eq!(
            render_path_tree(paths.iter().map(PathBuf::as_path)),
            vec![
                "├── a.xml",
                "└── notes",
                "    ├── a.txt",
                "    └── b.txt",
            ]
        );
        assert_eq!(render_path_tree(std::iter::empty()), vec!["(empty)"]);
    }
}
