//! Path validation for user-supplied file names.
//!
//! Paths are checked lexically: `..` and `.` are resolved without touching
//! the disk, so new files can be validated before they exist.

use crate::filesystem::FileSystem;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file name given")]
    Empty,

    #[error("Unsupported file type: {} (expected one of: {allowed})", .path.display())]
    UnsupportedExtension { path: PathBuf, allowed: String },

    #[error("Path escapes the workspace root: {}", .0.display())]
    OutsideRoot(PathBuf),

    #[error("Directory does not exist: {}", .0.display())]
    MissingParent(PathBuf),
}

/// Accepts paths with a known extension that stay under `root`.
#[derive(Debug, Clone)]
pub struct PathValidator {
    root: PathBuf,
    extensions: Vec<String>,
}

impl PathValidator {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: normalize_path(&root.into()),
            extensions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Validate `input` and return it relative to the root. The relative
    /// path is the document's identity in the workspace.
    pub fn validate<F: FileSystem>(&self, fs: &F, input: &str) -> Result<PathBuf, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::Empty);
        }

        let joined = normalize_path(&self.root.join(input));
        let relative = joined
            .strip_prefix(&self.root)
            .map_err(|_| ValidationError::OutsideRoot(PathBuf::from(input)))?
            .to_path_buf();
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ValidationError::OutsideRoot(PathBuf::from(input)));
        }

        let has_extension = relative
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext));
        if !has_extension {
            return Err(ValidationError::UnsupportedExtension {
                path: relative,
                allowed: self.extensions.join(", "),
            });
        }

        if let Some(parent) = joined.parent() {
            if !parent.as_os_str().is_empty() && !fs.is_dir(parent) {
                return Err(ValidationError::MissingParent(parent.to_path_buf()));
            }
        }

        Ok(relative)
    }

    /// Location on disk of a validated relative path
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

/// Normalize a path by resolving `..` and `.` components.
///
/// A `..` that would climb above the start of a relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MockFileSystem;

    fn validator() -> (PathValidator, MockFileSystem) {
        let fs = MockFileSystem::new();
        fs.add_dir("/work/notes");
        let validator = PathValidator::new(
            "/work",
            vec!["txt".to_string(), "xml".to_string(), "log".to_string()],
        );
        (validator, fs)
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize_path(Path::new("./a/b/..")), PathBuf::from("a"));
    }

    #[test]
    fn test_accepts_relative_paths() {
        let (validator, fs) = validator();
        assert_eq!(validator.validate(&fs, "a.txt"), Ok(PathBuf::from("a.txt")));
        assert_eq!(
            validator.validate(&fs, "./notes/../notes/b.xml"),
            Ok(PathBuf::from("notes/b.xml"))
        );
        assert_eq!(
            validator.resolve(Path::new("notes/b.xml")),
            PathBuf::from("/work/notes/b.xml")
        );
    }

    #[test]
    fn test_rejects_escape() {
        let (validator, fs) = validator();
        assert_eq!(
            validator.validate(&fs, "../other/a.txt"),
            Err(ValidationError::OutsideRoot(PathBuf::from("../other/a.txt")))
        );
        assert!(matches!(
            validator.validate(&fs, "/etc/passwd.txt"),
            Err(ValidationError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let (validator, fs) = validator();
        let err = validator.validate(&fs, "main.rs").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file type: main.rs (expected one of: txt, xml, log)"
        );
        assert!(matches!(
            validator.validate(&fs, "notes"),
            Err(ValidationError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_directory() {
        let (validator, fs) = validator();
        assert_eq!(
            validator.validate(&fs, "drafts/a.txt"),
            Err(ValidationError::MissingParent(PathBuf::from("/work/drafts")))
        );
        assert_eq!(validator.validate(&fs, "  "), Err(ValidationError::Empty));
    }
}
