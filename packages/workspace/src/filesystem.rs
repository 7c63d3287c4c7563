use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// File system abstraction for storage, snapshots and logs
pub trait FileSystem {
    /// Check if a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file contents
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Append to the file, creating it if needed
    fn append(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Read a file as lines without their terminators
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        Ok(self
            .read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect())
    }

    /// Write lines, each terminated by `\n`
    fn write_lines(&self, path: &Path, lines: &[String]) -> io::Result<()> {
        let mut contents = String::new();
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        self.write(path, &contents)
    }
}

/// Real file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn append(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(contents.as_bytes())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// In-memory file system for testing
///
/// Directories are implied by the files below them and can also be added
/// explicitly. Writing into a directory that does not exist fails like the
/// real thing.
#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: RefCell<HashMap<PathBuf, String>>,
    dirs: RefCell<HashSet<PathBuf>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, contents: &str) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.borrow_mut().insert(path, contents.to_string());
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Current contents of a file, if present
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    fn check_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.is_dir(parent) => {
                Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such directory: {}", parent.display()),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.contents(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.check_parent(path)?;
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn append(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.check_parent(path)?;
        self.files
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_default()
            .push_str(contents);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.add_dir(path);
        Ok(())
    }
}

/// Collaborators share one file system by reference or through `Rc`
macro_rules! delegate_file_system {
    ($($ty:ty),*) => {$(
        impl<F: FileSystem + ?Sized> FileSystem for $ty {
            fn exists(&self, path: &Path) -> bool {
                (**self).exists(path)
            }

            fn is_dir(&self, path: &Path) -> bool {
                (**self).is_dir(path)
            }

            fn read_to_string(&self, path: &Path) -> io::Result<String> {
                (**self).read_to_string(path)
            }

            fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
                (**self).write(path, contents)
            }

            fn append(&self, path: &Path, contents: &str) -> io::Result<()> {
                (**self).append(path, contents)
            }

            fn create_dir_all(&self, path: &Path) -> io::Result<()> {
                (**self).create_dir_all(path)
            }
        }
    )*};
}

delegate_file_system!(&F, Rc<F>);
