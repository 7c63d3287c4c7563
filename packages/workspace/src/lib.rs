//! Host-side collaborators for a Quire editing session: the file system,
//! path validation, load/save, snapshots and the post-effects that observe
//! the session (command log, edit timer).

pub mod command_log;
pub mod filesystem;
pub mod snapshot;
pub mod spell_check;
pub mod statistics;
pub mod storage;
pub mod validation;

pub use command_log::{CommandLog, LogFilter};
pub use filesystem::{FileSystem, MockFileSystem, RealFileSystem};
pub use snapshot::{DocumentSnapshot, JsonSnapshotStore, SnapshotError, SnapshotStore, WorkspaceSnapshot};
pub use spell_check::{check_document, check_text, KnownMisspellings, Misspelling, SpellChecker};
pub use statistics::{format_duration, EditTimer};
pub use storage::{render_path_tree, Storage, StorageError, StorageResult};
pub use validation::{normalize_path, PathValidator, ValidationError};
