use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";

/// Quire configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Workspace snapshot, relative to the workspace root
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// File extensions that may be opened
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Undo levels kept per document (0 = unlimited)
    #[serde(default)]
    pub undo_limit: usize,

    /// Reopen the previous session's documents at startup
    #[serde(default = "default_restore_on_start")]
    pub restore_on_start: bool,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(".quire/workspace.json")
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string(), "xml".to_string(), "log".to_string()]
}

fn default_restore_on_start() -> bool {
    true
}

impl Config {
    /// Load `explicit` if given, otherwise `quire.config.json` in `root`
    /// when present.
    pub fn load(explicit: Option<&Path>, root: &Path) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = root.join(DEFAULT_CONFIG_NAME);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Get absolute path to the snapshot file
    pub fn get_snapshot_path(&self, root: &Path) -> PathBuf {
        root.join(&self.snapshot_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            extensions: default_extensions(),
            undo_limit: 0,
            restore_on_start: default_restore_on_start(),
        }
    }
}
