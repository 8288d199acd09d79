use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::port::{SlotPort, DEFAULT_STORAGE_KEY};
use crate::system::FileStorage;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "storyshelf.json";

/// Directory name used under the platform data directory.
const APP_DIR: &str = "storyshelf";

/// Where and under which key favorites are persisted (`storyshelf.json`).
///
/// Every field is optional on disk:
///
/// ```json
/// { "storageKey": "bookmarks", "dataDir": "/home/reader/.local/share/storyshelf" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StoreConfig {
    pub storage_key: String,
    /// Directory holding the storage slots. `None` means the platform data
    /// directory (see [`StoreConfig::resolve_data_dir`]).
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: None,
        }
    }
}

impl StoreConfig {
    /// Read a config file. A missing file yields the defaults; a malformed
    /// one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The configured data directory, else `<platform data dir>/storyshelf`,
    /// else `./.storyshelf`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")))
    }

    /// A file-backed port over the configured slot.
    pub fn open_port(&self) -> SlotPort<FileStorage> {
        SlotPort::new(FileStorage::new(self.resolve_data_dir()), self.storage_key.clone())
    }
}
