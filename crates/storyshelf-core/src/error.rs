use std::path::PathBuf;

/// Errors from constructing a [`crate::item::SavedItem`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("item id must not be empty")]
    EmptyId,
    #[error("saved item must be a JSON object")]
    NotAnObject,
    #[error("saved item has no `id` or `_id` field")]
    MissingId,
    #[error("saved item id must be a string")]
    IdNotString,
}

/// Errors from a [`crate::system::Persistence`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage key {key:?}")]
    InvalidKey { key: String },
    /// The backend refused the write (e.g. quota exceeded).
    #[error("write to {key:?} rejected: {reason}")]
    Rejected { key: String, reason: String },
}

/// Errors from a [`crate::port::FavoritesPort`].
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("persisted favorites under {key:?} are corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode favorites: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors from loading a [`crate::config::StoreConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: invalid config: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
