use crate::error::StorageError;

/// Persistence platform trait: key-value string storage.
///
/// The platform stores raw strings. Encoding the favorites collection is the
/// port's job ([`crate::port::SlotPort`]), not the platform's, so backends
/// stay free of any serde dependency.
///
/// Implementations: in-memory ([`super::MemoryStorage`]) and one file per key
/// ([`super::FileStorage`]).
pub trait Persistence {
    /// Write a string value under key, replacing any previous value.
    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError>;

    /// Read a string value by key. Returns `Ok(None)` if not found.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Remove a key from storage. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Storage keys double as file names, so they are restricted to
/// `[A-Za-z0-9_.-]` and may not be `.` or `..`.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}
