use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StorageError;

use super::persistence::{validate_key, Persistence};

/// [`Persistence`] backend storing each key as `<root>/<key>.json`.
///
/// Writes land in a uniquely named temporary file in the same directory and
/// are renamed over the target, so a slot is either the old value or the new
/// one. A failed write removes its temporary file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// The root directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one `<key>.json` per slot.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`. Fails for keys that could escape the root.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Persistence for FileStorage {
    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|e| io_error(&self.root, e))?;
        let mut temp = NamedTempFile::new_in(&self.root).map_err(|e| io_error(&self.root, e))?;
        temp.write_all(data.as_bytes()).map_err(|e| io_error(temp.path(), e))?;
        // On failure the returned handle is dropped, which deletes the file.
        temp.persist(&path).map_err(|e| io_error(&path, e.error))?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.load("bookmarks").unwrap(), None);
        storage.save("bookmarks", r#"[{"id":"b1"}]"#).unwrap();
        assert_eq!(
            storage.load("bookmarks").unwrap().as_deref(),
            Some(r#"[{"id":"b1"}]"#)
        );
        assert_eq!(entries(&dir.path().join("nested")), ["bookmarks.json"]);

        storage.remove("bookmarks").unwrap();
        assert_eq!(storage.load("bookmarks").unwrap(), None);
        storage.remove("bookmarks").unwrap();
    }

    #[test]
    fn invalid_key_never_touches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        let err = storage.save("../escape", "x").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
        assert!(!dir.path().parent().unwrap().join("escape.json").exists());
    }

    #[test]
    fn unwritable_root_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the root directory should be.
        let blocker = dir.path().join("root");
        fs::write(&blocker, "").unwrap();
        let mut storage = FileStorage::new(&blocker);
        let err = storage.save("bookmarks", "[]").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the slot path makes the final rename fail.
        fs::create_dir(dir.path().join("bookmarks.json")).unwrap();
        let mut storage = FileStorage::new(dir.path());
        let err = storage.save("bookmarks", r#"[{"id":"a"}]"#).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(entries(dir.path()), ["bookmarks.json"]);
    }

    #[test]
    fn repeated_saves_leave_only_the_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = FileStorage::new(dir.path());
        let mut second = first.clone();
        first.save("bookmarks", r#"[{"id":"a"}]"#).unwrap();
        second.save("bookmarks", r#"[{"id":"b"}]"#).unwrap();
        first.save("shelf", "[]").unwrap();
        assert_eq!(entries(dir.path()), ["bookmarks.json", "shelf.json"]);
        assert_eq!(
            first.load("bookmarks").unwrap().as_deref(),
            Some(r#"[{"id":"b"}]"#)
        );
    }
}
