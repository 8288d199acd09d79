use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;

use super::persistence::{validate_key, Persistence};

#[derive(Debug, Default)]
struct Slots {
    values: HashMap<String, String>,
    reject_writes: Option<String>,
}

/// In-memory [`Persistence`] backend.
///
/// Clones share the same slots, so two stores built over clones of one
/// `MemoryStorage` see each other's writes, the way two page loads see the
/// same local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<Slots>>,
}

impl MemoryStorage {
    /// An empty backend. Clones share the same slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail with [`StorageError::Rejected`].
    /// `None` lifts the restriction.
    pub fn reject_writes(&self, reason: Option<&str>) {
        self.slots.borrow_mut().reject_writes = reason.map(str::to_string);
    }

    /// Write a raw value directly, bypassing rejection. Used to plant
    /// fixtures such as corrupt data.
    pub fn put_raw(&self, key: &str, data: &str) {
        self.slots
            .borrow_mut()
            .values
            .insert(key.to_string(), data.to_string());
    }

    /// The raw value under `key`, as a caller on the other side would see it.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().values.get(key).cloned()
    }
}

impl Persistence for MemoryStorage {
    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut slots = self.slots.borrow_mut();
        if let Some(reason) = &slots.reject_writes {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                reason: reason.clone(),
            });
        }
        slots.values.insert(key.to_string(), data.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.slots.borrow().values.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.slots.borrow_mut().values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_slots() {
        let mut a = MemoryStorage::new();
        let b = a.clone();
        a.save("bookmarks", "[]").unwrap();
        assert_eq!(b.load("bookmarks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn rejected_write_leaves_previous_value() {
        let mut storage = MemoryStorage::new();
        storage.save("bookmarks", "[1]").unwrap();
        storage.reject_writes(Some("quota exceeded"));
        let err = storage.save("bookmarks", "[1,2]").unwrap_err();
        assert!(matches!(err, StorageError::Rejected { .. }));
        assert_eq!(storage.get_raw("bookmarks").as_deref(), Some("[1]"));

        storage.reject_writes(None);
        storage.save("bookmarks", "[1,2]").unwrap();
        assert_eq!(storage.get_raw("bookmarks").as_deref(), Some("[1,2]"));
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let mut storage = MemoryStorage::new();
        storage.remove("bookmarks").unwrap();
        assert_eq!(storage.load("bookmarks").unwrap(), None);
    }
}
