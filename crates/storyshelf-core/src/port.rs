use std::cell::RefCell;
use std::rc::Rc;

use crate::collection::FavoritesCollection;
use crate::error::{PortError, StorageError};
use crate::item::SavedItem;
use crate::system::Persistence;

/// Storage key the favorites slot uses unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "bookmarks";

/// Port trait: loads and saves a whole favorites collection.
///
/// The store talks only to this trait, so its invariants can be tested
/// against [`MemoryPort`] without any real storage behind it.
pub trait FavoritesPort {
    /// Name used in diagnostics (e.g. the storage key).
    fn name(&self) -> &str;

    /// Read the persisted collection. A slot that was never written is an
    /// empty collection, not an error.
    fn load(&self) -> Result<FavoritesCollection, PortError>;

    /// Overwrite the persisted collection.
    fn save(&mut self, collection: &FavoritesCollection) -> Result<(), PortError>;
}

/// A [`FavoritesPort`] storing the collection as a JSON array under one key
/// of a [`Persistence`] backend.
#[derive(Debug)]
pub struct SlotPort<P> {
    storage: P,
    key: String,
}

impl<P: Persistence> SlotPort<P> {
    /// A port over the slot `key` of `storage`.
    pub fn new(storage: P, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// A port over the default `"bookmarks"` slot.
    pub fn with_default_key(storage: P) -> Self {
        Self::new(storage, DEFAULT_STORAGE_KEY)
    }

    /// The storage key this port reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying platform backend.
    pub fn storage(&self) -> &P {
        &self.storage
    }
}

impl<P: Persistence> FavoritesPort for SlotPort<P> {
    fn name(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<FavoritesCollection, PortError> {
        let Some(raw) = self.storage.load(&self.key)? else {
            return Ok(FavoritesCollection::new());
        };
        let items: Vec<SavedItem> =
            serde_json::from_str(&raw).map_err(|source| PortError::Corrupt {
                key: self.key.clone(),
                source,
            })?;
        let (collection, dropped) = FavoritesCollection::from_items(items);
        if dropped > 0 {
            tracing::warn!(key = %self.key, dropped, "collapsed duplicate ids in persisted favorites");
        }
        Ok(collection)
    }

    fn save(&mut self, collection: &FavoritesCollection) -> Result<(), PortError> {
        let raw = serde_json::to_string(collection).map_err(PortError::Encode)?;
        self.storage.save(&self.key, &raw)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryPortState {
    collection: FavoritesCollection,
    reject_saves: Option<String>,
    saves: usize,
}

/// In-memory [`FavoritesPort`] fake. Clones share state, so a test can keep
/// a handle to inspect what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryPort {
    state: Rc<RefCell<MemoryPortState>>,
}

impl MemoryPort {
    /// A port over an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// A port whose slot already holds `collection`.
    pub fn with_collection(collection: FavoritesCollection) -> Self {
        let port = Self::new();
        port.state.borrow_mut().collection = collection;
        port
    }

    /// Make subsequent saves fail. `None` lifts the restriction.
    pub fn reject_saves(&self, reason: Option<&str>) {
        self.state.borrow_mut().reject_saves = reason.map(str::to_string);
    }

    /// Replace the persisted collection behind the store's back, as another
    /// browsing context would.
    pub fn overwrite(&self, collection: FavoritesCollection) {
        self.state.borrow_mut().collection = collection;
    }

    /// A copy of what was last saved (or planted).
    pub fn persisted(&self) -> FavoritesCollection {
        self.state.borrow().collection.clone()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.state.borrow().saves
    }
}

impl FavoritesPort for MemoryPort {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<FavoritesCollection, PortError> {
        Ok(self.state.borrow().collection.clone())
    }

    fn save(&mut self, collection: &FavoritesCollection) -> Result<(), PortError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = &state.reject_saves {
            return Err(StorageError::Rejected {
                key: "memory".to_string(),
                reason: reason.clone(),
            }
            .into());
        }
        state.collection = collection.clone();
        state.saves += 1;
        Ok(())
    }
}
