//! Bookmark storage for the Storyshelf reader.
//!
//! [`FavoritesStore`] keeps an ordered, id-unique collection of
//! [`SavedItem`]s, writes it through a [`FavoritesPort`] after every change,
//! and tells subscribers about each new collection.

pub mod collection;
pub mod config;
pub mod error;
pub mod item;
pub mod port;
pub mod store;
pub mod system;

pub use collection::FavoritesCollection;
pub use config::StoreConfig;
pub use error::{ConfigError, ItemError, PortError, StorageError};
pub use item::{ItemId, SavedItem};
pub use port::{FavoritesPort, MemoryPort, SlotPort, DEFAULT_STORAGE_KEY};
pub use store::{FavoritesStore, SubscriptionId, Toggled};
pub use system::{FileStorage, MemoryStorage, Persistence};
