use std::fmt;
use std::rc::Rc;

use crate::collection::FavoritesCollection;
use crate::error::PortError;
use crate::item::SavedItem;
use crate::port::FavoritesPort;

/// Handle returned by [`FavoritesStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of [`FavoritesStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

type Subscriber = Box<dyn FnMut(&Rc<FavoritesCollection>)>;

/// The favorites working set for one application instance.
///
/// Built once at startup with [`FavoritesStore::initialize`] and passed by
/// reference to every consumer. Every mutation that changes the collection
/// is written through the port and then announced to subscribers, in the
/// same call. None of the public operations return an error: unreadable
/// persisted data degrades to an empty collection, and a failed write keeps
/// the in-memory change (see [`FavoritesStore::last_persist_error`]).
///
/// Single-threaded: snapshots are `Rc`s and subscribers are plain `FnMut`s.
pub struct FavoritesStore<P: FavoritesPort> {
    port: P,
    current: Rc<FavoritesCollection>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    last_persist_error: Option<PortError>,
}

impl<P: FavoritesPort> FavoritesStore<P> {
    /// Hydrate from `port`. Never fails.
    pub fn initialize(port: P) -> Self {
        let current = match port.load() {
            Ok(collection) => {
                tracing::debug!(port = port.name(), len = collection.len(), "hydrated favorites");
                collection
            }
            Err(error @ PortError::Corrupt { .. }) => {
                tracing::warn!(port = port.name(), %error, "discarding corrupt favorites");
                FavoritesCollection::new()
            }
            Err(error) => {
                tracing::warn!(port = port.name(), %error, "could not read favorites; starting empty");
                FavoritesCollection::new()
            }
        };
        Self {
            port,
            current: Rc::new(current),
            subscribers: Vec::new(),
            next_subscription: 0,
            last_persist_error: None,
        }
    }

    /// Append `item` unless an item with the same id is already saved.
    /// Returns whether the collection changed.
    pub fn add(&mut self, item: SavedItem) -> bool {
        if self.current.contains(item.id().as_str()) {
            tracing::debug!(id = %item.id(), "already saved");
            return false;
        }
        tracing::debug!(id = %item.id(), "saving");
        Rc::make_mut(&mut self.current).push_unique(item);
        self.commit();
        true
    }

    /// Drop the item with `id`, if any. Returns whether the collection
    /// changed; removing an absent id writes nothing and notifies no one.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.current.contains(id) {
            tracing::debug!(id, "not saved; nothing to remove");
            return false;
        }
        tracing::debug!(id, "removing");
        Rc::make_mut(&mut self.current).remove(id);
        self.commit();
        true
    }

    /// Remove `item` if its id is saved, otherwise add it.
    pub fn toggle(&mut self, item: SavedItem) -> Toggled {
        if self.remove(item.id().as_str()) {
            Toggled::Removed
        } else {
            self.add(item);
            Toggled::Added
        }
    }

    /// Whether an item with `id` is saved.
    pub fn contains(&self, id: &str) -> bool {
        self.current.contains(id)
    }

    /// The current collection. The snapshot never changes; later mutations
    /// produce a new one.
    pub fn list(&self) -> Rc<FavoritesCollection> {
        Rc::clone(&self.current)
    }

    /// Register `callback` to receive every new collection. It is not called
    /// for the current one; use [`FavoritesStore::list`] for that.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Rc<FavoritesCollection>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Re-read the port and adopt its contents if they differ from memory.
    ///
    /// Nothing watches the slot for writes from other contexts; callers that
    /// share a slot decide when to reload. Returns whether the in-memory
    /// collection changed. An unreadable slot leaves memory untouched.
    pub fn reload(&mut self) -> bool {
        let persisted = match self.port.load() {
            Ok(collection) => collection,
            Err(error) => {
                tracing::warn!(port = self.port.name(), %error, "reload failed; keeping in-memory favorites");
                return false;
            }
        };
        if persisted == *self.current {
            return false;
        }
        tracing::debug!(port = self.port.name(), len = persisted.len(), "reloaded favorites");
        self.current = Rc::new(persisted);
        self.notify();
        true
    }

    /// The error from the most recent failed write, cleared by the next
    /// successful one.
    pub fn last_persist_error(&self) -> Option<&PortError> {
        self.last_persist_error.as_ref()
    }

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    fn persist(&mut self) {
        match self.port.save(&self.current) {
            Ok(()) => self.last_persist_error = None,
            Err(error) => {
                tracing::warn!(
                    port = self.port.name(),
                    %error,
                    "failed to persist favorites; change kept in memory only"
                );
                self.last_persist_error = Some(error);
            }
        }
    }

    fn notify(&mut self) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.current);
        }
    }
}

impl<P: FavoritesPort> fmt::Debug for FavoritesStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("port", &self.port.name())
            .field("len", &self.current.len())
            .field("subscribers", &self.subscribers.len())
            .field("last_persist_error", &self.last_persist_error)
            .finish()
    }
}
