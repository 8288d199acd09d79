use serde::Serialize;

use crate::item::{ItemId, SavedItem};

/// Ordered favorites with at most one item per id.
///
/// Insertion order is display order: new items go to the end. Only the store
/// mutates a collection; everyone else gets read access.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FavoritesCollection {
    items: Vec<SavedItem>,
}

impl FavoritesCollection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from any sequence, keeping the first item for each
    /// id. Returns the collection and the number of duplicates discarded.
    pub fn from_items(items: impl IntoIterator<Item = SavedItem>) -> (Self, usize) {
        let mut collection = Self::new();
        let mut dropped = 0;
        for item in items {
            if !collection.push_unique(item) {
                dropped += 1;
            }
        }
        (collection, dropped)
    }

    /// Number of saved items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SavedItem> {
        self.items.iter()
    }

    /// The items in insertion order.
    pub fn as_slice(&self) -> &[SavedItem] {
        &self.items
    }

    /// Index of the item with `id` in display order (linear scan).
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id().as_str() == id)
    }

    /// Whether an item with `id` is saved.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// The saved item with `id`, if any.
    pub fn get(&self, id: &str) -> Option<&SavedItem> {
        self.position(id).map(|i| &self.items[i])
    }

    /// Item ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter().map(SavedItem::id)
    }

    /// Append `item` unless its id is already present.
    pub(crate) fn push_unique(&mut self, item: SavedItem) -> bool {
        if self.contains(item.id().as_str()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Take the item with `id` out, keeping the order of the rest.
    pub(crate) fn remove(&mut self, id: &str) -> Option<SavedItem> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }
}

impl<'a> IntoIterator for &'a FavoritesCollection {
    type Item = &'a SavedItem;
    type IntoIter = std::slice::Iter<'a, SavedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
