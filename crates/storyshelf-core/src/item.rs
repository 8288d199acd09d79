use std::borrow::Borrow;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ItemError;

/// Identity key of a [`SavedItem`]. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Validate and wrap an id. Empty and whitespace-only ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, ItemError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ItemError::EmptyId);
        }
        Ok(Self(id))
    }

    /// The id as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ItemId {
    type Error = ItemError;

    fn try_from(id: &str) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

/// Field name the item identity is written under.
pub const ID_FIELD: &str = "id";

/// Document key used by the publishing API; accepted on read.
pub const LEGACY_ID_FIELD: &str = "_id";

/// A bookmarked work: an identity plus an opaque payload.
///
/// On disk an item is one flat JSON object. The identity is read from `id`,
/// falling back to `_id`, and always written back as `id`. Every other field
/// is carried through untouched; the store only ever compares ids.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct SavedItem {
    id: ItemId,
    fields: Map<String, Value>,
}

impl SavedItem {
    /// An item with `id` and an empty payload.
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    /// Attach a payload field. The `id` key is reserved for the identity and
    /// is ignored here.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != ID_FIELD {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// The identity the store dedups on.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// A payload field by name. The identity is not a field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The opaque payload, without the identity.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The `title` field, when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.field("title").and_then(Value::as_str)
    }

    /// The `author` field, when it is a string. The publishing API sometimes
    /// embeds an author object instead, which reads as `None`.
    pub fn author(&self) -> Option<&str> {
        self.field("author").and_then(Value::as_str)
    }

    /// The `coverImage` field, when it is a string.
    pub fn cover_image(&self) -> Option<&str> {
        self.field("coverImage").and_then(Value::as_str)
    }
}

impl TryFrom<Map<String, Value>> for SavedItem {
    type Error = ItemError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let raw = fields
            .remove(ID_FIELD)
            .or_else(|| fields.remove(LEGACY_ID_FIELD))
            .ok_or(ItemError::MissingId)?;
        let Value::String(raw) = raw else {
            return Err(ItemError::IdNotString);
        };
        Ok(Self {
            id: ItemId::new(raw)?,
            fields,
        })
    }
}

impl TryFrom<Value> for SavedItem {
    type Error = ItemError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Self::try_from(map),
            _ => Err(ItemError::NotAnObject),
        }
    }
}

impl Serialize for SavedItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
