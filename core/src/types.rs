//! Domain types shared by the client and the state container.
//!
//! # Design
//! The item schema belongs to the server, so `Item` is a thin wrapper around
//! a JSON object rather than a typed struct. The only field the crate looks
//! at is `id`, compared by JSON value equality: `1` and `"1"` are different
//! identifiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query parameters appended to `get_all` and `get` requests.
///
/// A `BTreeMap` keeps the encoded query string stable.
pub type Params = BTreeMap<String, String>;

/// A single resource item: a JSON object owned by the server schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The item's identifier. Absent and `null` ids are both `None`.
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id").filter(|id| !id.is_null())
    }

    /// Whether `other` carries the same identifier. Items without an id
    /// never match anything.
    pub fn same_id(&self, other: &Item) -> bool {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Item {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Item {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Value::Object(item.0)
    }
}
