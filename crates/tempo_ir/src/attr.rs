//! Extra attributes carried by a node beyond its schema-known fields.
//!
//! Everything a node's grammar understands (symbol names, port counts, reset
//! configuration) lives in typed fields on the node kind. The [`AttrMap`] only
//! carries attributes the grammar passes through untouched, preserving
//! insertion order so printing is deterministic.

use serde::{Deserialize, Serialize};

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    /// A signed integer attribute.
    Int(i64),
    /// A string attribute.
    Str(String),
    /// A unit (presence-only) attribute.
    Unit,
}

/// An insertion-ordered map of extra attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrMap {
    entries: Vec<(String, AttrValue)>,
}

impl AttrMap {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an attribute. Returns `false` (leaving the map unchanged) if
    /// the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: AttrValue) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.entries.push((key, value));
        true
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Removes and returns the value for `key`, if present.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
