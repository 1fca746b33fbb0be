//! In-memory model of one settings file
//!
//! Provides [`SettingsDocument`], an ordered JSON object wrapper with
//! case-insensitive key resolution for configuration-path lookups.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The full contents of one environment-specific settings file
///
/// Key order is preserved across read/merge/write so that unrelated keys
/// survive a round-trip untouched. Mutation is always whole-subtree: callers
/// replace a key's value rather than patching inside it.
///
/// Equality is key-order insensitive, matching the round-trip contract of
/// the file store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsDocument {
    root: Map<String, Value>,
}

impl SettingsDocument {
    /// Create an empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a parsed JSON value
    ///
    /// Returns `None` when the value is not an object at the top level.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(root) => Some(Self { root }),
            _ => None,
        }
    }

    /// Number of top-level keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Check whether the document has no keys
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Get a top-level value by exact key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Get a top-level value, matching the key case-insensitively
    ///
    /// Exact matches win; otherwise the first key comparing equal under
    /// ASCII case folding is returned.
    #[must_use]
    pub fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.root.get(key) {
            return Some(value);
        }
        self.root
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Insert or replace a top-level value
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.root.insert(key.into(), value)
    }

    /// Get a mutable handle to the object stored under `key`
    ///
    /// A missing key, or a key holding a non-object value, is replaced with
    /// an empty object first.
    pub fn entry_object_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        if !matches!(self.root.get(key), Some(Value::Object(_))) {
            self.root.insert(key.to_string(), Value::Object(Map::new()));
        }
        match self.root.get_mut(key) {
            Some(Value::Object(map)) => map,
            _ => unreachable!("entry was just replaced with an object"),
        }
    }

    /// Resolve a configuration path, one object level per segment
    ///
    /// Segments are matched case-insensitively (exact match preferred), the
    /// way a configuration-path reader resolves `services:api:http`.
    #[must_use]
    pub fn resolve_path(&self, segments: &[&str]) -> Option<&Value> {
        let (first, rest) = segments.split_first()?;
        let mut current = self.get_ignore_case(first)?;
        for segment in rest {
            let Value::Object(map) = current else {
                return None;
            };
            current = match map.get(*segment) {
                Some(value) => value,
                None => {
                    map.iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(segment))
                        .map(|(_, v)| v)?
                }
            };
        }
        Some(current)
    }

    /// Borrow the underlying object map
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }
}

impl From<Map<String, Value>> for SettingsDocument {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}
