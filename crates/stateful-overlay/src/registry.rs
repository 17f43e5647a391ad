//! Placeholder Registry
//!
//! Maps placeholder keys to overlay view handles. Owns no transition logic;
//! the state machine decides what a replacement means for the hierarchy.

use std::collections::HashMap;

use stateful_core::PlaceholderKey;

/// Registry of placeholder views by key.
///
/// Keys are unique. Setting a key that already has a view replaces it.
/// Iteration order is unspecified.
#[derive(Debug, Clone)]
pub struct PlaceholderRegistry<V> {
    views: HashMap<PlaceholderKey, V>,
}

impl<V> PlaceholderRegistry<V> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            views: HashMap::new(),
        }
    }

    /// Store `view` under `key`.
    ///
    /// Returns the view previously registered under `key`, if any.
    pub fn set(&mut self, key: impl Into<PlaceholderKey>, view: V) -> Option<V> {
        let key = key.into();
        tracing::debug!("Registered placeholder view for '{}'", key);
        self.views.insert(key, view)
    }

    /// Get the view registered under `key`.
    pub fn get(&self, key: &PlaceholderKey) -> Option<&V> {
        self.views.get(key)
    }

    /// Check if a view is registered under `key`.
    pub fn contains(&self, key: &PlaceholderKey) -> bool {
        self.views.contains_key(key)
    }

    /// All registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &PlaceholderKey> {
        self.views.keys()
    }

    /// All registered views.
    pub fn views(&self) -> impl Iterator<Item = &V> {
        self.views.values()
    }

    /// Get the count of registered views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl<V> Default for PlaceholderRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
