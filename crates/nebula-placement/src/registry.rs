//! Content registries: ordered tables keyed by [`ContentKey`].
//!
//! Registries are built once during world setup and shared read-only
//! afterwards. Iteration follows registration order, which makes every
//! "first match" scan over a registry deterministic.

use std::sync::Arc;

use hashbrown::HashMap;
use thiserror::Error;

use crate::biome::BiomeRegistry;
use crate::feature::{ConfiguredFeature, Feature};
use crate::key::ContentKey;
use crate::structure::{ConfiguredStructure, Structure};

/// Errors that can occur when registering content.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An entry with this key is already registered.
    #[error("duplicate content key: {0}")]
    DuplicateKey(ContentKey),
}

/// Ordered table of shared entries with O(1) lookup by key.
pub struct Registry<T: ?Sized> {
    /// Entries in registration order.
    entries: Vec<(ContentKey, Arc<T>)>,
    /// Reverse lookup: key → index into `entries`.
    index: HashMap<ContentKey, usize>,
}

impl<T: ?Sized> Registry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers `value` under `key` and hands the shared entry back.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] if `key` is already present.
    pub fn register(&mut self, key: ContentKey, value: Arc<T>) -> Result<Arc<T>, RegistryError> {
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, Arc::clone(&value)));
        Ok(value)
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &ContentKey) -> Option<&Arc<T>> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Returns `true` if `key` is registered.
    pub fn contains(&self, key: &ContentKey) -> bool {
        self.index.contains_key(key)
    }

    /// Finds the key an entry was registered under (pointer identity).
    pub fn key_of(&self, value: &Arc<T>) -> Option<&ContentKey> {
        self.entries
            .iter()
            .find(|(_, entry)| Arc::ptr_eq(entry, value))
            .map(|(key, _)| key)
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ContentKey, &Arc<T>)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The engine-owned registries consulted during resolution.
#[derive(Default)]
pub struct Registries {
    /// Bare structure types.
    pub structure_types: Registry<dyn Structure>,
    /// Structure types bound to a configuration.
    pub configured_structures: Registry<ConfiguredStructure>,
    /// Bare feature types.
    pub feature_types: Registry<dyn Feature>,
    /// Feature types bound to a configuration.
    pub configured_features: Registry<ConfiguredFeature>,
    /// Biomes and their generation profiles.
    pub biomes: BiomeRegistry,
}

impl Registries {
    /// Creates an empty set of registries.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut reg: Registry<u32> = Registry::new();
        reg.register(ContentKey::builtin("a"), Arc::new(1)).unwrap();
        reg.register(ContentKey::builtin("b"), Arc::new(2)).unwrap();

        assert_eq!(reg.get(&ContentKey::builtin("b")).map(|v| **v), Some(2));
        assert!(reg.get(&ContentKey::builtin("c")).is_none());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut reg: Registry<u32> = Registry::new();
        reg.register(ContentKey::builtin("a"), Arc::new(1)).unwrap();
        let result = reg.register(ContentKey::builtin("a"), Arc::new(2));
        assert!(matches!(result, Err(RegistryError::DuplicateKey(_))));
        assert_eq!(reg.get(&ContentKey::builtin("a")).map(|v| **v), Some(1));
    }

    #[test]
    fn test_iteration_follows_registration_order() {
        let mut reg: Registry<u32> = Registry::new();
        for (i, name) in ["zeta", "alpha", "mid"].iter().enumerate() {
            reg.register(ContentKey::builtin(name), Arc::new(i as u32))
                .unwrap();
        }
        let order: Vec<_> = reg.iter().map(|(k, _)| k.path().to_string()).collect();
        assert_eq!(order, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_key_of_uses_identity() {
        let mut reg: Registry<u32> = Registry::new();
        let first = reg.register(ContentKey::builtin("a"), Arc::new(7)).unwrap();
        reg.register(ContentKey::builtin("b"), Arc::new(7)).unwrap();
        assert_eq!(reg.key_of(&first), Some(&ContentKey::builtin("a")));
        assert_eq!(reg.key_of(&Arc::new(7)), None);
    }
}
