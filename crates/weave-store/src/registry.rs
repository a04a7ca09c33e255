//! A collection of causal stores keyed by name.
//!
//! Each key gets its own graph and universes. The registry is an ordinary
//! owned value: construct it at session start and pass it to whatever needs
//! it.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::store::{CausalStore, Snapshot};
use std::collections::BTreeMap;
use tracing::debug;

/// Stores indexed by key.
#[derive(Clone, Debug)]
pub struct StoreRegistry<S> {
    /// Configuration handed to every store created here.
    config: StoreConfig,
    stores: BTreeMap<String, CausalStore<S>>,
}

impl<S: Snapshot> StoreRegistry<S> {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            stores: BTreeMap::new(),
        }
    }

    /// Create a store for `key` starting at `initial`.
    pub fn create_store(&mut self, key: impl Into<String>, initial: S) -> Result<&mut CausalStore<S>> {
        let key = key.into();
        if self.stores.contains_key(&key) {
            return Err(StoreError::DuplicateStore(key));
        }

        let store = CausalStore::with_config(key.clone(), initial, self.config.clone())?;
        debug!(store = %key, total = self.stores.len() + 1, "registered store");
        Ok(self.stores.entry(key).or_insert(store))
    }

    pub fn store(&self, key: &str) -> Option<&CausalStore<S>> {
        self.stores.get(key)
    }

    pub fn store_mut(&mut self, key: &str) -> Option<&mut CausalStore<S>> {
        self.stores.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stores.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl<S: Snapshot> Default for StoreRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
