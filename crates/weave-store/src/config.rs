//! Store configuration.

use crate::merge::MergeStrategy;

/// Configuration for a causal store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Name of the universe created together with the store.
    pub initial_universe: String,
    /// Strategy used by [`CausalStore::preview`](crate::CausalStore::preview).
    pub default_strategy: MergeStrategy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_universe: "main".to_string(),
            default_strategy: MergeStrategy::ThreeWay,
        }
    }
}

/// Builder for store configuration.
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
        }
    }

    pub fn initial_universe(mut self, name: impl Into<String>) -> Self {
        self.config.initial_universe = name.into();
        self
    }

    pub fn default_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.config.default_strategy = strategy;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

impl Default for StoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
