//! Static registry of media backend factories
//!
//! Backends are selected by identifier at startup. Factories are plain
//! function pointers registered explicitly, so the set of available
//! backends is visible in one place instead of being discovered by
//! naming convention.

use std::collections::HashMap;
use std::sync::Arc;

use super::{MediaBackend, NullBackend};
use crate::config::BackendConfig;
use crate::error::AirPlayerError;

/// Factory building a backend from its connection settings
pub type BackendFactory = fn(&BackendConfig) -> Arc<dyn MediaBackend>;

/// Registry mapping backend identifiers to factories
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with the built-in backends registered
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("null", NullBackend::create);
        registry
    }

    /// Register a factory under an identifier
    ///
    /// Re-registering an identifier replaces the previous factory.
    pub fn register(&mut self, id: impl Into<String>, factory: BackendFactory) {
        self.factories.insert(id.into(), factory);
    }

    /// Instantiate the backend registered under `id`
    ///
    /// # Errors
    ///
    /// Returns [`AirPlayerError::UnknownBackend`] when no factory is
    /// registered under `id`.
    pub fn create(
        &self,
        id: &str,
        config: &BackendConfig,
    ) -> Result<Arc<dyn MediaBackend>, AirPlayerError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| AirPlayerError::UnknownBackend {
                id: id.to_string(),
                available: self.ids().join(", "),
            })?;

        Ok(factory(config))
    }

    /// Sorted list of registered identifiers
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
