//! Static handler composition.
//!
//! The process knows a fixed set of handler factories by name. A manifest
//! (ordered list of names from configuration) selects which of them are
//! registered and in which order.

use std::collections::HashMap;

use tracing::warn;

use crate::registry::HandlerRegistry;
use crate::types::HandlerDescriptor;

type Factory = Box<dyn Fn() -> HandlerDescriptor + Send + Sync>;

#[derive(Default)]
pub struct HandlerCatalog {
    factories: HashMap<String, Factory>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a handler available to manifests under `name`.
    pub fn provide<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> HandlerDescriptor + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Build a registry from an ordered manifest.
    ///
    /// Unknown names and descriptors the registry refuses are logged and skipped.
    pub fn build(&self, manifest: &[String]) -> HandlerRegistry {
        let registry = HandlerRegistry::new();
        for name in manifest {
            let Some(factory) = self.factories.get(name) else {
                warn!(handler = %name, "ignored: no handler with this name");
                continue;
            };
            if let Err(e) = registry.register(factory()) {
                warn!(handler = %name, error = %e, "ignored: registration rejected");
            }
        }
        registry
    }
}
