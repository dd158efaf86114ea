//! # Algorithm Registry
//!
//! Maps method names to cipher implementations.
//!
//! ## Policy
//!
//! - Names are case-sensitive and unique.
//! - Registering a name twice replaces the first entry (last registration
//!   wins). The replaced entry keeps its slot in the listing order.
//! - Entries are never removed.
//! - After initialisation the registry is only read, so it is shared as
//!   `Arc<AlgorithmRegistry>` without a lock.

use crate::domain::errors::RegistryError;
use crate::ports::CipherAlgorithm;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Insertion-ordered table of cipher methods keyed by name.
#[derive(Debug, Default, Clone)]
pub struct AlgorithmRegistry {
    /// Methods in registration order.
    entries: Vec<Arc<dyn CipherAlgorithm>>,
    /// Name → index into `entries`.
    index: HashMap<String, usize>,
}

impl AlgorithmRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method under its own `name()`.
    ///
    /// Returns the previously registered method with the same name, if any.
    pub fn register<A>(&mut self, algorithm: A) -> Option<Arc<dyn CipherAlgorithm>>
    where
        A: CipherAlgorithm + 'static,
    {
        self.register_shared(Arc::new(algorithm))
    }

    /// Register an already shared method instance.
    pub fn register_shared(
        &mut self,
        algorithm: Arc<dyn CipherAlgorithm>,
    ) -> Option<Arc<dyn CipherAlgorithm>> {
        let name = algorithm.name().to_string();

        if let Some(&slot) = self.index.get(&name) {
            warn!(method = %name, "Method already registered, replacing");
            let previous = std::mem::replace(&mut self.entries[slot], algorithm);
            return Some(previous);
        }

        debug!(method = %name, "Registered cipher method");
        self.index.insert(name, self.entries.len());
        self.entries.push(algorithm);
        None
    }

    /// Look up a method by exact name.
    ///
    /// # Errors
    ///
    /// `RegistryError::NotFound` if no method has that name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CipherAlgorithm>, RegistryError> {
        self.index
            .get(name)
            .map(|&slot| Arc::clone(&self.entries[slot]))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Names of all registered methods, in registration order.
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|algorithm| algorithm.name().to_string())
            .collect()
    }

    /// Check whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
