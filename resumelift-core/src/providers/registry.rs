//! Provider registry with explicit default selection
//!
//! The registry is a plain instance owned by the application's composition
//! root and passed by reference to consumers; there is deliberately no
//! global singleton. Names are compared trimmed and lowercased, and the
//! normalization is applied explicitly before every map operation.
//!
//! Registry failures are local configuration errors raised synchronously;
//! they are never routed through the failure taxonomy and never retried.

use crate::providers::adapter::Provider;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registration with an empty or whitespace-only name
    #[error("provider name must not be empty")]
    InvalidName,

    /// The provider's self-description failed the shape check
    #[error("provider '{name}' is invalid: {reason}")]
    InvalidProvider { name: String, reason: String },

    /// Lookup of a name with no registration behind it
    #[error("provider not found: '{name}'")]
    NotFound { name: String },
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Holds named provider implementations and tracks exactly one default
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_name: Option<String>,
}

/// Trim and lowercase a provider name for use as a map key
fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under a name
    ///
    /// The first successful registration becomes the default. Registering a
    /// name that already exists overwrites the previous entry with a
    /// warning rather than an error.
    pub fn register(
        &mut self,
        name: &str,
        provider: Arc<dyn Provider>,
    ) -> RegistryResult<()> {
        let key = normalize_name(name);
        if key.is_empty() {
            return Err(RegistryError::InvalidName);
        }

        // The trait statically guarantees the capability set; the runtime
        // check that remains is on the metadata the provider reports.
        let info = provider.info();
        if info.name.trim().is_empty() {
            return Err(RegistryError::InvalidProvider {
                name: key,
                reason: "info().name is empty".to_string(),
            });
        }
        if info.display_name.trim().is_empty() {
            return Err(RegistryError::InvalidProvider {
                name: key,
                reason: "info().display_name is empty".to_string(),
            });
        }

        if self.providers.insert(key.clone(), provider).is_some() {
            warn!(provider = %key, "overwriting existing provider registration");
        } else {
            debug!(provider = %key, "registered provider");
        }

        if self.default_name.is_none() {
            self.default_name = Some(key);
        }
        Ok(())
    }

    /// Look up a provider by name; None when absent
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(&normalize_name(name)).cloned()
    }

    /// Look up a provider by name, raising NotFound when absent
    pub fn get_or_err(&self, name: &str) -> RegistryResult<Arc<dyn Provider>> {
        self.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.trim().to_string(),
        })
    }

    /// The current default provider, raising NotFound when none is set
    pub fn default_provider(&self) -> RegistryResult<Arc<dyn Provider>> {
        let name = self
            .default_name
            .as_deref()
            .ok_or_else(|| RegistryError::NotFound {
                name: "(default)".to_string(),
            })?;
        self.get_or_err(name)
    }

    /// The normalized name of the current default, if any
    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Make an already-registered provider the default
    pub fn set_default(&mut self, name: &str) -> RegistryResult<()> {
        let key = normalize_name(name);
        if !self.providers.contains_key(&key) {
            return Err(RegistryError::NotFound {
                name: name.trim().to_string(),
            });
        }
        self.default_name = Some(key);
        Ok(())
    }

    /// Remove a provider; returns whether anything was removed
    ///
    /// If the removed entry was the default, the first remaining provider
    /// in iteration order is promoted, or the default is cleared when the
    /// registry became empty.
    pub fn unregister(&mut self, name: &str) -> bool {
        let key = normalize_name(name);
        let removed = self.providers.remove(&key).is_some();
        if removed && self.default_name.as_deref() == Some(key.as_str()) {
            self.default_name = self.providers.keys().next().cloned();
            debug!(
                new_default = self.default_name.as_deref().unwrap_or("(none)"),
                "default provider unregistered, re-elected"
            );
        }
        removed
    }

    /// Remove all providers and clear the default
    pub fn clear(&mut self) {
        self.providers.clear();
        self.default_name = None;
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry holds no providers
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Normalized names of all registered providers
    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }
}
