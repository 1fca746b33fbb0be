//! Discovery info serialization
//!
//! Provides the [`DiscoveryInfoSerializer`] capability and its JSON
//! implementation, which merges a source's allocated endpoints into the
//! "Services" section of a target project's settings file.

use serde_json::{Map, Value};

use beacon_settings::SettingsFileStore;

use crate::error::DiscoveryError;
use crate::source::DiscoverySource;

/// Fixed top-level key holding propagated discovery info
pub const SERVICES_KEY: &str = "Services";

/// Writes one source's discovery info to a target destination
///
/// Implementations decide the storage format; the propagation builder only
/// depends on this trait, so an alternate implementation (say, XML) plugs in
/// without touching the builder.
pub trait DiscoveryInfoSerializer: Send + Sync {
    /// Persist the source's current endpoints for the target application
    ///
    /// # Errors
    /// Implementation-specific; the JSON implementation surfaces settings
    /// file failures unchanged.
    fn serialize_discovery_info(&self, source: &dyn DiscoverySource) -> Result<(), DiscoveryError>;
}

/// JSON serializer writing `Services.<resource>.<endpoint> = [urls]`
///
/// Each invocation is a full read-modify-write of the settings document:
/// the current file state is read, only the `Services.<resource>` subtree is
/// replaced, every other key is left untouched, and the whole document is
/// written back. The subtree is replaced wholesale, never appended to,
/// because each merge carries the complete current endpoint set.
#[derive(Debug, Clone)]
pub struct JsonDiscoverySerializer {
    store: SettingsFileStore,
}

impl JsonDiscoverySerializer {
    /// Create a serializer targeting one settings file store
    #[inline]
    #[must_use]
    pub fn new(store: SettingsFileStore) -> Self {
        Self { store }
    }

    /// The underlying settings file store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &SettingsFileStore {
        &self.store
    }

    /// Group allocated URLs by endpoint name, deduplicated, in declaration
    /// order
    fn endpoint_subtree(source: &dyn DiscoverySource) -> Map<String, Value> {
        let mut subtree = Map::new();
        for endpoint in source.endpoints() {
            let urls = subtree
                .entry(endpoint.name)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(urls) = urls {
                let url = Value::String(endpoint.url);
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }
        subtree
    }
}

impl DiscoveryInfoSerializer for JsonDiscoverySerializer {
    fn serialize_discovery_info(&self, source: &dyn DiscoverySource) -> Result<(), DiscoveryError> {
        let resource_name = source.resource_name().to_string();
        if resource_name.trim().is_empty() {
            return Err(DiscoveryError::InvalidName(resource_name));
        }

        let subtree = Self::endpoint_subtree(source);
        if subtree.is_empty() {
            tracing::warn!(
                "Resource '{}' has no allocated endpoints to propagate",
                resource_name
            );
        }

        let mut doc = self.store.read()?;
        doc.entry_object_mut(SERVICES_KEY)
            .insert(resource_name.clone(), Value::Object(subtree));
        self.store.write(&doc)?;

        tracing::info!(
            "Propagated discovery info for '{}' to {}",
            resource_name,
            self.store.file_path().display()
        );
        Ok(())
    }
}
