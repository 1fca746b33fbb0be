//! Error types for discovery serialization and lookup

use beacon_settings::SettingsError;

/// Errors raised while writing or resolving service-discovery info
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// A required input was empty
    #[error("missing required value: {0}")]
    InvalidArgument(&'static str),

    /// A resource name was empty or whitespace
    #[error("invalid resource name: {0:?}")]
    InvalidName(String),

    /// Settings file access failed
    #[error("settings access failed: {0}")]
    Settings(#[from] SettingsError),

    /// Single-endpoint lookup found no matching URL
    #[error("no service endpoint named '{endpoint}' for resource '{resource}'")]
    NoMatchingEndpoint {
        /// Resource name used at registration time
        resource: String,
        /// Endpoint name, e.g. "http" or "https"
        endpoint: String,
    },

    /// Single-endpoint lookup matched more than one URL
    #[error("multiple endpoints named '{endpoint}' for resource '{resource}', expected one")]
    AmbiguousEndpoint {
        /// Resource name used at registration time
        resource: String,
        /// Endpoint name, e.g. "http" or "https"
        endpoint: String,
    },
}
