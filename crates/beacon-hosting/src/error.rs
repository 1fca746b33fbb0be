//! Error types for the hosting layer

use beacon_discovery::DiscoveryError;
use beacon_settings::SettingsError;

/// Main hosting error type
#[derive(Debug, thiserror::Error)]
pub enum HostingError {
    /// A required constructor or method input was empty
    #[error("missing required value: {0}")]
    InvalidArgument(&'static str),

    /// A resource, project, or environment name was empty or whitespace
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// A resource name was registered twice on the same host
    #[error("duplicate resource name: {0:?}")]
    DuplicateResource(String),

    /// Discovery propagation failed
    #[error("discovery propagation failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Settings file access failed
    #[error("settings access failed: {0}")]
    Settings(#[from] SettingsError),
}
