//! Error types for settings file access

use std::path::PathBuf;

/// Errors raised while locating, reading, or writing a settings file
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required constructor or method input was empty
    #[error("missing required value: {0}")]
    InvalidArgument(&'static str),

    /// An identifier was empty or whitespace where a non-empty name is required
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// The existing settings file is not valid JSON or not a JSON object
    #[error("malformed settings file {path}: {reason}", path = .path.display())]
    MalformedSettings {
        /// Path of the offending file
        path: PathBuf,
        /// What the parser rejected
        reason: String,
    },

    /// Serializing a document failed
    #[error("settings serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Underlying file system failure
    #[error("settings io failure: {0}")]
    Io(#[from] std::io::Error),
}
