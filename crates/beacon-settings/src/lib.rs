//! Beacon Settings - environment-scoped settings file access
//!
//! The leaf layer of the Beacon workspace:
//! - Derives the settings file path for a (project, environment) pair
//! - Reads the file as an ordered JSON document, creating it when absent
//! - Writes whole documents back with stable, human-readable formatting
//!
//! This crate has no knowledge of service-discovery semantics; higher
//! layers decide what goes into the document.

pub mod document;
pub mod error;
pub mod store;

pub use document::SettingsDocument;
pub use error::SettingsError;
pub use store::SettingsFileStore;
