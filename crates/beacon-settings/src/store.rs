//! Settings file location and access
//!
//! Provides [`SettingsFileStore`]: deterministic location, creation, and
//! read/write of one JSON settings file per (project, environment) pair.

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::SettingsDocument;
use crate::error::SettingsError;

/// Directory under the project root holding client-visible static assets
const STATIC_ASSETS_DIR: &str = "wwwroot";

/// File accessor for one project's environment-specific settings file
///
/// The file path is derived once at construction and never changes:
/// `<projectDir>/wwwroot/appsettings.<environmentName>.json`. This
/// convention is fixed so the client application's own configuration loader
/// finds the file without extra wiring.
///
/// The store knows nothing about what the settings mean; it only moves
/// whole documents between memory and disk. Each [`read`](Self::read)
/// re-parses from storage and each [`write`](Self::write) fully overwrites
/// the file.
#[derive(Debug, Clone)]
pub struct SettingsFileStore {
    file_path: PathBuf,
}

impl SettingsFileStore {
    /// Create a store for the given project and environment
    ///
    /// `project_path` may be the project's root directory or a manifest file
    /// inside it; a final component with an extension is treated as a
    /// manifest file and contributes its parent directory.
    ///
    /// # Errors
    /// - [`SettingsError::InvalidArgument`] when either input is empty
    /// - [`SettingsError::InvalidName`] when the environment name is
    ///   whitespace
    pub fn new(
        project_path: impl AsRef<Path>,
        environment_name: &str,
    ) -> Result<Self, SettingsError> {
        let project_path = project_path.as_ref();
        if project_path.as_os_str().is_empty() {
            return Err(SettingsError::InvalidArgument("project_path"));
        }
        if environment_name.is_empty() {
            return Err(SettingsError::InvalidArgument("environment_name"));
        }
        if environment_name.trim().is_empty() {
            return Err(SettingsError::InvalidName(environment_name.to_string()));
        }

        let project_dir = if project_path.extension().is_some() {
            project_path.parent().unwrap_or_else(|| Path::new("."))
        } else {
            project_path
        };

        let file_path = project_dir
            .join(STATIC_ASSETS_DIR)
            .join(format!("appsettings.{environment_name}.json"));
        tracing::debug!("Derived settings path: {}", file_path.display());

        Ok(Self { file_path })
    }

    /// The derived settings file path
    #[inline]
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Read the settings file as a document
    ///
    /// A missing file is created as an empty JSON object (intermediate
    /// directories included) and an empty document is returned.
    ///
    /// # Errors
    /// [`SettingsError::MalformedSettings`] when the existing content is not
    /// valid JSON or not an object at the top level.
    pub fn read(&self) -> Result<SettingsDocument, SettingsError> {
        if !self.file_path.exists() {
            let doc = SettingsDocument::new();
            self.write(&doc)?;
            tracing::info!("Created empty settings file {}", self.file_path.display());
            return Ok(doc);
        }

        let content = fs::read_to_string(&self.file_path)?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| SettingsError::MalformedSettings {
                path: self.file_path.clone(),
                reason: e.to_string(),
            })?;
        SettingsDocument::from_value(value).ok_or_else(|| SettingsError::MalformedSettings {
            path: self.file_path.clone(),
            reason: "top-level value is not a JSON object".to_string(),
        })
    }

    /// Write a document to the settings file, overwriting it in full
    ///
    /// Content is serialized to an indented string in memory before the
    /// file is touched, so a failed write leaves the previous contents in
    /// place. Intermediate directories are created as needed. No protection
    /// against concurrent external writers is attempted.
    pub fn write(&self, doc: &SettingsDocument) -> Result<(), SettingsError> {
        let serialized = serde_json::to_string_pretty(doc).map_err(SettingsError::Serialize)?;
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.file_path, serialized)?;
        tracing::debug!(
            "Wrote {} top-level keys to {}",
            doc.len(),
            self.file_path.display()
        );
        Ok(())
    }
}
