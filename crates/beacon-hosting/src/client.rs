//! Client attachment and discovery propagation
//!
//! Provides [`ClientResourceBuilder`], which binds a client project to the
//! sources it should discover. Linking a source does not write anything
//! immediately; it registers a one-shot pending action that runs once the
//! host has finished allocating endpoints.

use std::fmt;
use std::sync::Arc;

use beacon_discovery::{DiscoveryInfoSerializer, JsonDiscoverySerializer};
use beacon_settings::SettingsFileStore;

use crate::builder::{AppHostBuilder, ResourceBuilder};
use crate::error::HostingError;
use crate::eventing::LifecyclePhase;
use crate::resource::{ProjectMetadata, ProjectResource};

/// Options a configure callback can adjust while attaching a client
#[derive(Default)]
pub struct ClientBuilderOptions {
    /// Serializer used to pass discovery info to the client application
    ///
    /// Must be set by the time the configure callback returns; the default
    /// attachment methods install a [`JsonDiscoverySerializer`] over the
    /// client's settings file.
    pub serializer: Option<Arc<dyn DiscoveryInfoSerializer>>,
}

impl fmt::Debug for ClientBuilderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilderOptions")
            .field("serializer", &self.serializer.is_some())
            .finish()
    }
}

/// Builder binding a client project to the sources it discovers
///
/// Created by the attachment methods on [`AppHostBuilder`] and
/// [`ResourceBuilder`]; holds the client's project handle and the serializer
/// that will persist discovery info for it.
pub struct ClientResourceBuilder {
    project: ResourceBuilder<ProjectResource>,
    serializer: Arc<dyn DiscoveryInfoSerializer>,
}

impl ClientResourceBuilder {
    /// Bind a client project handle to a discovery serializer
    #[inline]
    #[must_use]
    pub fn new(
        project: ResourceBuilder<ProjectResource>,
        serializer: Arc<dyn DiscoveryInfoSerializer>,
    ) -> Self {
        Self {
            project,
            serializer,
        }
    }

    /// The client's project resource handle
    #[inline]
    #[must_use]
    pub fn project(&self) -> &ResourceBuilder<ProjectResource> {
        &self.project
    }

    /// Link a source whose endpoints the client should discover
    ///
    /// Registers exactly one pending action on the after-allocation phase;
    /// when the host dispatches it, the action snapshots the source's
    /// allocated endpoints and hands them to the serializer. Until then
    /// nothing is written, and if the phase never dispatches nothing ever
    /// is.
    ///
    /// Each call registers an independent action, so linking several sources
    /// writes each one's subtree without clobbering the others.
    ///
    /// Returns the client's project handle so configuration can be chained.
    pub fn link_source(
        &self,
        source: &ResourceBuilder<ProjectResource>,
    ) -> ResourceBuilder<ProjectResource> {
        let serializer = Arc::clone(&self.serializer);
        let source_handle = source.clone();
        let source_name = source.name();
        let client_name = self.project.name();

        let id = self.project.host().eventing().subscribe(
            LifecyclePhase::AfterEndpointsAllocated,
            Box::new(move |_event, _cancellation| {
                Box::pin(async move {
                    let snapshot = source_handle.discovery_snapshot();
                    serializer.serialize_discovery_info(&snapshot)?;
                    Ok(())
                })
            }),
        );
        tracing::debug!(
            "Linked source '{}' to client '{}' as binding {}",
            source_name,
            client_name,
            id
        );
        self.project.clone()
    }
}

impl fmt::Debug for ClientResourceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientResourceBuilder")
            .field("client", &self.project.name())
            .finish()
    }
}

/// Default configuration: JSON discovery info into the client's settings
/// file
fn default_json_configure(
    options: &mut ClientBuilderOptions,
    metadata: &ProjectMetadata,
    environment: &str,
) -> Result<(), HostingError> {
    let store = SettingsFileStore::new(&metadata.project_path, environment)?;
    options.serializer = Some(Arc::new(JsonDiscoverySerializer::new(store)));
    Ok(())
}

impl AppHostBuilder {
    /// Attach a standalone client application to the model
    ///
    /// Discovery info reaches the client through a `"Services"` section in
    /// its `appsettings.<environment>.json` file. To pass it some other
    /// way, use [`add_standalone_client_with`](Self::add_standalone_client_with)
    /// and install a different serializer.
    ///
    /// # Errors
    /// - [`HostingError::InvalidName`] for an empty or whitespace name
    /// - [`HostingError::DuplicateResource`] when the name is taken
    /// - settings errors from deriving the client's settings file store
    pub fn add_standalone_client(
        &self,
        metadata: ProjectMetadata,
        name: &str,
    ) -> Result<ClientResourceBuilder, HostingError> {
        self.add_standalone_client_with(metadata, name, default_json_configure)
    }

    /// Attach a standalone client application with a configure callback
    ///
    /// The callback receives the attachment options, the client's project
    /// metadata, and the host environment, and must leave a serializer in
    /// the options.
    ///
    /// # Errors
    /// [`HostingError::InvalidArgument`] when the callback leaves no
    /// serializer behind, plus the errors of
    /// [`add_standalone_client`](Self::add_standalone_client).
    pub fn add_standalone_client_with<F>(
        &self,
        metadata: ProjectMetadata,
        name: &str,
        configure: F,
    ) -> Result<ClientResourceBuilder, HostingError>
    where
        F: FnOnce(&mut ClientBuilderOptions, &ProjectMetadata, &str) -> Result<(), HostingError>,
    {
        let project = self.add_project(metadata, name)?;
        let metadata = project.metadata();

        let mut options = ClientBuilderOptions::default();
        configure(&mut options, &metadata, self.environment())?;
        let serializer = options
            .serializer
            .ok_or(HostingError::InvalidArgument("serializer"))?;

        tracing::info!("Attached standalone client '{}'", name);
        Ok(ClientResourceBuilder::new(project, serializer))
    }
}

impl ResourceBuilder<ProjectResource> {
    /// Attach a client application served by this project
    ///
    /// Same behavior as [`AppHostBuilder::add_standalone_client`], with the
    /// client additionally recorded as belonging to this server resource.
    ///
    /// # Errors
    /// See [`AppHostBuilder::add_standalone_client`].
    pub fn add_client(
        &self,
        metadata: ProjectMetadata,
        name: &str,
    ) -> Result<ClientResourceBuilder, HostingError> {
        self.add_client_with(metadata, name, default_json_configure)
    }

    /// Attach a client application with a configure callback
    ///
    /// # Errors
    /// See [`AppHostBuilder::add_standalone_client_with`].
    pub fn add_client_with<F>(
        &self,
        metadata: ProjectMetadata,
        name: &str,
        configure: F,
    ) -> Result<ClientResourceBuilder, HostingError>
    where
        F: FnOnce(&mut ClientBuilderOptions, &ProjectMetadata, &str) -> Result<(), HostingError>,
    {
        let client = self
            .host()
            .add_standalone_client_with(metadata, name, configure)?;
        client.project().set_parent(&self.name());
        tracing::debug!("Attached client '{}' to server '{}'", name, self.name());
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> AppHostBuilder {
        AppHostBuilder::new("Development").unwrap()
    }

    fn metadata(name: &str) -> ProjectMetadata {
        ProjectMetadata::new(name, format!("/projects/{name}")).unwrap()
    }

    #[test]
    fn attach_rejects_empty_name() {
        let err = host()
            .add_standalone_client(metadata("webapp"), "")
            .unwrap_err();
        assert!(matches!(err, HostingError::InvalidName(_)));
    }

    #[test]
    fn attach_requires_a_serializer_from_configure() {
        let err = host()
            .add_standalone_client_with(metadata("webapp"), "webapp", |_options, _meta, _env| {
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, HostingError::InvalidArgument("serializer")));
    }

    #[test]
    fn link_source_registers_one_pending_action_per_call() {
        let host = host();
        let api = host.add_project(metadata("api"), "api").unwrap();
        let auth = host.add_project(metadata("auth"), "auth").unwrap();
        let client = host
            .add_standalone_client(metadata("webapp"), "webapp")
            .unwrap();

        client.link_source(&api);
        client.link_source(&auth);

        assert_eq!(
            host.eventing()
                .pending_count(LifecyclePhase::AfterEndpointsAllocated),
            2
        );
    }

    #[test]
    fn attached_client_records_its_server() {
        let host = host();
        let server = host.add_project(metadata("server"), "server").unwrap();
        let client = server.add_client(metadata("webapp"), "webapp").unwrap();

        assert_eq!(client.project().parent(), Some("server".to_string()));
    }
}
