//! Host and resource builders
//!
//! Provides [`AppHostBuilder`], the orchestration-time application model
//! (resources, endpoint allocation, lifecycle dispatch), and
//! [`ResourceBuilder`], the shared handle callers configure resources
//! through.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use beacon_discovery::EndpointSnapshot;

use crate::error::HostingError;
use crate::eventing::{
    AllocatedEndpointsEvent, LifecycleEvent, LifecycleEventing, LifecyclePhase, ResourceAllocation,
};
use crate::resource::{EndpointAnnotation, ProjectMetadata, ProjectResource};

/// Host name used when materializing allocated URLs
const ALLOCATION_HOST: &str = "localhost";

/// First port handed out to endpoints without a pinned port
const FIRST_DYNAMIC_PORT: u16 = 5000;

/// Orchestration-time application model
///
/// Owns the environment name, the registered resources, and the lifecycle
/// eventing registry. Cheap to clone; all clones share state.
///
/// A host run ([`start`](Self::start)) moves through the lifecycle once:
/// `BeforeStart` dispatch, endpoint allocation, `AfterEndpointsAllocated`
/// dispatch. Shutting down beforehand suppresses the remaining dispatches,
/// which is the only cancellation surface the model exposes.
#[derive(Debug, Clone)]
pub struct AppHostBuilder {
    inner: Arc<HostInner>,
}

#[derive(Debug)]
struct HostInner {
    environment: String,
    resources: Mutex<Vec<Arc<Mutex<ProjectResource>>>>,
    eventing: LifecycleEventing,
    shutdown: CancellationToken,
    next_port: AtomicU16,
}

impl AppHostBuilder {
    /// Create a host for one environment
    ///
    /// # Errors
    /// - [`HostingError::InvalidArgument`] when the environment is empty
    /// - [`HostingError::InvalidName`] when it is whitespace
    pub fn new(environment: impl Into<String>) -> Result<Self, HostingError> {
        let environment = environment.into();
        if environment.is_empty() {
            return Err(HostingError::InvalidArgument("environment"));
        }
        if environment.trim().is_empty() {
            return Err(HostingError::InvalidName(environment));
        }
        Ok(Self {
            inner: Arc::new(HostInner {
                environment,
                resources: Mutex::new(Vec::new()),
                eventing: LifecycleEventing::new(),
                shutdown: CancellationToken::new(),
                next_port: AtomicU16::new(FIRST_DYNAMIC_PORT),
            }),
        })
    }

    /// Environment name, e.g. "Development"
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.inner.environment
    }

    /// The lifecycle eventing registry
    #[inline]
    #[must_use]
    pub fn eventing(&self) -> &LifecycleEventing {
        &self.inner.eventing
    }

    /// Token observed by lifecycle dispatch
    #[inline]
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Request shutdown; pending dispatches will be suppressed
    pub fn shutdown(&self) {
        tracing::info!("Host shutdown requested");
        self.inner.shutdown.cancel();
    }

    /// Register a project resource under a unique name
    ///
    /// # Errors
    /// - [`HostingError::InvalidName`] when the name is empty or whitespace
    /// - [`HostingError::DuplicateResource`] when the name is taken
    pub fn add_project(
        &self,
        metadata: ProjectMetadata,
        name: &str,
    ) -> Result<ResourceBuilder<ProjectResource>, HostingError> {
        let resource = ProjectResource::new(name, metadata)?;
        let mut resources = self.inner.resources.lock();
        if resources.iter().any(|r| r.lock().name() == name) {
            return Err(HostingError::DuplicateResource(name.to_string()));
        }
        let resource = Arc::new(Mutex::new(resource));
        resources.push(Arc::clone(&resource));
        tracing::debug!("Added project resource '{}'", name);
        Ok(ResourceBuilder {
            resource,
            host: self.clone(),
        })
    }

    /// Names of all registered resources, in registration order
    #[must_use]
    pub fn resource_names(&self) -> Vec<String> {
        self.inner
            .resources
            .lock()
            .iter()
            .map(|r| r.lock().name().to_string())
            .collect()
    }

    /// Run the host lifecycle once
    ///
    /// Dispatches `BeforeStart`, allocates endpoints for every registered
    /// resource, then dispatches `AfterEndpointsAllocated` with an immutable
    /// snapshot of the allocations. Each phase fires at most once per run;
    /// a shutdown requested before a phase suppresses it.
    ///
    /// # Errors
    /// The first pending-action failure propagates unchanged.
    pub async fn start(&self) -> Result<(), HostingError> {
        let cancellation = self.shutdown_token();
        self.inner
            .eventing
            .dispatch(
                LifecyclePhase::BeforeStart,
                LifecycleEvent::BeforeStart,
                cancellation.clone(),
            )
            .await?;

        if cancellation.is_cancelled() {
            tracing::warn!("Host shut down before endpoint allocation");
            return Ok(());
        }

        let allocations = self.allocate_endpoints();
        tracing::info!("Allocated endpoints for {} resources", allocations.len());

        let fired = self
            .inner
            .eventing
            .dispatch(
                LifecyclePhase::AfterEndpointsAllocated,
                LifecycleEvent::AfterEndpointsAllocated(AllocatedEndpointsEvent::new(allocations)),
                cancellation,
            )
            .await?;
        tracing::info!("Completed {} pending after-allocation actions", fired);
        Ok(())
    }

    fn allocate_endpoints(&self) -> Vec<ResourceAllocation> {
        let resources = self.inner.resources.lock();
        let mut allocations = Vec::with_capacity(resources.len());
        for resource in resources.iter() {
            let mut resource = resource.lock();
            resource.allocate_endpoints(ALLOCATION_HOST, || {
                self.inner.next_port.fetch_add(1, Ordering::Relaxed)
            });
            allocations.push(ResourceAllocation {
                resource: resource.name().to_string(),
                endpoints: resource.allocated_endpoints(),
            });
        }
        allocations
    }
}

/// Shared handle to a resource registered with a host
///
/// Clones refer to the same resource; configuration through any clone is
/// visible to all.
#[derive(Debug)]
pub struct ResourceBuilder<R> {
    resource: Arc<Mutex<R>>,
    host: AppHostBuilder,
}

impl<R> Clone for ResourceBuilder<R> {
    fn clone(&self) -> Self {
        Self {
            resource: Arc::clone(&self.resource),
            host: self.host.clone(),
        }
    }
}

impl ResourceBuilder<ProjectResource> {
    /// Resource name used for service discovery
    #[must_use]
    pub fn name(&self) -> String {
        self.resource.lock().name().to_string()
    }

    /// The host this resource is registered with
    #[inline]
    #[must_use]
    pub fn host(&self) -> &AppHostBuilder {
        &self.host
    }

    /// The project metadata supplied at registration
    #[must_use]
    pub fn metadata(&self) -> ProjectMetadata {
        self.resource.lock().metadata().clone()
    }

    /// Declare an endpoint, returning the builder for chaining
    #[must_use]
    pub fn with_endpoint(self, annotation: EndpointAnnotation) -> Self {
        self.resource.lock().add_endpoint(annotation);
        self
    }

    /// Immutable snapshot of the resource's allocated endpoints
    #[must_use]
    pub fn discovery_snapshot(&self) -> EndpointSnapshot {
        self.resource.lock().discovery_snapshot()
    }

    pub(crate) fn set_parent(&self, parent: &str) {
        self.resource.lock().set_parent(parent);
    }

    #[cfg(test)]
    pub(crate) fn parent(&self) -> Option<String> {
        self.resource.lock().parent().map(str::to_string)
    }
}
