//! Discovery source capability
//!
//! Provides [`DiscoverySource`], the capability interface for anything that
//! exposes named, already-allocated endpoints, and [`EndpointSnapshot`], an
//! immutable value implementation handed to serializers at dispatch time.

/// One allocated network endpoint of a source resource
///
/// The URL is a complete scheme+host+port string, e.g.
/// `https://localhost:7043`. Endpoint names are commonly `"http"` and
/// `"https"` but arbitrary names are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedEndpoint {
    /// Endpoint name as declared on the resource
    pub name: String,
    /// Allocated URL
    pub url: String,
}

impl AllocatedEndpoint {
    /// Create a new allocated endpoint
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A resource whose allocated endpoints can be serialized for discovery
///
/// Endpoints must already be allocated when [`endpoints`](Self::endpoints)
/// is called; calling it earlier yields an empty or incomplete set, which is
/// a caller error rather than a failure.
pub trait DiscoverySource: Send + Sync {
    /// Stable resource name used as the service name in the settings file
    fn resource_name(&self) -> &str;

    /// The currently allocated endpoints, in declaration order
    fn endpoints(&self) -> Vec<AllocatedEndpoint>;
}

/// Immutable snapshot of a source's name and allocated endpoints
///
/// Taken at the moment the allocation signal fires, so serializers see a
/// consistent view regardless of later resource mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSnapshot {
    resource_name: String,
    endpoints: Vec<AllocatedEndpoint>,
}

impl EndpointSnapshot {
    /// Create an empty snapshot for a resource
    #[inline]
    #[must_use]
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            endpoints: Vec::new(),
        }
    }

    /// Append an endpoint, returning the snapshot
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.push(AllocatedEndpoint::new(name, url));
        self
    }

    /// Append an endpoint in place
    #[inline]
    pub fn push(&mut self, endpoint: AllocatedEndpoint) {
        self.endpoints.push(endpoint);
    }
}

impl DiscoverySource for EndpointSnapshot {
    fn resource_name(&self) -> &str {
        &self.resource_name
    }

    fn endpoints(&self) -> Vec<AllocatedEndpoint> {
        self.endpoints.clone()
    }
}
