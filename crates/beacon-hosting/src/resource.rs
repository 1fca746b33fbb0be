//! Application model resources
//!
//! Defines the project resource and its endpoint annotations:
//! - [`ProjectMetadata`]: caller-supplied record locating a project on disk
//! - [`EndpointAnnotation`]: one declared network endpoint
//! - [`ProjectResource`]: a named resource carrying metadata and endpoints

use std::path::{Path, PathBuf};

use beacon_discovery::{AllocatedEndpoint, EndpointSnapshot};

use crate::error::HostingError;

/// Caller-supplied project record
///
/// Replaces framework-generated project-metadata types with an explicit
/// value: a display name and the path locating the project on disk (its
/// root directory, or a manifest file inside it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// Project display name
    pub name: String,
    /// Project root directory or manifest file path
    pub project_path: PathBuf,
}

impl ProjectMetadata {
    /// Create project metadata
    ///
    /// # Errors
    /// - [`HostingError::InvalidArgument`] when the path is empty
    /// - [`HostingError::InvalidName`] when the name is empty or whitespace
    pub fn new(name: impl Into<String>, project_path: impl AsRef<Path>) -> Result<Self, HostingError> {
        let name = name.into();
        let project_path = project_path.as_ref();
        if name.trim().is_empty() {
            return Err(HostingError::InvalidName(name));
        }
        if project_path.as_os_str().is_empty() {
            return Err(HostingError::InvalidArgument("project_path"));
        }
        Ok(Self {
            name,
            project_path: project_path.to_path_buf(),
        })
    }
}

/// One declared network endpoint on a resource
///
/// Declared with a name and scheme, optionally pinning a port; the host
/// assigns any unpinned port during allocation. The concrete URL exists
/// only after allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointAnnotation {
    /// Endpoint name, e.g. "http" or "https"
    pub name: String,
    /// URL scheme used when materializing the allocated URL
    pub scheme: String,
    /// Requested port; `None` asks the host to assign one
    pub port: Option<u16>,
    allocated_url: Option<String>,
}

impl EndpointAnnotation {
    /// Declare an endpoint with an unpinned port
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
            port: None,
            allocated_url: None,
        }
    }

    /// Declare a conventional `http` endpoint
    #[inline]
    #[must_use]
    pub fn http() -> Self {
        Self::new("http", "http")
    }

    /// Declare a conventional `https` endpoint
    #[inline]
    #[must_use]
    pub fn https() -> Self {
        Self::new("https", "https")
    }

    /// Pin the endpoint to a fixed port
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// The allocated URL, if allocation has happened
    #[inline]
    #[must_use]
    pub fn allocated_url(&self) -> Option<&str> {
        self.allocated_url.as_deref()
    }

    pub(crate) fn allocate(&mut self, host: &str, port: u16) {
        self.allocated_url = Some(format!("{}://{}:{}", self.scheme, host, port));
    }
}

/// A named project resource in the application model
#[derive(Debug, Clone)]
pub struct ProjectResource {
    name: String,
    metadata: ProjectMetadata,
    parent: Option<String>,
    endpoints: Vec<EndpointAnnotation>,
}

impl ProjectResource {
    /// Create a resource from a name and project metadata
    ///
    /// # Errors
    /// [`HostingError::InvalidName`] when the name is empty or whitespace.
    pub fn new(name: impl Into<String>, metadata: ProjectMetadata) -> Result<Self, HostingError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(HostingError::InvalidName(name));
        }
        Ok(Self {
            name,
            metadata,
            parent: None,
            endpoints: Vec::new(),
        })
    }

    /// Resource name used for service discovery
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The project metadata supplied at registration
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    /// Name of the server resource this one is attached to, if any
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, parent: impl Into<String>) {
        self.parent = Some(parent.into());
    }

    /// Declare an endpoint on this resource
    pub fn add_endpoint(&mut self, annotation: EndpointAnnotation) {
        self.endpoints.push(annotation);
    }

    /// Declared endpoints in declaration order
    #[inline]
    #[must_use]
    pub fn endpoints(&self) -> &[EndpointAnnotation] {
        &self.endpoints
    }

    /// Allocate every declared endpoint
    ///
    /// Pinned ports are honored; unpinned endpoints receive ports from
    /// `assign_port` in declaration order. Idempotent per endpoint: an
    /// already-allocated endpoint keeps its URL.
    pub(crate) fn allocate_endpoints(
        &mut self,
        host: &str,
        mut assign_port: impl FnMut() -> u16,
    ) {
        for endpoint in &mut self.endpoints {
            if endpoint.allocated_url().is_some() {
                continue;
            }
            let port = endpoint.port.unwrap_or_else(&mut assign_port);
            endpoint.allocate(host, port);
        }
    }

    /// The currently allocated endpoints, in declaration order
    ///
    /// Unallocated endpoints are omitted; before allocation this is empty
    /// rather than an error.
    #[must_use]
    pub fn allocated_endpoints(&self) -> Vec<AllocatedEndpoint> {
        self.endpoints
            .iter()
            .filter_map(|e| {
                e.allocated_url()
                    .map(|url| AllocatedEndpoint::new(e.name.clone(), url))
            })
            .collect()
    }

    /// Immutable discovery snapshot of this resource
    #[must_use]
    pub fn discovery_snapshot(&self) -> EndpointSnapshot {
        let mut snapshot = EndpointSnapshot::new(self.name.clone());
        for endpoint in self.allocated_endpoints() {
            snapshot.push(endpoint);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ProjectMetadata {
        ProjectMetadata::new("webapp", "/projects/webapp").unwrap()
    }

    #[test]
    fn metadata_rejects_bad_inputs() {
        let err = ProjectMetadata::new("  ", "/projects/webapp").unwrap_err();
        assert!(matches!(err, HostingError::InvalidName(_)));

        let err = ProjectMetadata::new("webapp", "").unwrap_err();
        assert!(matches!(err, HostingError::InvalidArgument("project_path")));
    }

    #[test]
    fn resource_rejects_empty_name() {
        let err = ProjectResource::new("", metadata()).unwrap_err();
        assert!(matches!(err, HostingError::InvalidName(_)));
    }

    #[test]
    fn allocation_honors_pinned_ports() {
        let mut resource = ProjectResource::new("api", metadata()).unwrap();
        resource.add_endpoint(EndpointAnnotation::http().with_port(5000));
        resource.add_endpoint(EndpointAnnotation::https());

        assert!(resource.allocated_endpoints().is_empty());

        let mut next = 7000;
        resource.allocate_endpoints("localhost", || {
            let port = next;
            next += 1;
            port
        });

        let urls: Vec<_> = resource
            .allocated_endpoints()
            .into_iter()
            .map(|e| e.url)
            .collect();
        assert_eq!(urls, vec!["http://localhost:5000", "https://localhost:7000"]);
    }

    #[test]
    fn reallocation_keeps_existing_urls() {
        let mut resource = ProjectResource::new("api", metadata()).unwrap();
        resource.add_endpoint(EndpointAnnotation::http());

        resource.allocate_endpoints("localhost", || 5000);
        resource.allocate_endpoints("localhost", || 6000);

        let urls: Vec<_> = resource
            .allocated_endpoints()
            .into_iter()
            .map(|e| e.url)
            .collect();
        assert_eq!(urls, vec!["http://localhost:5000"]);
    }
}
