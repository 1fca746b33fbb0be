//! Beacon Discovery - service-discovery info serialization and lookup
//!
//! The middle layer of the Beacon workspace:
//! - Capability traits for endpoint sources and pluggable serializers
//! - The JSON serializer that merges allocated endpoint URLs into the
//!   "Services" section of a client project's settings file
//! - Consumer-side lookup helpers resolving `services:<name>:<protocol>`
//!   configuration paths back into URLs

pub mod error;
pub mod lookup;
pub mod serializer;
pub mod source;

pub use error::DiscoveryError;
pub use lookup::{service_endpoint, service_endpoints, service_endpoints_any};
pub use serializer::{DiscoveryInfoSerializer, JsonDiscoverySerializer, SERVICES_KEY};
pub use source::{AllocatedEndpoint, DiscoverySource, EndpointSnapshot};
