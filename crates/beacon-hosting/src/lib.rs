//! Beacon Hosting - application model and discovery propagation
//!
//! The orchestration layer of the Beacon workspace:
//! - Registers project resources and allocates their network endpoints
//! - Runs the two-phase lifecycle eventing protocol
//! - Attaches client applications and defers discovery propagation until
//!   endpoint allocation is final
//!
//! # Example
//!
//! ```rust,ignore
//! use beacon_hosting::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let host = AppHostBuilder::new("Development")?;
//!
//! let api = host
//!     .add_project(ProjectMetadata::new("api", "./api")?, "api")?
//!     .with_endpoint(EndpointAnnotation::http())
//!     .with_endpoint(EndpointAnnotation::https());
//!
//! host.add_standalone_client(ProjectMetadata::new("webapp", "./webapp")?, "webapp")?
//!     .link_source(&api);
//!
//! host.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod eventing;
pub mod resource;

pub use builder::{AppHostBuilder, ResourceBuilder};
pub use client::{ClientBuilderOptions, ClientResourceBuilder};
pub use error::HostingError;
pub use eventing::{
    AllocatedEndpointsEvent, BindingId, LifecycleEvent, LifecycleEventing, LifecyclePhase,
    PendingAction, ResourceAllocation,
};
pub use resource::{EndpointAnnotation, ProjectMetadata, ProjectResource};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Beacon hosting
    pub use crate::{
        AppHostBuilder, ClientResourceBuilder, EndpointAnnotation, HostingError, LifecyclePhase,
        ProjectMetadata, ResourceBuilder,
    };
    pub use beacon_discovery::{DiscoveryInfoSerializer, DiscoverySource};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
