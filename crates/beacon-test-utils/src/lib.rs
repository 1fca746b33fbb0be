//! Testing utilities for the Beacon workspace
//!
//! Shared test helpers, fixtures, and fake serializers.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use beacon_discovery::{
    AllocatedEndpoint, DiscoveryError, DiscoveryInfoSerializer, DiscoverySource, EndpointSnapshot,
};

/// Initialize test-scoped tracing output; repeated calls are harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Settings file path the store derives for a project directory.
pub fn settings_path(project_dir: &Path, environment: &str) -> PathBuf {
    project_dir
        .join("wwwroot")
        .join(format!("appsettings.{environment}.json"))
}

/// Read a settings file straight from disk as raw JSON.
pub fn read_settings_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("settings file must exist");
    serde_json::from_str(&content).expect("settings file must hold valid JSON")
}

/// Build a discovery snapshot from (endpoint, url) pairs.
pub fn snapshot(resource: &str, endpoints: &[(&str, &str)]) -> EndpointSnapshot {
    let mut snapshot = EndpointSnapshot::new(resource);
    for (name, url) in endpoints {
        snapshot.push(AllocatedEndpoint::new(*name, *url));
    }
    snapshot
}

/// Serializer that records every invocation instead of writing files.
#[derive(Debug, Default)]
pub struct RecordingSerializer {
    calls: Mutex<Vec<(String, Vec<AllocatedEndpoint>)>>,
}

impl RecordingSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded (resource name, endpoints) pairs in invocation order.
    pub fn calls(&self) -> Vec<(String, Vec<AllocatedEndpoint>)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl DiscoveryInfoSerializer for RecordingSerializer {
    fn serialize_discovery_info(&self, source: &dyn DiscoverySource) -> Result<(), DiscoveryError> {
        self.calls
            .lock()
            .push((source.resource_name().to_string(), source.endpoints()));
        Ok(())
    }
}

/// Serializer that always fails, for exercising error propagation.
#[derive(Debug, Default)]
pub struct FailingSerializer;

impl DiscoveryInfoSerializer for FailingSerializer {
    fn serialize_discovery_info(
        &self,
        _source: &dyn DiscoverySource,
    ) -> Result<(), DiscoveryError> {
        Err(DiscoveryError::InvalidArgument("forced test failure"))
    }
}
