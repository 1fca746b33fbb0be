//! End-to-end propagation tests
//!
//! Drive the full path: attach a client, link sources, run the host
//! lifecycle once, and assert on the settings file the client application
//! would load at startup.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use beacon_hosting::prelude::*;
use beacon_test_utils::{init_tracing, read_settings_json, settings_path, RecordingSerializer};

const ENVIRONMENT: &str = "Development";

fn metadata(name: &str, dir: &Path) -> ProjectMetadata {
    ProjectMetadata::new(name, dir).unwrap()
}

fn api_project(host: &AppHostBuilder) -> ResourceBuilder<beacon_hosting::ProjectResource> {
    host.add_project(
        ProjectMetadata::new("api", "/projects/api").unwrap(),
        "api",
    )
    .unwrap()
    .with_endpoint(EndpointAnnotation::http().with_port(5200))
    .with_endpoint(EndpointAnnotation::https().with_port(7200))
}

#[tokio::test]
async fn start_writes_linked_source_endpoints() {
    init_tracing();
    let client_dir = tempfile::tempdir().unwrap();
    let host = AppHostBuilder::new(ENVIRONMENT).unwrap();
    let api = api_project(&host);

    let client = host
        .add_standalone_client(metadata("webapp", client_dir.path()), "webapp")
        .unwrap();
    client.link_source(&api);

    host.start().await.unwrap();

    let settings = read_settings_json(&settings_path(client_dir.path(), ENVIRONMENT));
    assert_eq!(
        settings["Services"]["api"],
        json!({
            "http": ["http://localhost:5200"],
            "https": ["https://localhost:7200"]
        })
    );
}

#[tokio::test]
async fn never_starting_never_writes() {
    let client_dir = tempfile::tempdir().unwrap();
    let host = AppHostBuilder::new(ENVIRONMENT).unwrap();
    let api = api_project(&host);

    let client = host
        .add_standalone_client(metadata("webapp", client_dir.path()), "webapp")
        .unwrap();
    client.link_source(&api);

    // No host run, no dispatch, no write.
    assert!(!settings_path(client_dir.path(), ENVIRONMENT).exists());
}

#[tokio::test]
async fn shutdown_before_start_suppresses_the_write() {
    let client_dir = tempfile::tempdir().unwrap();
    let host = AppHostBuilder::new(ENVIRONMENT).unwrap();
    let api = api_project(&host);

    let client = host
        .add_standalone_client(metadata("webapp", client_dir.path()), "webapp")
        .unwrap();
    client.link_source(&api);

    host.shutdown();
    host.start().await.unwrap();

    assert!(!settings_path(client_dir.path(), ENVIRONMENT).exists());
}

#[tokio::test]
async fn two_links_write_disjoint_subtrees() {
    let client_dir = tempfile::tempdir().unwrap();
    let host = AppHostBuilder::new(ENVIRONMENT).unwrap();
    let api = api_project(&host);
    let auth = host
        .add_project(
            ProjectMetadata::new("auth", "/projects/auth").unwrap(),
            "auth",
        )
        .unwrap()
        .with_endpoint(EndpointAnnotation::https().with_port(7300));

    let client = host
        .add_standalone_client(metadata("webapp", client_dir.path()), "webapp")
        .unwrap();
    client.link_source(&api);
    client.link_source(&auth);

    host.start().await.unwrap();

    let settings = read_settings_json(&settings_path(client_dir.path(), ENVIRONMENT));
    assert_eq!(
        settings["Services"],
        json!({
            "api": {
                "http": ["http://localhost:5200"],
                "https": ["https://localhost:7200"]
            },
            "auth": {
                "https": ["https://localhost:7300"]
            }
        })
    );
}

#[tokio::test]
async fn merge_preserves_existing_unrelated_keys() {
    let client_dir = tempfile::tempdir().unwrap();
    let wwwroot = client_dir.path().join("wwwroot");
    std::fs::create_dir_all(&wwwroot).unwrap();
    std::fs::write(
        settings_path(client_dir.path(), ENVIRONMENT),
        r#"{ "Logging": { "LogLevel": { "Default": "Warning" } } }"#,
    )
    .unwrap();

    let host = AppHostBuilder::new(ENVIRONMENT).unwrap();
    let api = api_project(&host);
    let client = host
        .add_standalone_client(metadata("webapp", client_dir.path()), "webapp")
        .unwrap();
    client.link_source(&api);

    host.start().await.unwrap();

    let settings = read_settings_json(&settings_path(client_dir.path(), ENVIRONMENT));
    assert_eq!(
        settings["Logging"],
        json!({ "LogLevel": { "Default": "Warning" } })
    );
    assert_eq!(
        settings["Services"]["api"]["http"],
        json!(["http://localhost:5200"])
    );
}

#[tokio::test]
async fn custom_serializer_receives_one_snapshot_per_dispatch() {
    let client_dir = tempfile::tempdir().unwrap();
    let host = AppHostBuilder::new(ENVIRONMENT).unwrap();
    let api = api_project(&host);

    let recording = Arc::new(RecordingSerializer::new());
    let installed = Arc::clone(&recording);
    let client = host
        .add_standalone_client_with(
            metadata("webapp", client_dir.path()),
            "webapp",
            move |options, _metadata, environment| {
                assert_eq!(environment, ENVIRONMENT);
                options.serializer = Some(installed as Arc<dyn DiscoveryInfoSerializer>);
                Ok(())
            },
        )
        .unwrap();
    client.link_source(&api);

    host.start().await.unwrap();

    let calls = recording.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "api");
    let urls: Vec<_> = calls[0].1.iter().map(|e| e.url.clone()).collect();
    assert_eq!(urls, vec!["http://localhost:5200", "https://localhost:7200"]);

    // The JSON default was replaced, so nothing touched the settings file.
    assert!(!settings_path(client_dir.path(), ENVIRONMENT).exists());
}

#[tokio::test]
async fn write_failure_propagates_through_start() {
    let client_dir = tempfile::tempdir().unwrap();
    // A file where the store expects a directory makes the write path fail.
    std::fs::write(client_dir.path().join("wwwroot"), "not a directory").unwrap();

    let host = AppHostBuilder::new(ENVIRONMENT).unwrap();
    let api = api_project(&host);
    let client = host
        .add_standalone_client(metadata("webapp", client_dir.path()), "webapp")
        .unwrap();
    client.link_source(&api);

    let err = host.start().await.unwrap_err();
    assert!(matches!(err, HostingError::Discovery(_)));

    // The previous contents (here: the stray file) are left in place.
    let content = std::fs::read_to_string(client_dir.path().join("wwwroot")).unwrap();
    assert_eq!(content, "not a directory");
}
