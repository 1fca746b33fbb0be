//! Consumer-side endpoint lookup
//!
//! Resolves propagated URLs back out of a settings document using the
//! `services:<resource>:<endpoint>` configuration-path convention. This is
//! the reading half of the contract whose writing half is
//! [`JsonDiscoverySerializer`](crate::serializer::JsonDiscoverySerializer).

use serde_json::Value;

use beacon_settings::SettingsDocument;

use crate::error::DiscoveryError;

/// Protocols merged by the multi-endpoint lookups
const PROTOCOLS: [&str; 2] = ["http", "https"];

/// Resolve the single URL of one named endpoint
///
/// # Errors
/// - [`DiscoveryError::NoMatchingEndpoint`] when nothing matches
/// - [`DiscoveryError::AmbiguousEndpoint`] when more than one URL matches
pub fn service_endpoint(
    doc: &SettingsDocument,
    resource: &str,
    endpoint: &str,
) -> Result<String, DiscoveryError> {
    let mut urls = endpoint_urls(doc, resource, endpoint);
    match urls.len() {
        1 => Ok(urls.remove(0)),
        0 => Err(DiscoveryError::NoMatchingEndpoint {
            resource: resource.to_string(),
            endpoint: endpoint.to_string(),
        }),
        _ => Err(DiscoveryError::AmbiguousEndpoint {
            resource: resource.to_string(),
            endpoint: endpoint.to_string(),
        }),
    }
}

/// All URLs of one resource across the `http` and `https` protocols
///
/// Blank values are skipped. Returns an empty vector when nothing matches.
#[must_use]
pub fn service_endpoints(doc: &SettingsDocument, resource: &str) -> Vec<String> {
    PROTOCOLS
        .iter()
        .flat_map(|protocol| endpoint_urls(doc, resource, protocol))
        .filter(|url| !url.trim().is_empty())
        .collect()
}

/// Union of endpoint URLs across several resources, deduplicated
/// case-insensitively
///
/// Returns an empty vector when nothing matches.
#[must_use]
pub fn service_endpoints_any(doc: &SettingsDocument, resources: &[&str]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut urls = Vec::new();
    for resource in resources {
        for url in service_endpoints(doc, resource) {
            let folded = url.to_ascii_lowercase();
            if !seen.contains(&folded) {
                seen.push(folded);
                urls.push(url);
            }
        }
    }
    urls
}

/// The string children of `services:<resource>:<endpoint>`
fn endpoint_urls(doc: &SettingsDocument, resource: &str, endpoint: &str) -> Vec<String> {
    match doc.resolve_path(&["services", resource, endpoint]) {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect(),
        // A bare string is tolerated the way a configuration reader would
        // treat a single-valued section.
        Some(Value::String(url)) => vec![url.clone()],
        _ => Vec::new(),
    }
}
