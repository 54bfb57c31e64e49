//! HTTP reachability heuristic.
//!
//! No request is sent. The URL is reduced to a host and port and a TCP
//! handshake stands in for HTTP reachability.

use std::time::Duration;

use url::{Host, Url};

use super::outcome::{ProbeFailure, ProbeOutcome};
use super::resolver::HostResolver;
use super::tcp::tcp_connect;

const HEALTH_PATH: &str = "_cluster/health";

/// Host and port an HTTP URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpoint {
    pub host: String,
    pub port: u16,
}

/// Extract host and port from `scheme://host[:port][/path]`.
///
/// The port defaults to 443 for `https` and 80 for every other scheme. Input
/// without a `scheme://` prefix is read as an `http` URL.
pub fn parse_endpoint(url: &str) -> Result<HttpEndpoint, ProbeFailure> {
    let candidate = if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    };

    let parsed = Url::parse(&candidate).map_err(|err| ProbeFailure::UrlParse {
        url: url.to_string(),
        reason: err.to_string(),
    })?;

    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => {
            return Err(ProbeFailure::UrlParse {
                url: url.to_string(),
                reason: "missing host".to_string(),
            });
        }
    };

    let default_port = if parsed.scheme() == "https" { 443 } else { 80 };
    let port = parsed.port().unwrap_or(default_port);

    Ok(HttpEndpoint { host, port })
}

/// Derive the Elasticsearch cluster health URL from a base URL.
pub fn health_url(base: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{HEALTH_PATH}")
    } else {
        format!("{base}/{HEALTH_PATH}")
    }
}

/// Check TCP reachability of the host and port named by `url`.
pub async fn http_reachable(resolver: &HostResolver, url: &str, limit: Duration) -> ProbeOutcome {
    match parse_endpoint(url) {
        Ok(endpoint) => tcp_connect(resolver, &endpoint.host, endpoint.port, limit).await,
        Err(failure) => ProbeOutcome::failed(0, failure),
    }
}
