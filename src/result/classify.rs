//! Rules that turn raw probe outcomes into a `ConnectivityTestResult`.

use crate::probe::prelude::ProbeOutcome;

use super::model::{ConnectivityTestResult, TestStatus};

pub const MQTT_DEFAULT_PORT: u16 = 1883;
pub const MQTT_TLS_PORT: u16 = 8883;

/// Username/password pair recorded by the Elasticsearch and MQTT tests.
///
/// Credentials are never sent anywhere; only their presence is reported.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.username.is_empty()
    }

    fn describe(&self) -> &'static str {
        if self.is_configured() { "configured" } else { "none" }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Latency bucket for plain TCP handshakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyQuality {
    Excellent,
    Good,
    Poor,
}

impl LatencyQuality {
    pub fn from_millis(ms: u64) -> Self {
        match ms {
            0..100 => LatencyQuality::Excellent,
            100..500 => LatencyQuality::Good,
            _ => LatencyQuality::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LatencyQuality::Excellent => "excellent",
            LatencyQuality::Good => "good",
            LatencyQuality::Poor => "poor",
        }
    }
}

/// Latency bucket for Elasticsearch endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Excellent,
    Good,
    Slow,
}

impl Performance {
    pub fn from_millis(ms: u64) -> Self {
        match ms {
            0..200 => Performance::Excellent,
            200..1000 => Performance::Good,
            _ => Performance::Slow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Performance::Excellent => "excellent",
            Performance::Good => "good",
            Performance::Slow => "slow",
        }
    }
}

/// Port classification for MQTT brokers.
pub fn mqtt_port_type(port: u16) -> &'static str {
    match port {
        MQTT_DEFAULT_PORT => "standard_unencrypted",
        MQTT_TLS_PORT => "standard_ssl",
        _ => "custom",
    }
}

fn record_failure(result: &mut ConnectivityTestResult, outcome: &ProbeOutcome) {
    if let Some(failure) = &outcome.failure {
        result.add_detail("failure_reason", failure.to_string());
    }
}

pub fn classify_tcp(host: &str, port: u16, outcome: &ProbeOutcome) -> ConnectivityTestResult {
    if outcome.is_success() {
        let mut result =
            ConnectivityTestResult::new(TestStatus::Success, host, port, outcome.elapsed_ms);
        result.add_detail("tcp_handshake", "success");
        result.add_detail("connection_type", "tcp");
        result.add_detail(
            "latency_quality",
            LatencyQuality::from_millis(outcome.elapsed_ms).as_str(),
        );
        result
    } else {
        let mut result =
            ConnectivityTestResult::new(TestStatus::Error, host, port, outcome.elapsed_ms);
        record_failure(&mut result, outcome);
        result.add_error("Failed to establish TCP connection");
        result.add_suggestion(format!(
            "Check if the target server is running and listening on port {port}"
        ));
        result.add_suggestion(format!(
            "Verify firewall rules allow connections to {host}:{port}"
        ));
        result.add_suggestion("Test basic network connectivity with ping");
        result
    }
}

/// UDP failures are only ever a warning: a connectionless send cannot tell a
/// dead peer from a filtered one.
pub fn classify_udp(host: &str, port: u16, outcome: &ProbeOutcome) -> ConnectivityTestResult {
    if outcome.is_success() {
        let mut result =
            ConnectivityTestResult::new(TestStatus::Success, host, port, outcome.elapsed_ms);
        result.add_detail("udp_reachability", "success");
        result.add_detail("connection_type", "udp");
        result.add_detail(
            "note",
            "UDP is connectionless - success indicates port appears reachable",
        );
        result
    } else {
        let mut result =
            ConnectivityTestResult::new(TestStatus::Warning, host, port, outcome.elapsed_ms);
        record_failure(&mut result, outcome);
        result.add_error("UDP port appears unreachable or filtered");
        result.add_suggestion("UDP is connectionless - this test has limitations");
        result.add_suggestion(format!(
            "Check if target service supports UDP on port {port}"
        ));
        result.add_suggestion("Verify firewall rules allow UDP traffic");
        result.add_suggestion("Some firewalls silently drop UDP packets");
        result
    }
}

/// `health` is the outcome of the `_cluster/health` probe, present only when
/// the base URL was reachable. Timing always comes from `base`.
pub fn classify_elasticsearch(
    url: &str,
    base: &ProbeOutcome,
    health: Option<&ProbeOutcome>,
    credentials: &Credentials,
) -> ConnectivityTestResult {
    if !base.is_success() {
        let mut result = ConnectivityTestResult::new(TestStatus::Error, url, 0, base.elapsed_ms);
        record_failure(&mut result, base);
        result.add_error("Failed to connect to Elasticsearch endpoint");
        result.add_suggestion("Verify the Elasticsearch URL is correct");
        result.add_suggestion("Check if Elasticsearch is running and accessible");
        result.add_suggestion("Verify network connectivity and firewall rules");
        result.add_suggestion("Check SSL/TLS configuration if using HTTPS");
        return result;
    }

    let mut result = ConnectivityTestResult::new(TestStatus::Success, url, 0, base.elapsed_ms);
    result.add_detail("http_connectivity", "success");
    result.add_detail("connection_type", "elasticsearch");
    result.add_detail("authentication", credentials.describe());

    match health {
        Some(health) if health.is_success() => {
            result.add_detail("elasticsearch_health", "success");
            result.add_detail("cluster_accessible", "true");
        }
        _ => {
            result.set_status(TestStatus::Warning);
            result.add_detail("elasticsearch_health", "failed");
            result.add_error("HTTP connection successful but Elasticsearch health endpoint failed");
            result.add_suggestion("Verify this is an Elasticsearch server");
            result.add_suggestion("Check Elasticsearch authentication requirements");
        }
    }

    let performance = Performance::from_millis(base.elapsed_ms);
    result.add_detail("performance", performance.as_str());
    if performance == Performance::Slow {
        result.add_suggestion("Consider network optimization for better performance");
    }

    result
}

pub fn classify_mqtt(
    host: &str,
    port: u16,
    outcome: &ProbeOutcome,
    credentials: &Credentials,
) -> ConnectivityTestResult {
    if outcome.is_success() {
        let mut result =
            ConnectivityTestResult::new(TestStatus::Success, host, port, outcome.elapsed_ms);
        result.add_detail("tcp_connectivity", "success");
        result.add_detail("connection_type", "mqtt");
        result.add_detail(
            "note",
            "TCP connection successful - MQTT protocol test requires full client",
        );
        result.add_detail("mqtt_port_type", mqtt_port_type(port));
        result.add_detail("authentication", credentials.describe());
        result
    } else {
        let mut result =
            ConnectivityTestResult::new(TestStatus::Error, host, port, outcome.elapsed_ms);
        record_failure(&mut result, outcome);
        result.add_error("Failed to establish TCP connection to MQTT broker");
        result.add_suggestion(format!(
            "Check if MQTT broker is running on {host}:{port}"
        ));
        result.add_suggestion("Verify firewall rules allow connections to MQTT broker");
        result.add_suggestion(format!(
            "Standard MQTT ports are {MQTT_DEFAULT_PORT} (unencrypted) and {MQTT_TLS_PORT} (SSL)"
        ));
        result
    }
}
