use chrono::Utc;
use serde::Serialize;

const FULL_SYSTEM: &str = "full_system";

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub version: &'static str,
    pub platform: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkDiagnostics {
    pub dns_resolution: &'static str,
    pub ipv4_connectivity: &'static str,
    pub ipv6_connectivity: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TcpDiagnostics {
    pub socket_support: &'static str,
    pub common_ports: Vec<u16>,
    pub timeout_default: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UdpDiagnostics {
    pub socket_support: &'static str,
    pub common_ports: Vec<u16>,
    pub limitations: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElasticsearchDiagnostics {
    pub http_client: &'static str,
    pub ssl_support: &'static str,
    pub common_ports: Vec<u16>,
    pub health_endpoint: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MqttDiagnostics {
    pub tcp_support: &'static str,
    pub ssl_support: &'static str,
    pub common_ports: Vec<u16>,
    pub protocol_version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TroubleshootingGuide {
    pub connection_refused: Vec<&'static str>,
    pub timeout_errors: Vec<&'static str>,
    pub authentication_failed: Vec<&'static str>,
    pub ssl_errors: Vec<&'static str>,
}

/// Capability and troubleshooting summary for one protocol or the whole
/// system. Protocol sections are present when `report_type` is
/// `full_system` or names that protocol.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub timestamp: i64,
    pub report_type: String,
    pub system_info: SystemInfo,
    pub network_diagnostics: NetworkDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_diagnostics: Option<TcpDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp_diagnostics: Option<UdpDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elasticsearch_diagnostics: Option<ElasticsearchDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mqtt_diagnostics: Option<MqttDiagnostics>,
    pub troubleshooting_guide: TroubleshootingGuide,
}

impl DiagnosticReport {
    /// Build the report for `export_type`; an empty string selects every
    /// section. Unknown types get the common sections only.
    pub fn generate(export_type: &str) -> Self {
        let export_type = export_type.trim();
        let wants = |kind: &str| export_type.is_empty() || export_type == kind;

        DiagnosticReport {
            timestamp: Utc::now().timestamp(),
            report_type: if export_type.is_empty() {
                FULL_SYSTEM.to_string()
            } else {
                export_type.to_string()
            },
            system_info: SystemInfo {
                version: env!("CARGO_PKG_VERSION"),
                platform: std::env::consts::OS,
            },
            network_diagnostics: NetworkDiagnostics {
                dns_resolution: "available",
                ipv4_connectivity: "available",
                ipv6_connectivity: "unknown",
            },
            tcp_diagnostics: wants("tcp").then(|| TcpDiagnostics {
                socket_support: "available",
                common_ports: vec![80, 443, 8080, 8443, 9200],
                timeout_default: crate::tester::DEFAULT_TIMEOUT.as_secs(),
            }),
            udp_diagnostics: wants("udp").then(|| UdpDiagnostics {
                socket_support: "available",
                common_ports: vec![53, 123, 1883, 5683],
                limitations: "connectionless protocol - limited testing capability",
            }),
            elasticsearch_diagnostics: wants("elasticsearch").then(|| ElasticsearchDiagnostics {
                http_client: "tcp reachability only",
                ssl_support: "not verified",
                common_ports: vec![9200, 9243],
                health_endpoint: "/_cluster/health",
            }),
            mqtt_diagnostics: wants("mqtt").then(|| MqttDiagnostics {
                tcp_support: "available",
                ssl_support: "not verified",
                common_ports: vec![1883, 8883],
                protocol_version: "3.1.1",
            }),
            troubleshooting_guide: TroubleshootingGuide {
                connection_refused: vec![
                    "Check if target service is running",
                    "Verify port number is correct",
                    "Check firewall rules",
                    "Test with telnet or nc command",
                ],
                timeout_errors: vec![
                    "Check network connectivity",
                    "Verify DNS resolution",
                    "Test with ping command",
                    "Check for network congestion",
                ],
                authentication_failed: vec![
                    "Verify username and password",
                    "Check API key validity",
                    "Confirm authentication method",
                    "Test credentials manually",
                ],
                ssl_errors: vec![
                    "Check certificate validity",
                    "Verify SSL/TLS version support",
                    "Check certificate chain",
                    "Test with curl --insecure",
                ],
            },
        }
    }
}
