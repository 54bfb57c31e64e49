use std::net::SocketAddr;

use serde::Deserialize;

/// Service configuration for reachbox.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Probe timeout used when a request does not carry one.
    #[serde(default = "default_timeout_seconds")]
    pub default_timeout_seconds: u64,

    /// Name servers to resolve targets with.
    /// Empty means the system resolver configuration.
    #[serde(default)]
    pub dns_hosts: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            default_timeout_seconds: default_timeout_seconds(),
            dns_hosts: Vec::new(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 2502))
}

fn default_timeout_seconds() -> u64 {
    10
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:2502");
        assert_eq!(config.default_timeout_seconds, 10);
        assert!(config.dns_hosts.is_empty());
    }

    #[test]
    fn test_service_config_deserialization() {
        let yaml = r#"
                    listen_addr: 0.0.0.0:8080
                    default_timeout_seconds: 3
                    dns_hosts:
                        - 1.1.1.1
                        - 8.8.8.8
                    "#;

        let config: ServiceConfig = serde_yaml::from_str(yaml).expect("Invalid YAML");
        assert_eq!(config.listen_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.default_timeout_seconds, 3);
        assert_eq!(config.dns_hosts, vec!["1.1.1.1", "8.8.8.8"]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ServiceConfig =
            serde_yaml::from_str("default_timeout_seconds: 5").expect("Invalid YAML");
        assert_eq!(config.default_timeout_seconds, 5);
        assert_eq!(config.listen_addr, default_listen_addr());
        assert!(config.dns_hosts.is_empty());
    }
}
