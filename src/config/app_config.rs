use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::info;

use super::model::ServiceConfig;
use crate::error::ConfigError;

const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Load the service configuration from a YAML file and environment variables.
///
/// The file is taken from `CONFIG_FILE` (default `config.yml`). A missing
/// default file falls back to built-in defaults; a missing file that was
/// named explicitly is an error. `LISTEN_ADDR`, `DEFAULT_TIMEOUT_SECONDS` and
/// `DNS_HOSTS` override the file.
pub fn load_config() -> Result<ServiceConfig, ConfigError> {
    let explicit = env::var("CONFIG_FILE").ok();
    let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_FILE));
    load_config_from(&path, explicit.is_some(), |key| env::var(key).ok())
}

/// Load the configuration at `path` and apply overrides from `lookup`.
///
/// When `explicit` is false a missing file yields the defaults.
pub fn load_config_from(
    path: &Path,
    explicit: bool,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ServiceConfig, ConfigError> {
    let mut config = match std::fs::read_to_string(path) {
        Ok(config_str) => {
            info!("Using config file: {}", path.display());
            serde_yaml::from_str(&config_str)?
        }
        Err(source) if !explicit && source.kind() == std::io::ErrorKind::NotFound => {
            info!("No config file found, using defaults");
            ServiceConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    apply_overrides(&mut config, lookup)?;

    if config.default_timeout_seconds == 0 {
        return Err(ConfigError::InvalidTimeout("0".to_string()));
    }

    info!("Using DNS hosts: {:?}", config.dns_hosts);
    Ok(config)
}

/// Apply overrides looked up by variable name.
pub fn apply_overrides(
    config: &mut ServiceConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(addr) = lookup("LISTEN_ADDR") {
        config.listen_addr = addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidListenAddr(addr.clone()))?;
    }

    if let Some(timeout) = lookup("DEFAULT_TIMEOUT_SECONDS") {
        config.default_timeout_seconds = timeout
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| ConfigError::InvalidTimeout(timeout.clone()))?;
    }

    if let Some(dns_hosts) = lookup("DNS_HOSTS") {
        config.dns_hosts = dns_hosts
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(())
}
