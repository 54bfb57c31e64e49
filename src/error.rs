use std::fmt::Write;
use std::net::AddrParseError;
use std::path::PathBuf;

use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Contract violations rejected before a probe starts.
///
/// Network-level failures never surface here; they are folded into the
/// returned `ConnectivityTestResult` instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Missing required parameter: host")]
    MissingHost,

    #[error("Missing required parameter: url")]
    MissingUrl,

    #[error("Missing required parameter: port")]
    MissingPort,

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,
}

/// Errors raised while loading the service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in config file")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid DNS host {host:?}")]
    InvalidDnsHost {
        host: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid listen address {0:?}")]
    InvalidListenAddr(String),

    #[error("invalid default timeout {0:?}, expected a positive number of seconds")]
    InvalidTimeout(String),

    #[error("failed to read system resolver configuration")]
    SystemConf(#[source] std::io::Error),

    #[error("failed to set up the DNS resolver")]
    Resolver(#[from] ResolveError),
}

/// Render an error together with its chain of causes.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n\nCaused by: {}", src);
        err = src;
    }
    s
}
