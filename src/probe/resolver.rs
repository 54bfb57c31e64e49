use std::net::IpAddr;
use std::time::Duration;

use tracing::debug;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
    system_conf::read_system_conf,
};

use super::outcome::ProbeFailure;
use crate::error::ConfigError;

/// Resolves host names to a single IP address.
///
/// Every call performs a fresh lookup: the underlying resolver is built with
/// its record cache disabled so that each probe observes current DNS state.
#[derive(Clone)]
pub struct HostResolver {
    inner: TokioAsyncResolver,
}

impl HostResolver {
    /// Build a resolver from the host's system configuration (`/etc/resolv.conf`
    /// on unix).
    pub fn from_system_conf() -> Result<Self, ConfigError> {
        let (config, mut opts) = read_system_conf().map_err(ConfigError::SystemConf)?;
        opts.cache_size = 0;
        Ok(Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        })
    }

    /// Build a resolver that queries the given name servers over TCP.
    ///
    /// # Arguments
    /// * `dns_hosts` - IP literals of the name servers (e.g. "1.1.1.1")
    pub fn with_name_servers(dns_hosts: &[String]) -> Result<Self, ConfigError> {
        let mut opts = ResolverOpts::default();
        opts.attempts = 2;
        opts.timeout = Duration::from_secs(2);
        opts.cache_size = 0;

        let mut name_servers = NameServerConfigGroup::new();

        for host in dns_hosts {
            let ip: IpAddr = host.parse().map_err(|source| ConfigError::InvalidDnsHost {
                host: host.clone(),
                source,
            })?;
            name_servers.push(NameServerConfig {
                socket_addr: (ip, 53).into(),
                protocol: Protocol::Tcp,
                tls_dns_name: None,
                trust_negative_responses: false,
                bind_addr: None,
            });
        }

        let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
        Ok(Self {
            inner: TokioAsyncResolver::tokio(resolver_config, opts),
        })
    }

    /// Use the configured name servers, or the system configuration when none
    /// are given.
    pub fn from_dns_hosts(dns_hosts: &[String]) -> Result<Self, ConfigError> {
        if dns_hosts.is_empty() {
            Self::from_system_conf()
        } else {
            Self::with_name_servers(dns_hosts)
        }
    }

    /// Resolve `host` to the first address the lookup returns, IPv4 or IPv6.
    pub async fn resolve(&self, host: &str) -> Result<IpAddr, ProbeFailure> {
        let host = host
            .strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }

        if is_reserved_invalid(host) {
            return Err(ProbeFailure::Resolution {
                host: host.to_string(),
                reason: "name is in the reserved .invalid domain".to_string(),
            });
        }

        let lookup = self
            .inner
            .lookup_ip(host)
            .await
            .map_err(|err| ProbeFailure::Resolution {
                host: host.to_string(),
                reason: err.to_string(),
            })?;

        let ip = lookup.iter().next().ok_or_else(|| ProbeFailure::Resolution {
            host: host.to_string(),
            reason: "no addresses returned".to_string(),
        })?;

        debug!("resolved {} to {}", host, ip);
        Ok(ip)
    }
}

// RFC 6761: names under .invalid never resolve. `localhost` goes through the
// hosts file like any other name.
fn is_reserved_invalid(host: &str) -> bool {
    let name = host.trim_end_matches('.').to_ascii_lowercase();
    name == "invalid" || name.ends_with(".invalid")
}

#[cfg(test)]
pub(crate) fn test_resolver() -> HostResolver {
    HostResolver::with_name_servers(&["127.0.0.1".to_string()]).expect("valid name server")
}
