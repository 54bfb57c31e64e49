pub mod http;
pub mod outcome;
pub mod resolver;
pub mod tcp;
pub mod udp;

pub mod prelude {
    pub use super::http::{HttpEndpoint, health_url, http_reachable, parse_endpoint};
    pub use super::outcome::{ProbeFailure, ProbeOutcome};
    pub use super::resolver::HostResolver;
    pub use super::tcp::tcp_connect;
    pub use super::udp::{UDP_MARKER, udp_send};
}
