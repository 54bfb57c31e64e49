use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Instant;

use tokio::net::UdpSocket;
use tracing::debug;

use super::outcome::{ProbeFailure, ProbeOutcome, elapsed_ms};
use super::resolver::HostResolver;

/// Payload sent by the UDP probe.
pub const UDP_MARKER: &[u8] = b"REACHBOX_CONNECTIVITY_TEST";

/// Send a single marker datagram to `host:port`.
///
/// Success only means the local stack accepted the datagram. No reply is
/// awaited, so a closed or filtered remote port is indistinguishable from an
/// open one.
pub async fn udp_send(resolver: &HostResolver, host: &str, port: u16) -> ProbeOutcome {
    let start = Instant::now();

    let ip = match resolver.resolve(host).await {
        Ok(ip) => ip,
        Err(failure) => {
            debug!("UDP probe to {}:{} failed to resolve: {}", host, port, failure);
            return ProbeOutcome::failed(0, failure);
        }
    };
    let target = SocketAddr::new(ip, port);

    let bind_addr = match ip {
        IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };
    let socket = match UdpSocket::bind(bind_addr).await {
        Ok(socket) => socket,
        Err(io_error) => {
            debug!("UDP probe could not bind {}: {}", bind_addr, io_error);
            return ProbeOutcome::failed(0, ProbeFailure::SocketSetup(io_error));
        }
    };

    let sent = socket.send_to(UDP_MARKER, target).await;
    let elapsed = elapsed_ms(start.elapsed());

    match sent {
        Ok(0) => ProbeOutcome::failed(
            elapsed,
            ProbeFailure::Send(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "no bytes sent",
            )),
        ),
        Ok(bytes) => {
            debug!("UDP probe sent {} bytes to {} in {}ms", bytes, target, elapsed);
            ProbeOutcome::success(elapsed)
        }
        Err(io_error) => {
            debug!("UDP probe to {} failed: {}", target, io_error);
            ProbeOutcome::failed(elapsed, ProbeFailure::Send(io_error))
        }
    }
}
