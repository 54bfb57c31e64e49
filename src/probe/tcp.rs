//! Bounded-timeout TCP connect probe

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::outcome::{ProbeFailure, ProbeOutcome, elapsed_ms};
use super::resolver::HostResolver;

/// Attempt a TCP handshake with `host:port`, giving up after `limit`.
///
/// The elapsed time covers resolution through the end of the connect wait.
/// A resolution failure reports zero elapsed time. The connection is closed
/// as soon as it is established.
pub async fn tcp_connect(
    resolver: &HostResolver,
    host: &str,
    port: u16,
    limit: Duration,
) -> ProbeOutcome {
    let start = Instant::now();

    let ip = match resolver.resolve(host).await {
        Ok(ip) => ip,
        Err(failure) => {
            debug!("TCP probe to {}:{} failed to resolve: {}", host, port, failure);
            return ProbeOutcome::failed(0, failure);
        }
    };
    let address = SocketAddr::new(ip, port);
    debug!("TCP probe connecting to {}", address);

    connect_within(limit, start, TcpStream::connect(address)).await
}

// Await `connect` for at most `limit`, timing from `start`.
async fn connect_within<F, S>(limit: Duration, start: Instant, connect: F) -> ProbeOutcome
where
    F: Future<Output = io::Result<S>>,
{
    let result = timeout(limit, connect).await;
    let elapsed = elapsed_ms(start.elapsed());

    match result {
        Ok(Ok(_stream)) => {
            debug!("TCP connect succeeded in {}ms", elapsed);
            ProbeOutcome::success(elapsed)
        }
        Ok(Err(io_error)) => {
            debug!("TCP connect failed: {}", io_error);
            ProbeOutcome::failed(elapsed, ProbeFailure::Connect(io_error))
        }
        Err(_elapsed) => {
            debug!("TCP connect timed out after {:?}", limit);
            ProbeOutcome::failed(elapsed, ProbeFailure::ConnectTimeout(limit))
        }
    }
}
