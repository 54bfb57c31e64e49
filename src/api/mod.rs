//! JSON-over-HTTP front end for the connectivity tester.

pub mod request;
pub mod routes;

use std::convert::Infallible;
use std::net::SocketAddr;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use routes::ApiState;

/// Accept connections on `addr` forever, one task per connection.
pub async fn serve(addr: SocketAddr, state: ApiState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle(state.clone(), req));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!("Connection error from {}: {}", peer, err);
            }
        });
    }
}

async fn handle(
    state: ApiState,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            warn!("Failed to read request body: {}", err);
            return Ok(routes::unreadable_body(&err));
        }
    };

    Ok(routes::route(&state, &parts.method, parts.uri.path(), &body).await)
}
