use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::request::{ElasticsearchRequest, HostPortRequest, MqttRequest, ReportRequest};
use crate::error::ProbeError;
use crate::result::Credentials;
use crate::tester::ConnectivityTester;

pub const TCP_PATH: &str = "/api/v1/connectivity/test/tcp";
pub const UDP_PATH: &str = "/api/v1/connectivity/test/udp";
pub const ELASTICSEARCH_PATH: &str = "/api/v1/connectivity/test/elasticsearch";
pub const MQTT_PATH: &str = "/api/v1/connectivity/test/mqtt";
pub const REPORT_PATH: &str = "/api/v1/connectivity/diagnostics/report";

/// Shared state handed to every request.
#[derive(Clone)]
pub struct ApiState {
    pub tester: Arc<ConnectivityTester>,
    pub default_timeout: Duration,
}

impl ApiState {
    pub fn new(tester: Arc<ConnectivityTester>, default_timeout: Duration) -> Self {
        Self {
            tester,
            default_timeout,
        }
    }

    fn timeout(&self, requested: Option<u64>) -> Duration {
        requested
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Probe(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Dispatch a request to its handler and render the response.
pub async fn route(
    state: &ApiState,
    method: &Method,
    path: &str,
    body: &[u8],
) -> Response<Full<Bytes>> {
    let outcome = match path {
        TCP_PATH | UDP_PATH | ELASTICSEARCH_PATH | MQTT_PATH if *method != Method::POST => {
            Err(ApiError::MethodNotAllowed)
        }
        TCP_PATH => tcp(state, body).await,
        UDP_PATH => udp(state, body).await,
        ELASTICSEARCH_PATH => elasticsearch(state, body).await,
        MQTT_PATH => mqtt(state, body).await,
        REPORT_PATH => report(state, method, body),
        _ => Err(ApiError::NotFound),
    };

    match outcome {
        Ok(response) => response,
        Err(err) => error_response(&err),
    }
}

async fn tcp(state: &ApiState, body: &[u8]) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: HostPortRequest = parse_body(body)?;
    let result = state
        .tester
        .test_tcp(&req.host, req.port, state.timeout(req.timeout))
        .await?;
    json_response(StatusCode::OK, &result)
}

async fn udp(state: &ApiState, body: &[u8]) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: HostPortRequest = parse_body(body)?;
    let result = state
        .tester
        .test_udp(&req.host, req.port, state.timeout(req.timeout))
        .await?;
    json_response(StatusCode::OK, &result)
}

async fn elasticsearch(state: &ApiState, body: &[u8]) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: ElasticsearchRequest = parse_body(body)?;
    let credentials = Credentials::new(req.username, req.password);
    let result = state
        .tester
        .test_elasticsearch(&req.url, &credentials, state.timeout(req.timeout))
        .await?;
    json_response(StatusCode::OK, &result)
}

async fn mqtt(state: &ApiState, body: &[u8]) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: MqttRequest = parse_body(body)?;
    let credentials = Credentials::new(req.username, req.password);
    let result = state
        .tester
        .test_mqtt(&req.host, req.port, &credentials, state.timeout(req.timeout))
        .await?;
    json_response(StatusCode::OK, &result)
}

fn report(
    state: &ApiState,
    method: &Method,
    body: &[u8],
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: ReportRequest = match *method {
        Method::GET => ReportRequest::default(),
        Method::POST => parse_body(body)?,
        _ => return Err(ApiError::MethodNotAllowed),
    };
    let report = state.tester.generate_diagnostic_report(&req.export_type);
    json_response(StatusCode::OK, &report)
}

// An empty body is read as `{}` so that missing fields surface as
// parameter errors rather than parse errors.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| ApiError::BadRequest(err.to_string()))
}

fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let body = serde_json::to_vec(value)?;
    Ok(build_response(status, body))
}

/// Response for a request whose body could not be read off the connection.
pub(crate) fn unreadable_body(err: &dyn std::error::Error) -> Response<Full<Bytes>> {
    error_response(&ApiError::BadRequest(format!(
        "failed to read request body: {err}"
    )))
}

fn error_response(err: &ApiError) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": err.to_string() }).to_string();
    build_response(err.status(), body.into_bytes())
}

fn build_response(status: StatusCode, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
