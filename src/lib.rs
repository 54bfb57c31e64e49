//! Network reachability diagnostics.
//!
//! Probes a host/port or URL over TCP, UDP, or a TCP-backed heuristic for
//! HTTP, Elasticsearch and MQTT, and classifies the outcome into a
//! [`result::ConnectivityTestResult`]. All probes run one at a time through
//! [`tester::ConnectivityTester`].

pub mod api;
pub mod config;
pub mod error;
pub mod probe;
pub mod report;
pub mod result;
pub mod tester;

pub use error::{ConfigError, ProbeError};
pub use result::{ConnectivityTestResult, Credentials, Details, TestStatus};
pub use tester::{ConnectivityTester, DEFAULT_TIMEOUT};
