use std::io;
use std::time::Duration;

use thiserror::Error;

/// Why a probe did not succeed.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("could not resolve host {host}: {reason}")]
    Resolution { host: String, reason: String },

    #[error("socket setup failed: {0}")]
    SocketSetup(#[source] io::Error),

    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("connection failed: {0}")]
    Connect(#[source] io::Error),

    #[error("datagram send failed: {0}")]
    Send(#[source] io::Error),

    #[error("could not parse url {url:?}: {reason}")]
    UrlParse { url: String, reason: String },
}

/// Raw result of a single network attempt, before classification.
#[derive(Debug)]
pub struct ProbeOutcome {
    /// Wall-clock time of the attempt. Zero when the probe failed before the
    /// timed portion started.
    pub elapsed_ms: u64,
    pub failure: Option<ProbeFailure>,
}

impl ProbeOutcome {
    pub fn success(elapsed_ms: u64) -> Self {
        Self {
            elapsed_ms,
            failure: None,
        }
    }

    pub fn failed(elapsed_ms: u64, failure: ProbeFailure) -> Self {
        Self {
            elapsed_ms,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

pub(crate) fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
