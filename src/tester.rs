//! Serialized entry points for every connectivity test.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ProbeError;
use crate::probe::prelude::*;
use crate::report::DiagnosticReport;
use crate::result::classify::{
    MQTT_DEFAULT_PORT, classify_elasticsearch, classify_mqtt, classify_tcp, classify_udp,
};
use crate::result::{ConnectivityTestResult, Credentials};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs connectivity tests one at a time.
///
/// Every test holds the same lock for its full duration, resolution and
/// chained sub-probes included. Waiting callers are served in FIFO order.
pub struct ConnectivityTester {
    resolver: HostResolver,
    gate: Mutex<()>,
}

impl ConnectivityTester {
    pub fn new(resolver: HostResolver) -> Self {
        Self {
            resolver,
            gate: Mutex::new(()),
        }
    }

    /// Run `work` inside the probe critical section.
    ///
    /// The lock is released when `work` completes or is dropped.
    pub async fn exclusive<F: Future>(&self, work: F) -> F::Output {
        let _guard = self.gate.lock().await;
        work.await
    }

    pub async fn test_tcp(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<ConnectivityTestResult, ProbeError> {
        require_host(host)?;
        require_port(port)?;
        require_timeout(timeout)?;

        let result = self
            .exclusive(async {
                let outcome = tcp_connect(&self.resolver, host, port, timeout).await;
                classify_tcp(host, port, &outcome)
            })
            .await;

        log_result("tcp", &result);
        Ok(result)
    }

    /// `timeout` is validated but unused: the send is not awaited on a reply.
    pub async fn test_udp(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<ConnectivityTestResult, ProbeError> {
        require_host(host)?;
        require_port(port)?;
        require_timeout(timeout)?;

        let result = self
            .exclusive(async {
                let outcome = udp_send(&self.resolver, host, port).await;
                classify_udp(host, port, &outcome)
            })
            .await;

        log_result("udp", &result);
        Ok(result)
    }

    pub async fn test_elasticsearch(
        &self,
        url: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<ConnectivityTestResult, ProbeError> {
        if url.trim().is_empty() {
            return Err(ProbeError::MissingUrl);
        }
        require_timeout(timeout)?;

        let result = self
            .exclusive(async {
                let base = http_reachable(&self.resolver, url, timeout).await;
                let health = if base.is_success() {
                    let health_url = health_url(url);
                    debug!("probing Elasticsearch health endpoint {}", health_url);
                    Some(http_reachable(&self.resolver, &health_url, timeout).await)
                } else {
                    None
                };
                classify_elasticsearch(url, &base, health.as_ref(), credentials)
            })
            .await;

        log_result("elasticsearch", &result);
        Ok(result)
    }

    /// `port` defaults to 1883 when `None`.
    pub async fn test_mqtt(
        &self,
        host: &str,
        port: Option<u16>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<ConnectivityTestResult, ProbeError> {
        require_host(host)?;
        let port = port.unwrap_or(MQTT_DEFAULT_PORT);
        require_port(port)?;
        require_timeout(timeout)?;

        let result = self
            .exclusive(async {
                let outcome = tcp_connect(&self.resolver, host, port, timeout).await;
                classify_mqtt(host, port, &outcome, credentials)
            })
            .await;

        log_result("mqtt", &result);
        Ok(result)
    }

    /// Static capability and troubleshooting metadata. Performs no network
    /// activity and does not take the probe lock.
    pub fn generate_diagnostic_report(&self, export_type: &str) -> DiagnosticReport {
        DiagnosticReport::generate(export_type)
    }
}

fn require_host(host: &str) -> Result<(), ProbeError> {
    if host.trim().is_empty() {
        Err(ProbeError::MissingHost)
    } else {
        Ok(())
    }
}

fn require_port(port: u16) -> Result<(), ProbeError> {
    if port == 0 {
        Err(ProbeError::MissingPort)
    } else {
        Ok(())
    }
}

fn require_timeout(timeout: Duration) -> Result<(), ProbeError> {
    if timeout.is_zero() {
        Err(ProbeError::ZeroTimeout)
    } else {
        Ok(())
    }
}

fn log_result(kind: &str, result: &ConnectivityTestResult) {
    info!(
        "[{kind}] {} -> {} port {} in {}ms",
        result.target_host(),
        result.status(),
        result.target_port(),
        result.response_time_ms()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::resolver::test_resolver;
    use crate::result::TestStatus;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;
    use tokio::net::TcpListener;

    fn tester() -> ConnectivityTester {
        ConnectivityTester::new(test_resolver())
    }

    #[tokio::test]
    async fn test_tcp_against_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        let result = tester()
            .test_tcp("127.0.0.1", port, Duration::from_secs(1))
            .await
            .expect("valid request");
        assert_eq!(result.status(), TestStatus::Success);
        assert_eq!(result.details().get("tcp_handshake"), Some("success"));
        assert_eq!(result.target_host(), "127.0.0.1");
        assert_eq!(result.target_port(), port);
    }

    #[tokio::test]
    async fn test_tcp_closed_port_on_localhost() {
        let start = Instant::now();
        let result = tester()
            .test_tcp("localhost", 1, Duration::from_secs(1))
            .await
            .expect("valid request");

        assert!(start.elapsed() < Duration::from_millis(1500));
        assert_eq!(result.status(), TestStatus::Error);
        assert!(result.response_time_ms() <= 1_100);
        assert_eq!(result.suggestions().len(), 3);
        assert!(result.suggestions().iter().any(|s| s.contains("port 1")));
        assert!(result.suggestions().iter().any(|s| s.contains("localhost")));
    }

    #[tokio::test]
    async fn test_contract_violations_rejected() {
        let tester = tester();
        let creds = Credentials::default();

        assert_eq!(
            tester.test_tcp("", 80, DEFAULT_TIMEOUT).await.unwrap_err(),
            ProbeError::MissingHost
        );
        assert_eq!(
            tester.test_udp("ntp.local", 0, DEFAULT_TIMEOUT).await.unwrap_err(),
            ProbeError::MissingPort
        );
        assert_eq!(
            tester
                .test_elasticsearch("  ", &creds, DEFAULT_TIMEOUT)
                .await
                .unwrap_err(),
            ProbeError::MissingUrl
        );
        assert_eq!(
            tester
                .test_mqtt("broker.local", None, &creds, Duration::ZERO)
                .await
                .unwrap_err(),
            ProbeError::ZeroTimeout
        );
    }

    #[tokio::test]
    async fn test_udp_to_loopback_succeeds() {
        let receiver = tokio::net::UdpSocket::bind("127.0.0.1:0").await.expect("bind");
        let port = receiver.local_addr().expect("local addr").port();

        let result = tester()
            .test_udp("127.0.0.1", port, DEFAULT_TIMEOUT)
            .await
            .expect("valid request");
        assert_eq!(result.status(), TestStatus::Success);
        assert_eq!(result.details().get("connection_type"), Some("udp"));
    }

    #[tokio::test]
    async fn test_udp_unresolvable_is_warning() {
        let result = tester()
            .test_udp("collector.invalid", 514, DEFAULT_TIMEOUT)
            .await
            .expect("valid request");
        assert_eq!(result.status(), TestStatus::Warning);
        assert!(!result.errors().is_empty());
    }

    #[tokio::test]
    async fn test_elasticsearch_reachable_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let url = format!("http://127.0.0.1:{port}");

        let result = tester()
            .test_elasticsearch(&url, &Credentials::default(), Duration::from_secs(1))
            .await
            .expect("valid request");
        assert_eq!(result.status(), TestStatus::Success);
        assert_eq!(result.target_host(), url);
        assert_eq!(result.target_port(), 0);
        assert_eq!(result.details().get("elasticsearch_health"), Some("success"));
    }

    #[tokio::test]
    async fn test_elasticsearch_unresolvable_host() {
        let result = tester()
            .test_elasticsearch(
                "http://example.invalid:9200",
                &Credentials::default(),
                DEFAULT_TIMEOUT,
            )
            .await
            .expect("valid request");
        assert_eq!(result.status(), TestStatus::Error);
        assert_eq!(result.response_time_ms(), 0);
        assert_eq!(result.suggestions().len(), 4);
    }

    #[tokio::test]
    async fn test_mqtt_defaults_to_standard_port() {
        let result = tester()
            .test_mqtt("broker.invalid", None, &Credentials::default(), DEFAULT_TIMEOUT)
            .await
            .expect("valid request");
        assert_eq!(result.target_port(), 1883);
        assert_eq!(result.status(), TestStatus::Error);
    }

    #[tokio::test]
    async fn test_mqtt_custom_port_with_credentials() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        let result = tester()
            .test_mqtt(
                "127.0.0.1",
                Some(port),
                &Credentials::new("sensor", "secret"),
                Duration::from_secs(1),
            )
            .await
            .expect("valid request");
        assert_eq!(result.status(), TestStatus::Success);
        assert_eq!(result.details().get("mqtt_port_type"), Some("custom"));
        assert_eq!(result.details().get("authentication"), Some("configured"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exclusive_never_interleaves() {
        let tester = Arc::new(tester());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let tester = Arc::clone(&tester);
            let in_flight = Arc::clone(&in_flight);
            let completed = Arc::clone(&completed);
            handles.push(tokio::spawn(async move {
                tester
                    .exclusive(async {
                        let running = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        assert_eq!(running, 1, "two probes ran at once");
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        completed.fetch_add(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }

        for handle in handles {
            handle.await.expect("task panicked");
        }
        assert_eq!(completed.load(Ordering::SeqCst), 8);
    }

    // Holds the gate for `hold`, returning once it has been acquired.
    async fn hold_gate(
        tester: &Arc<ConnectivityTester>,
        hold: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let (acquired_tx, acquired_rx) = tokio::sync::oneshot::channel();
        let tester = Arc::clone(tester);
        let handle = tokio::spawn(async move {
            tester
                .exclusive(async move {
                    let _ = acquired_tx.send(());
                    tokio::time::sleep(hold).await;
                })
                .await;
        });
        acquired_rx.await.expect("gate holder started");
        handle
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_every_operation_waits_for_the_gate() {
        let tester = Arc::new(tester());
        let hold = Duration::from_millis(400);
        let min_wait = Duration::from_millis(300);
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let creds = Credentials::default();
        let limit = Duration::from_secs(1);

        let holder = hold_gate(&tester, hold).await;
        let started = Instant::now();
        let result = tester.test_tcp("127.0.0.1", port, limit).await.expect("tcp");
        assert!(started.elapsed() >= min_wait, "tcp ran while gate was held");
        assert_eq!(result.status(), TestStatus::Success);
        holder.await.expect("holder panicked");

        let holder = hold_gate(&tester, hold).await;
        let started = Instant::now();
        tester.test_udp("127.0.0.1", 9, limit).await.expect("udp");
        assert!(started.elapsed() >= min_wait, "udp ran while gate was held");
        holder.await.expect("holder panicked");

        let holder = hold_gate(&tester, hold).await;
        let started = Instant::now();
        let url = format!("http://127.0.0.1:{port}");
        tester
            .test_elasticsearch(&url, &creds, limit)
            .await
            .expect("elasticsearch");
        assert!(
            started.elapsed() >= min_wait,
            "elasticsearch ran while gate was held"
        );
        holder.await.expect("holder panicked");

        let holder = hold_gate(&tester, hold).await;
        let started = Instant::now();
        tester
            .test_mqtt("127.0.0.1", Some(port), &creds, limit)
            .await
            .expect("mqtt");
        assert!(started.elapsed() >= min_wait, "mqtt ran while gate was held");
        holder.await.expect("holder panicked");
    }

    #[tokio::test]
    async fn test_lock_released_after_cancelled_probe() {
        let tester = tester();

        let cancelled = tokio::time::timeout(
            Duration::from_millis(10),
            tester.exclusive(tokio::time::sleep(Duration::from_secs(5))),
        )
        .await;
        assert!(cancelled.is_err());

        let value = tokio::time::timeout(Duration::from_secs(1), tester.exclusive(async { 7 }))
            .await
            .expect("lock should be free");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_report_passes_export_type_through() {
        let report = tester().generate_diagnostic_report("mqtt");
        assert_eq!(report.report_type, "mqtt");
    }
}
