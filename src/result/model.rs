use std::fmt;

use chrono::Utc;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// Verdict of a connectivity test, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Warning,
    Error,
    Timeout,
    Unknown,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Success => "success",
            TestStatus::Warning => "warning",
            TestStatus::Error => "error",
            TestStatus::Timeout => "timeout",
            TestStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered string map with unique keys.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Details {
    entries: Vec<(String, String)>,
}

impl Details {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Details {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Structured verdict of one connectivity test.
///
/// Built by the classification rules right after the network attempt and
/// handed out as a read-only snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityTestResult {
    status: TestStatus,
    response_time_ms: u64,
    target_host: String,
    target_port: u16,
    details: Details,
    errors: Vec<String>,
    suggestions: Vec<String>,
    timestamp: u64,
}

impl ConnectivityTestResult {
    pub(crate) fn new(
        status: TestStatus,
        target_host: &str,
        target_port: u16,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            response_time_ms,
            target_host: target_host.to_string(),
            target_port,
            details: Details::default(),
            errors: Vec::new(),
            suggestions: Vec::new(),
            timestamp: u64::try_from(Utc::now().timestamp()).unwrap_or_default(),
        }
    }

    pub(crate) fn set_status(&mut self, status: TestStatus) {
        self.status = status;
    }

    pub(crate) fn add_detail(&mut self, key: &str, value: impl Into<String>) {
        self.details.insert(key, value);
    }

    pub(crate) fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub(crate) fn add_suggestion(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    pub fn response_time_ms(&self) -> u64 {
        self.response_time_ms
    }

    /// Host or URL exactly as supplied by the caller.
    pub fn target_host(&self) -> &str {
        &self.target_host
    }

    /// Probed port; 0 when the test was URL based.
    pub fn target_port(&self) -> u16 {
        self.target_port
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Seconds since the Unix epoch at construction.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_severity_order() {
        assert!(TestStatus::Success < TestStatus::Warning);
        assert!(TestStatus::Warning < TestStatus::Error);
        assert!(TestStatus::Error < TestStatus::Timeout);
        assert!(TestStatus::Timeout < TestStatus::Unknown);
    }

    #[test]
    fn test_details_overwrite_keeps_position() {
        let mut details = Details::default();
        details.insert("connection_type", "tcp");
        details.insert("latency_quality", "good");
        details.insert("connection_type", "udp");

        assert_eq!(details.len(), 2);
        assert_eq!(details.get("connection_type"), Some("udp"));
        assert_eq!(
            details.keys().collect::<Vec<_>>(),
            vec!["connection_type", "latency_quality"]
        );
    }

    #[test]
    fn test_result_serializes_in_insertion_order() {
        let mut result = ConnectivityTestResult::new(TestStatus::Warning, "http://es:9200", 0, 42);
        result.add_detail("zeta", "1");
        result.add_detail("alpha", "2");
        result.add_error("boom");
        result.add_suggestion("try again");

        let json = serde_json::to_string(&result).expect("serialize");
        assert!(json.contains(r#""status":"warning""#));
        assert!(json.contains(r#""details":{"zeta":"1","alpha":"2"}"#));
        assert!(json.contains(r#""errors":["boom"]"#));
        assert!(json.contains(r#""target_port":0"#));
        assert!(result.timestamp() > 0);
    }
}
