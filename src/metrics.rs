/// Request metrics for upstream endpoints
///
/// Tracks success rates, error counts and response times for each upstream
/// endpoint the client talks to (title search, title detail, chapter feed,
/// page resolution, relay).
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct EndpointMetrics {
    pub endpoint: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_response_time_ms: f64,
    pub total_response_time_ms: u64,
    pub rate_limit_hits: u64,
    pub timeout_count: u64,
}

impl EndpointMetrics {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            last_success: None,
            last_failure: None,
            last_error: None,
            average_response_time_ms: 0.0,
            total_response_time_ms: 0,
            rate_limit_hits: 0,
            timeout_count: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.successful_requests as f64 / self.total_requests as f64) * 100.0
        }
    }

    pub fn record_success(&mut self, response_time: Duration) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.last_success = Some(Utc::now());

        let response_ms = response_time.as_millis() as u64;
        self.total_response_time_ms += response_ms;
        self.average_response_time_ms =
            self.total_response_time_ms as f64 / self.successful_requests as f64;
    }

    pub fn record_failure(&mut self, error: String) {
        self.total_requests += 1;
        self.failed_requests += 1;
        self.last_failure = Some(Utc::now());

        if error.contains("429") || error.to_lowercase().contains("rate limit") {
            self.rate_limit_hits += 1;
        } else if error.to_lowercase().contains("timeout") {
            self.timeout_count += 1;
        }
        self.last_error = Some(error);
    }
}

/// Shared tracker, cheap to clone; every clone observes the same counters.
#[derive(Clone)]
pub struct MetricsTracker {
    metrics: Arc<Mutex<HashMap<String, EndpointMetrics>>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn record_success(&self, endpoint: &str, response_time: Duration) {
        let mut metrics = self.metrics.lock().unwrap();
        let entry = metrics
            .entry(endpoint.to_string())
            .or_insert_with(|| EndpointMetrics::new(endpoint.to_string()));
        entry.record_success(response_time);

        log::debug!(
            "[{}] success in {}ms, success rate {:.2}%",
            endpoint,
            response_time.as_millis(),
            entry.success_rate()
        );
    }

    pub fn record_failure(&self, endpoint: &str, error: String) {
        let mut metrics = self.metrics.lock().unwrap();
        let entry = metrics
            .entry(endpoint.to_string())
            .or_insert_with(|| EndpointMetrics::new(endpoint.to_string()));
        entry.record_failure(error.clone());

        log::warn!(
            "[{}] failure: {} (success rate {:.2}%)",
            endpoint,
            error,
            entry.success_rate()
        );
    }

    pub fn get_metrics(&self, endpoint: &str) -> Option<EndpointMetrics> {
        let metrics = self.metrics.lock().unwrap();
        metrics.get(endpoint).cloned()
    }

    pub fn get_all_metrics(&self) -> Vec<EndpointMetrics> {
        let metrics = self.metrics.lock().unwrap();
        let mut all: Vec<_> = metrics.values().cloned().collect();
        all.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        all
    }

    pub fn export_json(&self) -> String {
        let metrics = self.metrics.lock().unwrap();
        serde_json::to_string_pretty(&*metrics).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Time an operation and record its outcome under `endpoint`.
pub async fn track_request<F, T, E>(
    tracker: &MetricsTracker,
    endpoint: &str,
    operation: F,
) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let result = operation.await;
    let duration = start.elapsed();

    match &result {
        Ok(_) => tracker.record_success(endpoint, duration),
        Err(e) => tracker.record_failure(endpoint, e.to_string()),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_creation() {
        let metrics = EndpointMetrics::new("title_search".to_string());
        assert_eq!(metrics.endpoint, "title_search");
        assert_eq!(metrics.total_requests, 0);
        assert_eq!(metrics.success_rate(), 0.0);
    }

    #[test]
    fn record_success() {
        let mut metrics = EndpointMetrics::new("title_search".to_string());
        metrics.record_success(Duration::from_millis(100));

        assert_eq!(metrics.total_requests, 1);
        assert_eq!(metrics.successful_requests, 1);
        assert_eq!(metrics.success_rate(), 100.0);
        assert!(metrics.last_success.is_some());
    }

    #[test]
    fn record_failure_classifies_errors() {
        let mut metrics = EndpointMetrics::new("relay".to_string());
        metrics.record_failure("upstream returned 429 Too Many Requests".to_string());
        metrics.record_failure("operation timeout".to_string());

        assert_eq!(metrics.failed_requests, 2);
        assert_eq!(metrics.rate_limit_hits, 1);
        assert_eq!(metrics.timeout_count, 1);
        assert_eq!(metrics.success_rate(), 0.0);
    }

    #[test]
    fn tracker_shares_counters_across_clones() {
        let tracker = MetricsTracker::new();
        let clone = tracker.clone();

        tracker.record_success("title_search", Duration::from_millis(100));
        clone.record_failure("title_detail", "boom".to_string());

        assert_eq!(
            tracker.get_metrics("title_search").unwrap().success_rate(),
            100.0
        );
        assert_eq!(
            tracker.get_metrics("title_detail").unwrap().success_rate(),
            0.0
        );
        assert_eq!(tracker.get_all_metrics().len(), 2);
    }

    #[tokio::test]
    async fn track_request_records_both_outcomes() {
        let tracker = MetricsTracker::new();

        let ok: Result<u32, String> = track_request(&tracker, "title_search", async { Ok(1) }).await;
        assert_eq!(ok.unwrap(), 1);

        let err: Result<u32, String> =
            track_request(&tracker, "title_search", async { Err("nope".to_string()) }).await;
        assert!(err.is_err());

        let m = tracker.get_metrics("title_search").unwrap();
        assert_eq!(m.total_requests, 2);
        assert_eq!(m.successful_requests, 1);
        assert_eq!(m.failed_requests, 1);
    }
}
