//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Formsmith metrics
pub const METRICS_PREFIX: &str = "formsmith";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000,
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Submission metrics
    describe_counter!(
        format!("{}_submissions_received_total", METRICS_PREFIX),
        Unit::Count,
        "Total submissions accepted and stored"
    );

    describe_counter!(
        format!("{}_submissions_rejected_total", METRICS_PREFIX),
        Unit::Count,
        "Total submissions rejected by intake screening"
    );

    // Insight metrics
    describe_counter!(
        format!("{}_insights_computed_total", METRICS_PREFIX),
        Unit::Count,
        "Total per-field insight computations"
    );

    describe_histogram!(
        format!("{}_insights_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Insight aggregation latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record the outcome of one intake attempt. The rejection reason is a
/// coarse label ("honeypot", "timing"); it is visible to operators
/// only, never to the submitter.
pub fn record_submission(accepted: bool, reason: &str) {
    if accepted {
        counter!(format!("{}_submissions_received_total", METRICS_PREFIX)).increment(1);
    } else {
        counter!(
            format!("{}_submissions_rejected_total", METRICS_PREFIX),
            "reason" => reason.to_string()
        )
        .increment(1);
    }
}

/// Record one insights computation over a form
pub fn record_insights(duration_secs: f64, field_count: usize) {
    counter!(format!("{}_insights_computed_total", METRICS_PREFIX))
        .increment(field_count as u64);

    histogram!(format!("{}_insights_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/v1/projects");
        std::thread::sleep(std::time::Duration::from_millis(5));
        metrics.finish(200);
        // Just verify it runs without panic
    }
}
