//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the demo metrics (requests, latency, operations, cascades)
//! - Own a Prometheus recorder per service instance
//! - Render the scrape payload for `/metrics`
//!
//! # Metrics
//! - `demo_http_requests_total` (counter): requests by method, path, status
//! - `demo_http_request_duration_seconds` (histogram): latency distribution
//! - `demo_operations_total` (counter): handler invocations by operation
//! - `demo_cascade_calls_total` (counter): cascade hops by source, target, outcome
//! - `demo_loki_checks_total` / `demo_loki_push_total` (counter): log backend calls
//! - `demo_trace_tests_total` (counter): external calls made by `/trace-test`
//!
//! # Design Decisions
//! - No global recorder: every `Telemetry` owns its recorder, so two
//!   services in one process (tests) never share counters
//! - Macros run under `metrics::with_local_recorder`
//! - Histogram buckets tuned for typical web latencies

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::time::Instant;

use crate::routing::EndpointId;

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Telemetry context handed to every handler.
pub struct Telemetry {
    service_name: String,
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl Telemetry {
    /// Build a telemetry context with its own Prometheus recorder.
    pub fn new(service_name: impl Into<String>) -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets(LATENCY_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        let telemetry = Self {
            service_name: service_name.into(),
            recorder,
            handle,
        };
        telemetry.describe();
        Ok(telemetry)
    }

    fn describe(&self) {
        self.with(|| {
            metrics::describe_counter!("demo_http_requests_total", "Total HTTP requests served");
            metrics::describe_histogram!(
                "demo_http_request_duration_seconds",
                metrics::Unit::Seconds,
                "HTTP request latency"
            );
            metrics::describe_counter!("demo_operations_total", "Handler invocations by operation");
            metrics::describe_counter!("demo_cascade_calls_total", "Cascade calls between endpoints");
            metrics::describe_counter!("demo_loki_checks_total", "Log backend readiness probes");
            metrics::describe_counter!("demo_loki_push_total", "Direct pushes to the log backend");
            metrics::describe_counter!("demo_trace_tests_total", "External calls made by trace-test");
        });
    }

    fn with<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&self.recorder, f)
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Record a completed HTTP request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, start_time: Instant) {
        let duration = start_time.elapsed().as_secs_f64();
        self.with(|| {
            metrics::counter!(
                "demo_http_requests_total",
                "method" => method.to_string(),
                "path" => path.to_string(),
                "status" => status.to_string()
            )
            .increment(1);
            metrics::histogram!(
                "demo_http_request_duration_seconds",
                "method" => method.to_string(),
                "path" => path.to_string()
            )
            .record(duration);
        });
    }

    /// Record one handler invocation.
    pub fn record_operation(&self, endpoint: EndpointId) {
        self.with(|| {
            metrics::counter!("demo_operations_total", "operation" => endpoint.name()).increment(1);
        });
    }

    /// Record the outcome of a cascade hop.
    pub fn record_cascade(&self, source: EndpointId, target: EndpointId, outcome: &'static str) {
        self.with(|| {
            metrics::counter!(
                "demo_cascade_calls_total",
                "source" => source.name(),
                "target" => target.name(),
                "outcome" => outcome
            )
            .increment(1);
        });
    }

    pub fn record_loki_check(&self, outcome: &'static str) {
        self.with(|| {
            metrics::counter!("demo_loki_checks_total", "outcome" => outcome).increment(1);
        });
    }

    pub fn record_loki_push(&self, outcome: &'static str) {
        self.with(|| {
            metrics::counter!("demo_loki_push_total", "outcome" => outcome).increment(1);
        });
    }

    pub fn record_trace_test(&self, outcome: &'static str) {
        self.with(|| {
            metrics::counter!("demo_trace_tests_total", "outcome" => outcome).increment(1);
        });
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("service_name", &self.service_name)
            .finish_non_exhaustive()
    }
}
