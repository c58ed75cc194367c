//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the demo
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cascade::CascadeRule;
use crate::load::ScenarioConfig;

/// Root configuration for the demo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Service identity.
    pub service: ServiceConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Outbound HTTP client settings (cascades, probes, load).
    pub http_client: HttpClientConfig,

    /// Log level and format.
    pub logging: LoggingConfig,

    /// Metrics endpoint settings.
    pub metrics: MetricsConfig,

    /// Cascade simulator settings.
    pub cascade: CascadeConfig,

    /// Log backend settings.
    pub loki: LokiConfig,

    /// Trace-test settings.
    pub trace: TraceConfig,

    /// Load injector settings.
    pub load_test: LoadTestConfig,
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Name used in log labels and telemetry.
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "observability-demo".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Inbound timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Total timeout per outbound request in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (e.g. "info" or "observability_demo=debug").
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve `/metrics`.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Cascade simulator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Allow handlers to cascade at all.
    pub enabled: bool,

    /// Stop cascading once the inbound depth reaches this value.
    /// Unset by default: the cascade graph has no depth limit.
    pub max_depth: Option<u32>,

    /// Cascade table; one rule per source endpoint.
    pub rules: Vec<CascadeRule>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: None,
            rules: CascadeRule::defaults(),
        }
    }
}

/// Log backend (Loki) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LokiConfig {
    /// Base URL of the log backend.
    pub url: String,

    /// Number of log lines emitted per `/force-logs` call.
    pub burst_size: usize,

    /// Stream labels attached to pushed lines. `app` defaults to the service name.
    pub labels: BTreeMap<String, String>,
}

impl Default for LokiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3100".to_string(),
            burst_size: 5,
            labels: BTreeMap::new(),
        }
    }
}

/// Trace-test configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceConfig {
    /// External endpoint called inside the trace-test span.
    pub external_url: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            external_url: "https://httpbin.org/get".to_string(),
        }
    }
}

/// Load injector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadTestConfig {
    /// Run the injector once the service is ready.
    pub enabled: bool,

    /// Constant request rate.
    pub rate_per_second: u32,

    /// Run duration in seconds.
    pub duration_secs: u64,

    /// Directory for JSON report artifacts.
    pub report_dir: String,

    /// Endpoint menu; each tick picks one uniformly.
    pub scenarios: Vec<ScenarioConfig>,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_per_second: 10,
            duration_secs: 8,
            report_dir: "load-test-reports".to_string(),
            scenarios: ScenarioConfig::defaults(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: DemoConfig = toml::from_str("[listener]\nbind_address = \"127.0.0.1:9000\"\n").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.load_test.rate_per_second, 10);
        assert_eq!(config.load_test.duration_secs, 8);
        assert_eq!(config.cascade.rules.len(), 6);
        assert!(config.cascade.max_depth.is_none());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_cascade_rules_from_toml() {
        let config: DemoConfig = toml::from_str(
            r#"
            [cascade]
            max_depth = 3

            [[cascade.rules]]
            source = "root"
            range = 10
            trigger = 0
            target = "trace-test"
            "#,
        )
        .unwrap();
        assert_eq!(config.cascade.max_depth, Some(3));
        assert_eq!(config.cascade.rules.len(), 1);
        assert_eq!(config.cascade.rules[0].range, 10);
    }
}
