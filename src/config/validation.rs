//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, rate > 0, addresses parse)
//! - Check the cascade table and load scenarios are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DemoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::DemoConfig;
use crate::load::{MAX_DURATION_SECS, MAX_RATE_PER_SECOND};

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::new("service.name", "must not be empty"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.http_client.timeout_secs == 0 {
        errors.push(ValidationError::new("http_client.timeout_secs", "must be greater than 0"));
    }
    if config.http_client.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "http_client.connect_timeout_secs",
            "must be greater than 0",
        ));
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.level) {
        errors.push(ValidationError::new("logging.level", e.to_string()));
    }

    check_http_url(&mut errors, "loki.url", &config.loki.url);
    check_http_url(&mut errors, "trace.external_url", &config.trace.external_url);
    if config.loki.burst_size == 0 {
        errors.push(ValidationError::new("loki.burst_size", "must be greater than 0"));
    }

    let mut sources = HashSet::new();
    for (i, rule) in config.cascade.rules.iter().enumerate() {
        if let Err(e) = rule.validate() {
            errors.push(ValidationError::new(format!("cascade.rules[{}]", i), e.to_string()));
        }
        if !sources.insert(rule.source) {
            errors.push(ValidationError::new(
                format!("cascade.rules[{}]", i),
                format!("duplicate rule for source '{}'", rule.source),
            ));
        }
    }

    let load = &config.load_test;
    if load.rate_per_second == 0 {
        errors.push(ValidationError::new("load_test.rate_per_second", "must be greater than 0"));
    } else if load.rate_per_second > MAX_RATE_PER_SECOND {
        errors.push(ValidationError::new(
            "load_test.rate_per_second",
            format!("must be at most {}", MAX_RATE_PER_SECOND),
        ));
    }
    if load.duration_secs == 0 {
        errors.push(ValidationError::new("load_test.duration_secs", "must be greater than 0"));
    } else if load.duration_secs > MAX_DURATION_SECS {
        errors.push(ValidationError::new(
            "load_test.duration_secs",
            format!("must be at most {}", MAX_DURATION_SECS),
        ));
    }
    if load.report_dir.trim().is_empty() {
        errors.push(ValidationError::new("load_test.report_dir", "must not be empty"));
    }
    if load.scenarios.is_empty() {
        errors.push(ValidationError::new("load_test.scenarios", "at least one scenario is required"));
    }
    let mut names = HashSet::new();
    for (i, scenario) in load.scenarios.iter().enumerate() {
        if !scenario.path.starts_with('/') {
            errors.push(ValidationError::new(
                format!("load_test.scenarios[{}].path", i),
                "must start with '/'",
            ));
        }
        if !names.insert(scenario.name.as_str()) {
            errors.push(ValidationError::new(
                format!("load_test.scenarios[{}].name", i),
                format!("duplicate scenario '{}'", scenario.name),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, e.to_string())),
    }
}
