//! Loki HTTP client.
//!
//! # Responsibilities
//! - Probe `/ready` on the log backend
//! - Push labeled log streams to `/loki/api/v1/push`
//!
//! # Design Decisions
//! - A non-2xx probe answer is a status, not an error
//! - One stream per level; the configured labels are shared by all streams

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::LokiConfig;

/// Push API path on the log backend.
pub const PUSH_PATH: &str = "/loki/api/v1/push";

/// Readiness probe path on the log backend.
pub const READY_PATH: &str = "/ready";

/// Errors talking to the log backend.
#[derive(Debug, thiserror::Error)]
pub enum LokiError {
    #[error("request to log backend failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("log backend rejected push with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Answer to a readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady { status: u16 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }

    /// Human-readable status for JSON responses.
    pub fn describe(&self) -> String {
        match self {
            Readiness::Ready => "Loki is ready".to_string(),
            Readiness::NotReady { status } => format!("Loki is not ready (status {})", status),
        }
    }
}

/// One line to push.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: &'static str,
    pub message: String,
    pub timestamp_ns: i64,
}

impl LogLine {
    pub fn now(level: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp_ns: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    streams: Vec<PushStream<'a>>,
}

#[derive(Debug, Serialize)]
struct PushStream<'a> {
    stream: BTreeMap<&'a str, &'a str>,
    values: Vec<[String; 2]>,
}

/// Client for a Loki-compatible log backend.
#[derive(Debug, Clone)]
pub struct LokiClient {
    client: reqwest::Client,
    base_url: String,
    labels: BTreeMap<String, String>,
}

impl LokiClient {
    pub fn new(client: reqwest::Client, config: &LokiConfig, service_name: &str) -> Self {
        let mut labels = config.labels.clone();
        labels
            .entry("app".to_string())
            .or_insert_with(|| service_name.to_string());

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            labels,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the backend's readiness endpoint.
    pub async fn check_ready(&self) -> Result<Readiness, LokiError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, READY_PATH))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(Readiness::Ready)
        } else {
            Ok(Readiness::NotReady {
                status: status.as_u16(),
            })
        }
    }

    /// Push lines directly to the backend, bypassing the log shipper.
    pub async fn push(&self, lines: &[LogLine]) -> Result<(), LokiError> {
        let body = self.build_push(lines);
        let response = self
            .client
            .post(format!("{}{}", self.base_url, PUSH_PATH))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(LokiError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn build_push<'a>(&'a self, lines: &'a [LogLine]) -> PushRequest<'a> {
        let mut by_level: BTreeMap<&'static str, Vec<[String; 2]>> = BTreeMap::new();
        for line in lines {
            by_level
                .entry(line.level)
                .or_default()
                .push([line.timestamp_ns.to_string(), line.message.clone()]);
        }

        let streams = by_level
            .into_iter()
            .map(|(level, values)| {
                let mut stream: BTreeMap<&str, &str> = self
                    .labels
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                stream.insert("level", level);
                PushStream { stream, values }
            })
            .collect();

        PushRequest { streams }
    }
}
