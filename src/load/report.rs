//! Load test results and report artifacts.
//!
//! # Responsibilities
//! - Aggregate per-request outcomes into a run summary
//! - Write the summary as a JSON artifact
//!
//! # Design Decisions
//! - One file per run, named by start time and run ID, never overwritten
//! - Latency percentiles cover completed requests only (no network errors)

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::load::scenario::Scenario;

/// Counters for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub url: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Latency distribution of completed requests, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

impl LatencySummary {
    /// Percentiles over `latencies`; `None` when nothing completed.
    pub fn from_latencies(latencies: &mut [Duration]) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }
        latencies.sort();
        let pick = |q: f64| {
            let idx = ((latencies.len() as f64 * q) as usize).min(latencies.len() - 1);
            latencies[idx].as_secs_f64() * 1000.0
        };
        Some(Self {
            p50_ms: pick(0.50),
            p95_ms: pick(0.95),
            p99_ms: pick(0.99),
            max_ms: latencies[latencies.len() - 1].as_secs_f64() * 1000.0,
        })
    }
}

/// Aggregate result of one load test run.
#[derive(Debug, Clone, Serialize)]
pub struct LoadTestResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub rate_per_second: u32,
    pub duration_secs: f64,
    /// Time spent issuing requests.
    pub issue_window_secs: f64,
    /// Time until the last in-flight request finished.
    pub elapsed_secs: f64,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub achieved_rps: f64,
    pub latency: Option<LatencySummary>,
    pub scenarios: Vec<ScenarioResult>,
}

impl LoadTestResult {
    /// Fraction of attempted requests that succeeded.
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted as f64
        }
    }

    /// One-line summary for logs and the CLI.
    pub fn summary(&self) -> String {
        format!(
            "{} requests ({} ok, {} failed) in {:.2}s, {:.2} req/s",
            self.attempted, self.succeeded, self.failed, self.issue_window_secs, self.achieved_rps
        )
    }
}

/// Per-request outcomes collected while the run is in progress.
#[derive(Debug)]
pub(crate) struct RunStats {
    scenarios: Vec<ScenarioResult>,
    latencies: Vec<Duration>,
}

impl RunStats {
    pub(crate) fn new(scenarios: &[Scenario]) -> Self {
        Self {
            scenarios: scenarios
                .iter()
                .map(|s| ScenarioResult {
                    name: s.name.clone(),
                    url: s.url.clone(),
                    ..ScenarioResult::default()
                })
                .collect(),
            latencies: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, scenario: usize, success: bool, latency: Option<Duration>) {
        if let Some(entry) = self.scenarios.get_mut(scenario) {
            entry.attempted += 1;
            if success {
                entry.succeeded += 1;
            } else {
                entry.failed += 1;
            }
        }
        if let Some(latency) = latency {
            self.latencies.push(latency);
        }
    }

    pub(crate) fn finish(
        mut self,
        started_at: DateTime<Utc>,
        rate_per_second: u32,
        duration: Duration,
        issue_window: Duration,
        elapsed: Duration,
    ) -> LoadTestResult {
        let attempted = self.scenarios.iter().map(|s| s.attempted).sum();
        let succeeded = self.scenarios.iter().map(|s| s.succeeded).sum();
        let failed = self.scenarios.iter().map(|s| s.failed).sum();
        let window = issue_window.as_secs_f64();

        LoadTestResult {
            run_id: Uuid::new_v4(),
            started_at,
            rate_per_second,
            duration_secs: duration.as_secs_f64(),
            issue_window_secs: window,
            elapsed_secs: elapsed.as_secs_f64(),
            attempted,
            succeeded,
            failed,
            achieved_rps: if window > 0.0 { attempted as f64 / window } else { 0.0 },
            latency: LatencySummary::from_latencies(&mut self.latencies),
            scenarios: self.scenarios,
        }
    }
}

/// Write `result` as pretty JSON under `dir`, creating the directory if needed.
pub async fn write_report(dir: &Path, result: &LoadTestResult) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let file_name = format!(
        "load-test-{}-{}.json",
        result.started_at.format("%Y%m%dT%H%M%SZ"),
        result.run_id.simple()
    );
    let path = dir.join(file_name);
    let body = serde_json::to_vec_pretty(result)?;
    tokio::fs::write(&path, body).await?;
    Ok(path)
}
