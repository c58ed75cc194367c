//! Fixed-rate load injector.
//!
//! # Responsibilities
//! - Issue GET requests at a constant rate for a fixed duration
//! - Pick one scenario uniformly at random per tick
//! - Count successes (2xx) and failures (non-2xx, network errors)
//! - Write a report artifact and log completion
//!
//! # Design Decisions
//! - Each request is spawned so a slow response never delays the schedule
//! - No request is issued once the duration has elapsed; in-flight
//!   requests are awaited before the report is built
//! - No retries: a failure is a data point
//! - Starts only after the readiness signal, never on a fixed delay

use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::config::LoadTestConfig;
use crate::lifecycle::startup::{base_url_for, ReadyWaiter};
use crate::load::report::{write_report, LoadTestResult, RunStats};
use crate::load::scenario::{build_scenarios, Scenario};

/// Highest request rate a run accepts.
pub const MAX_RATE_PER_SECOND: u32 = 10_000;

/// Longest run a configuration accepts, in seconds (one day).
pub const MAX_DURATION_SECS: u64 = 86_400;

/// Errors that abort a whole load test run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no load test scenarios configured")]
    NoScenarios,
    #[error("rate must be greater than 0")]
    ZeroRate,
    #[error("duration must be greater than 0")]
    ZeroDuration,
    #[error("rate {0} per second is too high to schedule")]
    RateTooHigh(u32),
    #[error("duration of {0:?} is too long to schedule")]
    DurationTooLong(Duration),
    #[error("failed to write load test report: {0}")]
    Report(#[from] std::io::Error),
}

/// Outcome of one load request: (scenario index, success, latency if a response arrived).
type RequestOutcome = (usize, bool, Option<Duration>);

/// Drive `scenarios` at `rate_per_second` for `duration`.
pub async fn run_load(
    client: &reqwest::Client,
    scenarios: &[Scenario],
    rate_per_second: u32,
    duration: Duration,
) -> Result<LoadTestResult, LoadError> {
    if scenarios.is_empty() {
        return Err(LoadError::NoScenarios);
    }
    if rate_per_second == 0 {
        return Err(LoadError::ZeroRate);
    }
    if duration.is_zero() {
        return Err(LoadError::ZeroDuration);
    }

    let period = Duration::from_secs_f64(1.0 / f64::from(rate_per_second));
    if period.is_zero() {
        return Err(LoadError::RateTooHigh(rate_per_second));
    }
    let deadline = tokio::time::Instant::now()
        .checked_add(duration)
        .ok_or(LoadError::DurationTooLong(duration))?;

    tracing::info!(
        rate_per_second,
        duration_secs = duration.as_secs_f64(),
        scenarios = scenarios.len(),
        "Load test starting"
    );

    let started_at = Utc::now();
    let start = Instant::now();

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let mut stats = RunStats::new(scenarios);
    let mut in_flight: JoinSet<RequestOutcome> = JoinSet::new();

    loop {
        let scheduled = ticker.tick().await;
        if scheduled >= deadline || tokio::time::Instant::now() >= deadline {
            break;
        }

        let index = rand::thread_rng().gen_range(0..scenarios.len());
        let client = client.clone();
        let url = scenarios[index].url.clone();
        in_flight.spawn(async move {
            let sent = Instant::now();
            match client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    let latency = sent.elapsed();
                    if !status.is_success() {
                        tracing::debug!(url = %url, status = %status, "Load request failed");
                    }
                    (index, status.is_success(), Some(latency))
                }
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Load request error");
                    (index, false, None)
                }
            }
        });

        while let Some(done) = in_flight.try_join_next() {
            collect(&mut stats, done);
        }
    }

    let issue_window = start.elapsed();
    while let Some(done) = in_flight.join_next().await {
        collect(&mut stats, done);
    }

    Ok(stats.finish(
        started_at,
        rate_per_second,
        duration,
        issue_window,
        start.elapsed(),
    ))
}

fn collect(stats: &mut RunStats, done: Result<RequestOutcome, tokio::task::JoinError>) {
    match done {
        Ok((index, success, latency)) => stats.record(index, success, latency),
        Err(e) => tracing::warn!(error = %e, "Load request task failed"),
    }
}

/// Background load test bound to a configuration.
pub struct LoadInjector {
    client: reqwest::Client,
    config: LoadTestConfig,
}

impl LoadInjector {
    pub fn new(client: reqwest::Client, config: LoadTestConfig) -> Self {
        Self { client, config }
    }

    pub fn report_dir(&self) -> &Path {
        Path::new(&self.config.report_dir)
    }

    /// Run against `base_url`, write the report and log the summary.
    pub async fn run(&self, base_url: &str) -> Result<(LoadTestResult, PathBuf), LoadError> {
        let scenarios = build_scenarios(base_url, &self.config.scenarios);
        let result = run_load(
            &self.client,
            &scenarios,
            self.config.rate_per_second,
            Duration::from_secs(self.config.duration_secs),
        )
        .await?;

        let path = write_report(self.report_dir(), &result).await?;
        tracing::info!(
            run_id = %result.run_id,
            attempted = result.attempted,
            succeeded = result.succeeded,
            failed = result.failed,
            report = %path.display(),
            "Load test completed: {}",
            result.summary()
        );
        Ok((result, path))
    }

    /// Wait for the service to be ready, then run. Errors are logged, never returned.
    pub async fn run_when_ready(self, ready: ReadyWaiter) -> Option<LoadTestResult> {
        let Some(addr) = ready.wait().await else {
            tracing::warn!("Service never became ready; load test skipped");
            return None;
        };

        match self.run(&base_url_for(addr)).await {
            Ok((result, _)) => Some(result),
            Err(e) => {
                tracing::error!(error = %e, "Load test failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_bad_settings() {
        let client = reqwest::Client::new();
        let scenario = Scenario {
            name: "x".into(),
            url: "http://127.0.0.1:1/".into(),
            description: String::new(),
        };

        assert!(matches!(
            run_load(&client, &[], 1, Duration::from_secs(1)).await,
            Err(LoadError::NoScenarios)
        ));
        assert!(matches!(
            run_load(&client, std::slice::from_ref(&scenario), 0, Duration::from_secs(1)).await,
            Err(LoadError::ZeroRate)
        ));
        assert!(matches!(
            run_load(&client, std::slice::from_ref(&scenario), 1, Duration::ZERO).await,
            Err(LoadError::ZeroDuration)
        ));
    }

    #[tokio::test]
    async fn test_unschedulable_settings_are_errors() {
        let client = reqwest::Client::new();
        let scenario = Scenario {
            name: "x".into(),
            url: "http://127.0.0.1:1/".into(),
            description: String::new(),
        };

        assert!(matches!(
            run_load(&client, std::slice::from_ref(&scenario), u32::MAX, Duration::from_millis(10)).await,
            Err(LoadError::RateTooHigh(u32::MAX))
        ));
        assert!(matches!(
            run_load(&client, std::slice::from_ref(&scenario), 1, Duration::from_secs(u64::MAX)).await,
            Err(LoadError::DurationTooLong(_))
        ));
    }

    #[tokio::test]
    async fn test_network_errors_counted_not_fatal() {
        let client = reqwest::Client::new();
        let scenarios = vec![Scenario {
            name: "dead".into(),
            url: "http://127.0.0.1:1/".into(),
            description: String::new(),
        }];

        let result = run_load(&client, &scenarios, 20, Duration::from_millis(500))
            .await
            .unwrap();
        assert!(result.attempted >= 8 && result.attempted <= 10, "attempted {}", result.attempted);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, result.attempted);
        assert!(result.latency.is_none());
    }
}
