//! Load injector.
//!
//! # Data Flow
//! ```text
//! Readiness signal (bound address)
//!     → scenario.rs (menu resolved against base URL)
//!     → injector.rs (fixed-rate ticks, one random scenario per tick)
//!     → report.rs (aggregate counters → JSON artifact)
//!     → completion log line
//! ```

pub mod injector;
pub mod report;
pub mod scenario;

pub use injector::{run_load, LoadError, LoadInjector, MAX_DURATION_SECS, MAX_RATE_PER_SECOND};
pub use report::{write_report, LatencySummary, LoadTestResult, ScenarioResult};
pub use scenario::{build_scenarios, Scenario, ScenarioConfig};
