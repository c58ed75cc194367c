//! Log backend integration.
//!
//! # Data Flow
//! ```text
//! /loki-test  → client.rs check_ready → GET {url}/ready
//! /force-logs → client.rs push        → POST {url}/loki/api/v1/push
//! ```

pub mod client;

pub use client::{LogLine, LokiClient, LokiError, Readiness};
