//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every handler produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms in the instance recorder)
//!     → tracing.rs (W3C trace context carried through cascades)
//!
//! Consumers:
//!     → Log aggregation (stdout shipper, direct Loki push)
//!     → Metrics endpoint (Prometheus scrape of /metrics)
//!     → Distributed tracing (traceparent on every outbound call)
//! ```
//!
//! # Design Decisions
//! - Request ID and trace ID flow through every hop
//! - Metrics are cheap (atomic increments)
//! - Telemetry context is passed explicitly, never looked up globally

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::metrics::Telemetry;
pub use self::tracing::TraceContext;
