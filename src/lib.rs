//! Observability Demo Service Library
//!
//! An HTTP service whose endpoints exist to emit logs, metrics and trace
//! spans, plus a fixed-rate load injector to drive them.

pub mod cascade;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod load;
pub mod loki;
pub mod observability;
pub mod routing;

pub use config::DemoConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
