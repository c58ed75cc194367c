//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DemoConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CascadeConfig, DemoConfig, HttpClientConfig, ListenerConfig, LoadTestConfig, LogFormat,
    LoggingConfig, LokiConfig, MetricsConfig, ServiceConfig, TimeoutConfig, TraceConfig,
};
pub use validation::{validate_config, ValidationError};
