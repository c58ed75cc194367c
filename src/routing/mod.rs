//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     EndpointId (fixed set)
//!     → registry.rs (bind handler per endpoint)
//!     → Freeze as immutable axum Router
//!
//! Request:
//!     path → matching handler, or 404 problem response
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Endpoint names double as metric labels and cascade targets

pub mod endpoint;
pub mod registry;

pub use endpoint::EndpointId;
pub use registry::{EndpointRegistry, RegistryError};
