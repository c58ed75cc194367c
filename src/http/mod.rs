//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, trace context, cascade depth, metrics)
//!     → routing registry (path → handler)
//!     → handlers.rs (telemetry + optional cascade)
//!     → response.rs (JSON bodies, problem documents)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, X_CASCADE_DEPTH, X_REQUEST_ID};
pub use response::HttpError;
pub use server::{build_client, AppState, HttpServer, ServerError};
