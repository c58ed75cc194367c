//! Cascade simulator.
//!
//! # Data Flow
//! ```text
//! Handler invoked (source endpoint, request context)
//!     → table.rs (one draw against the source's rule)
//!     → dispatch.rs (depth guard, HTTP GET to own address)
//!     → target handler runs, may cascade again
//!     → outcome logged + counted; caller's response unaffected
//! ```

pub mod dispatch;
pub mod table;

pub use dispatch::{CascadeDispatcher, CascadeOutcome};
pub use table::{CascadeError, CascadeRng, CascadeRule, CascadeTable};
