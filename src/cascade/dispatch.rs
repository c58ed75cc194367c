//! Cascade dispatch over the HTTP loopback.
//!
//! # Responsibilities
//! - Consult the cascade table for the calling handler
//! - Call the target endpoint on the service's own address
//! - Log and count the outcome; never propagate a failure
//!
//! # Design Decisions
//! - The random draw happens before any await (request-scoped, no shared RNG)
//! - Request ID, trace context and cascade depth travel as headers
//! - The depth guard is opt-in; without it the cycle is unbounded

use std::sync::Arc;

use crate::cascade::table::{CascadeRng, CascadeTable};
use crate::http::request::{RequestContext, X_CASCADE_DEPTH, X_REQUEST_ID};
use crate::observability::tracing::TRACEPARENT;
use crate::observability::Telemetry;
use crate::routing::EndpointId;

/// Result of one cascade hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// The target answered with this status.
    Completed { target: EndpointId, status: u16 },
    /// The call itself failed (connect error, timeout).
    Failed { target: EndpointId, error: String },
}

/// Issues cascade calls for handlers.
pub struct CascadeDispatcher {
    table: CascadeTable,
    client: reqwest::Client,
    base_url: String,
    enabled: bool,
    max_depth: Option<u32>,
    telemetry: Arc<Telemetry>,
}

impl CascadeDispatcher {
    pub fn new(
        table: CascadeTable,
        client: reqwest::Client,
        base_url: impl Into<String>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            table,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            enabled: true,
            max_depth: None,
            telemetry,
        }
    }

    /// Turn cascading on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Suppress cascades once the inbound depth reaches `max_depth`.
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decide using an explicit randomness source.
    pub fn decide_with<R: CascadeRng + ?Sized>(
        &self,
        source: EndpointId,
        depth: u32,
        rng: &mut R,
    ) -> Option<EndpointId> {
        if !self.enabled {
            return None;
        }
        let target = self.table.maybe_cascade(source, rng)?;

        if let Some(max_depth) = self.max_depth {
            if depth >= max_depth {
                tracing::debug!(
                    source = %source,
                    target = %target,
                    depth,
                    max_depth,
                    "Cascade suppressed by depth guard"
                );
                self.telemetry.record_cascade(source, target, "suppressed");
                return None;
            }
        }
        Some(target)
    }

    /// Decide with the thread-local RNG.
    pub fn decide(&self, source: EndpointId, depth: u32) -> Option<EndpointId> {
        let mut rng = rand::thread_rng();
        self.decide_with(source, depth, &mut rng)
    }

    /// Draw for `source` and, if it fires, call the target.
    pub async fn maybe_cascade(
        &self,
        source: EndpointId,
        ctx: &RequestContext,
    ) -> Option<CascadeOutcome> {
        let target = self.decide(source, ctx.cascade_depth)?;
        Some(self.follow(source, target, ctx).await)
    }

    /// Call `target` on the local service. Failures are logged, not returned as errors.
    pub async fn follow(
        &self,
        source: EndpointId,
        target: EndpointId,
        ctx: &RequestContext,
    ) -> CascadeOutcome {
        let url = format!("{}{}", self.base_url, target.path());
        let depth = ctx.cascade_depth.saturating_add(1);

        tracing::info!(
            source = %source,
            target = %target,
            depth,
            "Cascading to {}",
            target.path()
        );

        let result = self
            .client
            .get(&url)
            .header(X_REQUEST_ID, ctx.request_id.as_str())
            .header(TRACEPARENT, ctx.trace.child().traceparent())
            .header(X_CASCADE_DEPTH, depth.to_string())
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                tracing::info!(
                    source = %source,
                    target = %target,
                    status = status.as_u16(),
                    "Cascade call to {} returned {}",
                    target.path(),
                    status
                );
                let outcome = if status.is_success() { "ok" } else { "error_status" };
                self.telemetry.record_cascade(source, target, outcome);
                CascadeOutcome::Completed {
                    target,
                    status: status.as_u16(),
                }
            }
            Err(e) => {
                tracing::warn!(
                    source = %source,
                    target = %target,
                    error = %e,
                    "Cascade call to {} failed",
                    target.path()
                );
                self.telemetry.record_cascade(source, target, "failed");
                CascadeOutcome::Failed {
                    target,
                    error: e.to_string(),
                }
            }
        }
    }
}
