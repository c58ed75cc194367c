//! Request context and per-request middleware.
//!
//! # Responsibilities
//! - Read request ID, trace context and cascade depth from headers
//! - Run each request inside an `http_request` span
//! - Record request count and latency
//!
//! # Design Decisions
//! - Request ID is assigned by tower-http before this middleware runs
//! - Unmatched paths share one metric label to bound cardinality
//! - Malformed depth headers count as depth 0

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::observability::tracing::TRACEPARENT;
use crate::observability::{Telemetry, TraceContext};

/// Request ID header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Number of cascade hops that led to this request.
pub const X_CASCADE_DEPTH: &str = "x-cascade-depth";

/// Per-request values handlers need for logging and cascading.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub trace: TraceContext,
    pub cascade_depth: u32,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        Self {
            request_id: header(X_REQUEST_ID).unwrap_or("unknown").to_string(),
            trace: TraceContext::from_traceparent(header(TRACEPARENT)),
            cascade_depth: header(X_CASCADE_DEPTH)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        }
    }

    /// Context for work that did not arrive as a request.
    pub fn detached() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            trace: TraceContext::new_root(),
            cascade_depth: 0,
        }
    }
}

/// Builds the [`RequestContext`], instruments the request and records metrics.
pub async fn request_context_middleware(
    State(telemetry): State<Arc<Telemetry>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let ctx = RequestContext::from_headers(request.headers());
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let span = tracing::info_span!(
        "http_request",
        method = %method,
        path = %request.uri().path(),
        request_id = %ctx.request_id,
        trace_id = %ctx.trace.trace_id(),
        span_id = %ctx.trace.span_id(),
        cascade_depth = ctx.cascade_depth,
    );

    request.extensions_mut().insert(ctx);
    let response = next.run(request).instrument(span).await;

    telemetry.record_request(&method, &path, response.status().as_u16(), start_time);
    response
}
