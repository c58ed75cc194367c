//! Demo endpoint handlers.
//!
//! Every handler records one `demo_operations_total` increment, logs what it
//! does, and may cascade to the next endpoint before answering.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use tracing::{field, Instrument};

use crate::http::request::RequestContext;
use crate::http::response::{timestamp, HttpError};
use crate::http::server::AppState;
use crate::loki::LogLine;
use crate::observability::tracing::TRACEPARENT;
use crate::routing::EndpointId;

/// Body of `/`.
pub const ROOT_MESSAGE: &str = "Hello from the observability demo!";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct TestLogsResponse {
    pub message: &'static str,
    pub levels: [&'static str; 3],
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LokiTestResponse {
    pub loki_status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceLogsResponse {
    pub message: &'static str,
    pub count: usize,
    pub loki_push: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceTestResponse {
    pub message: &'static str,
    pub trace_id: String,
    pub span_id: String,
    pub external_status: String,
    pub timestamp: String,
}

/// `GET /`
pub async fn root(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> &'static str {
    state.telemetry.record_operation(EndpointId::Root);
    tracing::info!("Root endpoint accessed");

    state.cascade.maybe_cascade(EndpointId::Root, &ctx).await;
    ROOT_MESSAGE
}

/// `GET /health`
pub async fn health(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Json<HealthResponse> {
    state.telemetry.record_operation(EndpointId::Health);
    tracing::info!("Health check requested");

    state.cascade.maybe_cascade(EndpointId::Health, &ctx).await;
    Json(HealthResponse {
        status: "healthy",
        timestamp: timestamp(),
    })
}

/// `GET /error`: always fails.
pub async fn error(State(state): State<AppState>) -> Result<&'static str, HttpError> {
    state.telemetry.record_operation(EndpointId::Error);
    tracing::error!("Simulated error endpoint called");
    Err(HttpError::Simulated)
}

/// `GET /test-logs`
pub async fn test_logs(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Json<TestLogsResponse> {
    state.telemetry.record_operation(EndpointId::TestLogs);
    tracing::info!(level_name = "Information", "This is an information log from test-logs");
    tracing::warn!(level_name = "Warning", "This is a warning log from test-logs");
    tracing::error!(level_name = "Error", "This is an error log from test-logs");

    state.cascade.maybe_cascade(EndpointId::TestLogs, &ctx).await;
    Json(TestLogsResponse {
        message: "Test logs generated",
        levels: ["Information", "Warning", "Error"],
        timestamp: timestamp(),
    })
}

/// `GET /loki-test`: probe the log backend.
pub async fn loki_test(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<LokiTestResponse>, HttpError> {
    state.telemetry.record_operation(EndpointId::LokiTest);
    tracing::info!(loki_url = %state.loki.base_url(), "Testing log backend connectivity");

    let readiness = match state.loki.check_ready().await {
        Ok(readiness) => readiness,
        Err(e) => {
            tracing::error!(error = %e, "Log backend probe failed");
            state.telemetry.record_loki_check("error");
            return Err(HttpError::LokiProbe(e));
        }
    };

    if readiness.is_ready() {
        tracing::info!("Log backend is ready");
        state.telemetry.record_loki_check("ready");
    } else {
        tracing::warn!(status = ?readiness, "Log backend is not ready");
        state.telemetry.record_loki_check("not_ready");
    }

    state.cascade.maybe_cascade(EndpointId::LokiTest, &ctx).await;
    Ok(Json(LokiTestResponse {
        loki_status: readiness.describe(),
        timestamp: timestamp(),
    }))
}

/// `GET /force-logs`: log a burst and push it straight to the backend.
pub async fn force_logs(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Json<ForceLogsResponse> {
    state.telemetry.record_operation(EndpointId::ForceLogs);
    let count = state.config.loki.burst_size;

    let mut lines = Vec::with_capacity(count);
    for i in 1..=count {
        let message = format!("Forced log entry {} of {} (request {})", i, count, ctx.request_id);
        tracing::info!(sequence = i, "{}", message);
        lines.push(LogLine::now("info", message));
    }

    let loki_push = match state.loki.push(&lines).await {
        Ok(()) => {
            tracing::info!(count, "Forced logs pushed to log backend");
            state.telemetry.record_loki_push("ok");
            "ok".to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Direct push to log backend failed");
            state.telemetry.record_loki_push("failed");
            format!("failed: {}", e)
        }
    };

    state.cascade.maybe_cascade(EndpointId::ForceLogs, &ctx).await;
    Json(ForceLogsResponse {
        message: "Forced logs sent",
        count,
        loki_push,
        timestamp: timestamp(),
    })
}

/// `GET /trace-test`: wrap an external call in a client span.
pub async fn trace_test(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Json<TraceTestResponse> {
    state.telemetry.record_operation(EndpointId::TraceTest);
    let url = state.config.trace.external_url.clone();
    let trace = ctx.trace.child();

    let span = tracing::info_span!(
        "trace_test",
        otel.kind = "client",
        trace_id = %trace.trace_id(),
        span_id = %trace.span_id(),
        parent_span_id = %ctx.trace.span_id(),
        http.url = %url,
        http.status_code = field::Empty,
        otel.status_code = field::Empty,
    );

    let result = state
        .client
        .get(&url)
        .header(TRACEPARENT, trace.traceparent())
        .send()
        .instrument(span.clone())
        .await;

    let external_status = match result {
        Ok(response) => {
            let status = response.status();
            span.record("http.status_code", status.as_u16());
            if status.is_success() {
                span.record("otel.status_code", "OK");
                state.telemetry.record_trace_test("ok");
            } else {
                span.record("otel.status_code", "ERROR");
                state.telemetry.record_trace_test("error_status");
            }
            span.in_scope(|| tracing::info!(status = status.as_u16(), "External call completed"));
            status.as_u16().to_string()
        }
        Err(e) => {
            span.record("otel.status_code", "ERROR");
            state.telemetry.record_trace_test("failed");
            span.in_scope(|| tracing::warn!(error = %e, "External call failed"));
            format!("error: {}", e)
        }
    };

    state.cascade.maybe_cascade(EndpointId::TraceTest, &ctx).await;
    Json(TraceTestResponse {
        message: "Trace test completed",
        trace_id: trace.trace_id(),
        span_id: trace.span_id(),
        external_status,
        timestamp: timestamp(),
    })
}

/// `GET /metrics`: Prometheus scrape.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.telemetry.render(),
    )
}
