//! Response types and error mapping.
//!
//! # Responsibilities
//! - Map handler errors to HTTP status codes
//! - Render failures as `application/problem+json` documents
//! - Provide the timestamp format shared by every JSON body
//!
//! # Design Decisions
//! - Only the demo error route and a failed log-backend probe surface as 500s
//! - Generic detail text for upstream failures; the cause goes to the log

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::loki::LokiError;

/// Current time as an RFC 3339 UTC string.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Errors a handler may return to the client.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Raised on purpose by the `/error` endpoint.
    #[error("This is a simulated error for testing error logging")]
    Simulated,

    /// The log backend probe could not be performed at all.
    #[error("log backend probe failed: {0}")]
    LokiProbe(#[from] LokiError),

    /// No endpoint is registered for the path.
    #[error("no endpoint registered for {0}")]
    NotFound(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Simulated | HttpError::LokiProbe(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn problem(&self) -> ProblemDetails {
        let status = self.status();
        let (title, detail) = match self {
            HttpError::Simulated => ("Simulated error", self.to_string()),
            HttpError::LokiProbe(_) => (
                "An error occurred while processing your request.",
                "The log backend could not be reached.".to_string(),
            ),
            HttpError::NotFound(_) => ("Not Found", self.to_string()),
        };

        ProblemDetails {
            kind: "about:blank",
            title,
            status: status.as_u16(),
            detail,
            timestamp: timestamp(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let problem = self.problem();
        let status = self.status();
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(problem),
        )
            .into_response()
    }
}

/// RFC 7807 problem document.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
    pub timestamp: String,
}
