//! Endpoint registry.
//!
//! # Responsibilities
//! - Bind each endpoint to its handler
//! - Reject duplicate registrations
//! - Produce the axum router used for dispatch
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards (no locking on dispatch)
//! - Unknown paths fall through to an explicit 404 problem response

use axum::{http::Uri, routing::MethodRouter, Router};

use crate::http::response::HttpError;
use crate::routing::endpoint::EndpointId;

/// Errors raised while building the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("endpoint {name} already registered at {path}")]
    Duplicate { name: &'static str, path: &'static str },
}

/// Collects endpoint registrations and turns them into a router.
pub struct EndpointRegistry<S> {
    endpoints: Vec<EndpointId>,
    router: Router<S>,
}

impl<S> EndpointRegistry<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            router: Router::new(),
        }
    }

    /// Register a handler for an endpoint.
    pub fn register(
        mut self,
        endpoint: EndpointId,
        handler: MethodRouter<S>,
    ) -> Result<Self, RegistryError> {
        if self.endpoints.contains(&endpoint) {
            return Err(RegistryError::Duplicate {
                name: endpoint.name(),
                path: endpoint.path(),
            });
        }

        tracing::debug!(endpoint = %endpoint, path = endpoint.path(), "Endpoint registered");
        self.router = self.router.route(endpoint.path(), handler);
        self.endpoints.push(endpoint);
        Ok(self)
    }

    /// Endpoints registered so far, in registration order.
    pub fn endpoints(&self) -> &[EndpointId] {
        &self.endpoints
    }

    /// Freeze the registry into a router with a not-found fallback.
    pub fn into_router(self) -> Router<S> {
        self.router.fallback(not_found)
    }
}

impl<S> Default for EndpointRegistry<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

async fn not_found(uri: Uri) -> HttpError {
    tracing::warn!(path = %uri.path(), "No endpoint matched");
    HttpError::NotFound(uri.path().to_string())
}
