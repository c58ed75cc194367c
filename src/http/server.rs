//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared state (telemetry, cascade dispatcher, log backend client)
//! - Register every endpoint with its handler
//! - Wire up middleware (trace, request ID, timeout, request context)
//! - Signal readiness, then serve until shutdown

use axum::{http::StatusCode, middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cascade::{CascadeDispatcher, CascadeError, CascadeTable};
use crate::config::{DemoConfig, HttpClientConfig};
use crate::http::handlers;
use crate::http::request::request_context_middleware;
use crate::lifecycle::{base_url_for, ReadySignal, ShutdownListener};
use crate::loki::LokiClient;
use crate::observability::Telemetry;
use crate::routing::{EndpointId, EndpointRegistry, RegistryError};

/// Errors that stop the server from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to build metrics recorder: {0}")]
    Telemetry(#[from] metrics_exporter_prometheus::BuildError),
    #[error("invalid cascade table: {0}")]
    Cascade(#[from] CascadeError),
    #[error("route registration failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<Telemetry>,
    pub cascade: Arc<CascadeDispatcher>,
    pub loki: LokiClient,
    pub client: reqwest::Client,
    pub config: Arc<DemoConfig>,
}

/// Build the outbound HTTP client shared by cascades, probes and load.
pub fn build_client(config: &HttpClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
}

/// HTTP server for the demo endpoints.
pub struct HttpServer {
    config: Arc<DemoConfig>,
    telemetry: Arc<Telemetry>,
    cascade_table: CascadeTable,
    client: reqwest::Client,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: DemoConfig) -> Result<Self, ServerError> {
        let telemetry = Arc::new(Telemetry::new(config.service.name.clone())?);
        let cascade_table = CascadeTable::new(config.cascade.rules.iter().copied())?;
        let client = build_client(&config.http_client)?;

        Ok(Self {
            config: Arc::new(config),
            telemetry,
            cascade_table,
            client,
        })
    }

    pub fn telemetry(&self) -> Arc<Telemetry> {
        self.telemetry.clone()
    }

    pub fn client(&self) -> reqwest::Client {
        self.client.clone()
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Build the router. `base_url` is where cascades reach this service.
    pub fn router(&self, base_url: &str) -> Result<Router, ServerError> {
        let cascade = CascadeDispatcher::new(
            self.cascade_table.clone(),
            self.client.clone(),
            base_url,
            self.telemetry.clone(),
        )
        .with_enabled(self.config.cascade.enabled)
        .with_max_depth(self.config.cascade.max_depth);

        let state = AppState {
            telemetry: self.telemetry.clone(),
            cascade: Arc::new(cascade),
            loki: LokiClient::new(self.client.clone(), &self.config.loki, &self.config.service.name),
            client: self.client.clone(),
            config: self.config.clone(),
        };

        let mut registry = EndpointRegistry::new()
            .register(EndpointId::Root, get(handlers::root))?
            .register(EndpointId::Health, get(handlers::health))?
            .register(EndpointId::Error, get(handlers::error))?
            .register(EndpointId::TestLogs, get(handlers::test_logs))?
            .register(EndpointId::LokiTest, get(handlers::loki_test))?
            .register(EndpointId::ForceLogs, get(handlers::force_logs))?
            .register(EndpointId::TraceTest, get(handlers::trace_test))?;
        if self.config.metrics.enabled {
            registry = registry.register(EndpointId::Metrics, get(handlers::metrics))?;
        }

        tracing::debug!(endpoints = registry.endpoints().len(), "Endpoint registry built");

        let router = registry
            .into_router()
            .layer(middleware::from_fn_with_state(
                self.telemetry.clone(),
                request_context_middleware,
            ))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(self.config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http());

        Ok(router)
    }

    /// Serve on `listener` until `shutdown` fires. `ready` fires once routes are registered.
    pub async fn run(
        self,
        listener: TcpListener,
        ready: ReadySignal,
        shutdown: ShutdownListener,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let base_url = base_url_for(addr);
        let router = self.router(&base_url)?;

        tracing::info!(
            address = %addr,
            cascade_enabled = self.config.cascade.enabled,
            max_cascade_depth = ?self.config.cascade.max_depth,
            "HTTP server starting"
        );
        ready.mark_ready(addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
