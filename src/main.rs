//! Observability Demo Service
//!
//! A small HTTP service whose endpoints exist to produce telemetry for
//! validating a log/metrics/tracing stack.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │               OBSERVABILITY DEMO                 │
//!                         │                                                  │
//!   Client / Load         │  ┌──────────┐   ┌───────────┐   ┌────────────┐   │
//!   ──────────────────────┼─▶│ request  │──▶│  routing  │──▶│  handlers  │   │
//!                         │  │ context  │   │ registry  │   └─────┬──────┘   │
//!                         │  └──────────┘   └───────────┘         │          │
//!                         │        ▲                              ▼          │
//!                         │        │  loopback GET         ┌────────────┐    │
//!                         │        └───────────────────────│  cascade   │    │
//!                         │                                └────────────┘    │
//!                         │                                                  │
//!                         │  ┌────────────┐  ┌─────────┐  ┌──────────────┐   │
//!                         │  │ telemetry  │  │  loki   │  │ load injector│   │
//!                         │  │ /metrics   │  │ client  │  │ (after ready)│   │
//!                         │  └────────────┘  └─────────┘  └──────────────┘   │
//!                         └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use observability_demo::config::{load_config, validate_config, ConfigError, DemoConfig};
use observability_demo::http::HttpServer;
use observability_demo::lifecycle::{readiness, signals, Shutdown};
use observability_demo::load::LoadInjector;
use observability_demo::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "observability-demo")]
#[command(about = "HTTP service that emits logs, metrics and traces on demand", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Run the load injector once the service is ready.
    #[arg(long)]
    load_test: bool,
}

fn resolve_config(cli: &Cli) -> Result<DemoConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DemoConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    if cli.load_test {
        config.load_test.enabled = true;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.logging)?;
    tracing::info!("observability-demo v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        service = %config.service.name,
        loki_url = %config.loki.url,
        load_test = config.load_test.enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let (ready, waiter) = readiness();
    let server = HttpServer::new(config)?;

    if server.config().load_test.enabled {
        let injector = LoadInjector::new(server.client(), server.config().load_test.clone());
        tokio::spawn(injector.run_when_ready(waiter));
    }

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::forward_to(&signal_shutdown).await;
    });

    server.run(listener, ready, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
