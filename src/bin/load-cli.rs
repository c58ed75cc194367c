use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use observability_demo::config::HttpClientConfig;
use observability_demo::http::build_client;
use observability_demo::load::{
    build_scenarios, run_load, write_report, ScenarioConfig, MAX_DURATION_SECS, MAX_RATE_PER_SECOND,
};
use observability_demo::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "load-cli")]
#[command(about = "Fixed-rate load generator for the observability demo", long_about = None)]
struct Cli {
    /// Base URL of a running demo service.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a load test and write a JSON report
    Run {
        /// Requests per second
        #[arg(
            short,
            long,
            default_value_t = 10,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RATE_PER_SECOND))
        )]
        rate: u32,

        /// Duration in seconds
        #[arg(
            short,
            long,
            default_value_t = 8,
            value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_SECS)
        )]
        duration: u64,

        /// Directory for the report artifact
        #[arg(long, default_value = "load-test-reports")]
        report_dir: PathBuf,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
    /// List the scenarios a run picks from
    Scenarios,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let scenarios = build_scenarios(&cli.url, &ScenarioConfig::defaults());

    match cli.command {
        Commands::Scenarios => {
            for s in &scenarios {
                println!("{:<12} {:<40} {}", s.name, s.url, s.description);
            }
        }
        Commands::Run {
            rate,
            duration,
            report_dir,
            timeout,
        } => {
            init_logging(&Default::default())?;
            let client = build_client(&HttpClientConfig {
                timeout_secs: timeout,
                ..HttpClientConfig::default()
            })?;

            let result = run_load(&client, &scenarios, rate, Duration::from_secs(duration)).await?;
            let path = write_report(&report_dir, &result).await?;

            println!("\n--- Load Test Results ---");
            println!("Run ID:         {}", result.run_id);
            println!("Requests:       {}", result.attempted);
            println!("Succeeded:      {}", result.succeeded);
            println!("Failed:         {}", result.failed);
            println!("Success rate:   {:.1}%", result.success_rate() * 100.0);
            println!("Requests/sec:   {:.2}", result.achieved_rps);
            if let Some(latency) = &result.latency {
                println!("P50 Latency:    {:.1}ms", latency.p50_ms);
                println!("P95 Latency:    {:.1}ms", latency.p95_ms);
                println!("P99 Latency:    {:.1}ms", latency.p99_ms);
            }
            for s in &result.scenarios {
                println!("  {:<12} {}/{} ok", s.name, s.succeeded, s.attempted);
            }
            println!("Report:         {}", path.display());
            println!("-------------------------\n");
        }
    }

    Ok(())
}
