use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use seatgrid::engine::Engine;
use seatgrid::jobs;
use seatgrid::scheduler::JobScheduler;

/// Batch seat reservation engine driven by job files.
#[derive(Parser, Debug)]
#[command(name = "seatgrid", version)]
struct Cli {
    /// Directory scanned for .jobs files.
    jobs_dir: PathBuf,

    /// Job files processed at once.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    max_concurrent_files: u64,

    /// Commands of one job in flight at once.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    max_concurrent_commands: u64,

    /// Simulated storage access delay in milliseconds.
    #[arg(default_value_t = seatgrid::delay::DEFAULT_ACCESS_DELAY_MS)]
    state_access_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let metrics_port: Option<u16> = std::env::var("SEATGRID_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    seatgrid::observability::init(metrics_port);

    let specs = jobs::discover_jobs(&cli.jobs_dir).await?;
    info!("seatgrid starting");
    info!("  jobs_dir: {} ({} job files)", cli.jobs_dir.display(), specs.len());
    info!("  access_delay_ms: {}", cli.state_access_delay_ms);
    info!("  max_concurrent_files: {}", cli.max_concurrent_files);
    info!("  max_concurrent_commands: {}", cli.max_concurrent_commands);
    info!("  metrics: {}", metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let engine = Arc::new(Engine::new(cli.state_access_delay_ms));
    let scheduler = JobScheduler::new(
        engine,
        cli.max_concurrent_files as usize,
        cli.max_concurrent_commands as usize,
    );

    let abandoned = scheduler.run(specs).await;
    if abandoned > 0 {
        tracing::error!("{abandoned} job(s) abandoned after retry");
        std::process::exit(1);
    }
    info!("seatgrid finished");
    Ok(())
}
