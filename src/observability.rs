use std::net::SocketAddr;

use crate::command::Command;
use crate::engine::EngineError;

// ── RED metrics (command-driven) ────────────────────────────────

/// Counter: total commands executed. Labels: command, status.
pub const COMMANDS_TOTAL: &str = "seatgrid_commands_total";

/// Histogram: command latency in seconds. Labels: command.
pub const COMMAND_DURATION_SECONDS: &str = "seatgrid_command_duration_seconds";

/// Counter: job lines rejected by the parser. Labels: job.
pub const COMMANDS_REJECTED_TOTAL: &str = "seatgrid_commands_rejected_total";

/// Counter: failed reservation attempts. Labels: reason.
pub const RESERVATIONS_REJECTED_TOTAL: &str = "seatgrid_reservations_rejected_total";

// ── USE metrics (worker utilization) ────────────────────────────

/// Gauge: jobs currently holding a worker slot.
pub const JOBS_ACTIVE: &str = "seatgrid_jobs_active";

/// Counter: total job runs started, retries included.
pub const JOBS_TOTAL: &str = "seatgrid_jobs_total";

/// Counter: jobs restarted after a failed run.
pub const JOB_RETRIES_TOTAL: &str = "seatgrid_job_retries_total";

/// Counter: jobs abandoned after the retry also failed.
pub const JOBS_FAILED_TOTAL: &str = "seatgrid_jobs_failed_total";

/// Histogram: wall-clock duration of one job run in seconds.
pub const JOB_DURATION_SECONDS: &str = "seatgrid_job_duration_seconds";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Create { .. } => "create",
        Command::Reserve { .. } => "reserve",
        Command::Show { .. } => "show",
        Command::List => "list",
        Command::Wait { .. } => "wait",
        Command::Barrier => "barrier",
        Command::Help => "help",
        Command::Empty => "empty",
    }
}

/// Map an engine error to a rejection reason label.
pub fn error_label(err: &EngineError) -> &'static str {
    match err {
        EngineError::NotFound(_) => "event_not_found",
        EngineError::DuplicateEvent(_) => "duplicate_event",
        EngineError::InvalidDimensions { .. } => "invalid_dimensions",
        EngineError::OutOfBounds { .. } => "seat_out_of_bounds",
        EngineError::SeatTaken { .. } => "seat_taken",
        EngineError::GridAllocation { .. } => "grid_allocation",
    }
}
