use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::fs::File;
use tokio::io::{self, AsyncBufReadExt, BufReader, BufWriter};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::command::{self, Command, HELP_TEXT};
use crate::engine::{Engine, EngineError};
use crate::jobs::JobSpec;
use crate::observability;
use crate::sink::OutputSink;

// ── scheduler ───────────────────────────────────────────────────

/// Runs discovered jobs under two concurrency bounds: a global pool of
/// worker slots (jobs running at once) and a per-job pool of command slots
/// (commands of one job in flight at once). Jobs are admitted in discovery
/// order as slots free up. Within a job the dispatch loop reads lines
/// sequentially; WAIT pauses the loop itself and BARRIER drains every
/// command the loop has dispatched so far.
pub struct JobScheduler {
    engine: Arc<Engine>,
    slots: Arc<Semaphore>,
    commands_per_job: usize,
}

impl JobScheduler {
    /// Both bounds must be at least 1; the CLI enforces this.
    pub fn new(engine: Arc<Engine>, max_jobs: usize, commands_per_job: usize) -> Self {
        Self {
            engine,
            slots: Arc::new(Semaphore::new(max_jobs)),
            commands_per_job,
        }
    }

    /// Run every job to completion. Returns the number of jobs abandoned
    /// after their retry also failed.
    pub async fn run(&self, jobs: Vec<JobSpec>) -> usize {
        let mut workers = JoinSet::new();
        for spec in jobs {
            // Acquiring before the spawn keeps admission in discovery order.
            let permit = self
                .slots
                .clone()
                .acquire_owned()
                .await
                .expect("job slot semaphore closed");
            let engine = Arc::clone(&self.engine);
            let commands_per_job = self.commands_per_job;
            workers.spawn(async move {
                let _permit = permit;
                metrics::gauge!(observability::JOBS_ACTIVE).increment(1.0);
                let ok = supervise(engine, &spec, commands_per_job).await;
                metrics::gauge!(observability::JOBS_ACTIVE).decrement(1.0);
                ok
            });
        }

        let mut abandoned = 0;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(true) => {}
                Ok(false) => abandoned += 1,
                Err(err) => {
                    error!(%err, "job supervisor crashed");
                    abandoned += 1;
                }
            }
        }
        abandoned
    }
}

// ── job supervision ─────────────────────────────────────────────

#[derive(Debug)]
pub enum JobError {
    Io(io::Error),
    TaskPanicked,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::Io(err) => write!(f, "io error: {err}"),
            JobError::TaskPanicked => write!(f, "a command task panicked"),
        }
    }
}

impl std::error::Error for JobError {}

impl From<io::Error> for JobError {
    fn from(err: io::Error) -> Self {
        JobError::Io(err)
    }
}

/// Run one job, retrying once from the top on failure. The output file is
/// recreated on retry, but engine effects of the failed run stick; a retried
/// job re-executes against whatever state the first run left behind.
async fn supervise(engine: Arc<Engine>, spec: &JobSpec, commands_per_job: usize) -> bool {
    for attempt in 0u32..2 {
        metrics::counter!(observability::JOBS_TOTAL).increment(1);
        if attempt > 0 {
            metrics::counter!(observability::JOB_RETRIES_TOTAL).increment(1);
            warn!(job = %spec.name, "retrying job from the top");
        }
        let started = Instant::now();
        let outcome = AssertUnwindSafe(run_job(&engine, spec, commands_per_job))
            .catch_unwind()
            .await;
        metrics::histogram!(observability::JOB_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        match outcome {
            Ok(Ok(())) => {
                info!(job = %spec.name, attempt, "job finished");
                return true;
            }
            Ok(Err(err)) => error!(job = %spec.name, attempt, %err, "job run failed"),
            Err(_) => error!(job = %spec.name, attempt, "job run panicked"),
        }
    }
    metrics::counter!(observability::JOBS_FAILED_TOTAL).increment(1);
    error!(job = %spec.name, "job abandoned after failed retry");
    false
}

async fn run_job(engine: &Arc<Engine>, spec: &JobSpec, commands_per_job: usize) -> Result<(), JobError> {
    let input = File::open(&spec.input).await?;
    let output = File::create(&spec.output).await?;
    let sink = Arc::new(OutputSink::new(BufWriter::new(output)));
    let pool = Arc::new(Semaphore::new(commands_per_job));
    let mut inflight: JoinSet<io::Result<()>> = JoinSet::new();

    let mut reader = BufReader::new(input);
    let mut raw = Vec::new();
    let mut line_no = 0u64;
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            break;
        }
        line_no += 1;
        // Undecodable bytes become U+FFFD and fail the parse, costing only
        // that line.
        let line = String::from_utf8_lossy(&raw);
        let cmd = match command::parse_line(&line) {
            Ok(cmd) => cmd,
            Err(err) => {
                metrics::counter!(observability::COMMANDS_REJECTED_TOTAL, "job" => spec.name.clone())
                    .increment(1);
                error!(job = %spec.name, line = line_no, %err, "skipping invalid command");
                continue;
            }
        };
        match cmd {
            Command::Empty => {}
            Command::Wait { delay_ms } => {
                debug!(job = %spec.name, delay_ms, "pausing dispatch");
                engine.wait(delay_ms).await;
            }
            Command::Barrier => drain(&mut inflight).await?,
            cmd => {
                let ticket = sink.ticket();
                let permit = pool
                    .clone()
                    .acquire_owned()
                    .await
                    .expect("command pool semaphore closed");
                let engine = Arc::clone(engine);
                let sink = Arc::clone(&sink);
                let job = spec.name.clone();
                inflight.spawn(async move {
                    let _permit = permit;
                    let text = run_command(&engine, &job, cmd).await;
                    sink.complete(ticket, text).await
                });
            }
        }
    }

    drain(&mut inflight).await?;
    sink.close().await?;
    Ok(())
}

/// Wait for every in-flight command of this job. Dropping the set on an
/// early return aborts whatever is still running; cancelled engine writes
/// roll themselves back.
async fn drain(inflight: &mut JoinSet<io::Result<()>>) -> Result<(), JobError> {
    while let Some(joined) = inflight.join_next().await {
        match joined {
            Ok(result) => result?,
            Err(_) => return Err(JobError::TaskPanicked),
        }
    }
    Ok(())
}

// ── command dispatch ────────────────────────────────────────────

/// Execute one command and render its output. Failures are logged and
/// produce no output; the job keeps going.
async fn run_command(engine: &Engine, job: &str, cmd: Command) -> String {
    let label = observability::command_label(&cmd);
    let is_reserve = matches!(cmd, Command::Reserve { .. });
    let started = Instant::now();
    let result = execute(engine, cmd).await;
    metrics::histogram!(observability::COMMAND_DURATION_SECONDS, "command" => label)
        .record(started.elapsed().as_secs_f64());
    match result {
        Ok(text) => {
            metrics::counter!(observability::COMMANDS_TOTAL, "command" => label, "status" => "ok")
                .increment(1);
            text
        }
        Err(err) => {
            metrics::counter!(observability::COMMANDS_TOTAL, "command" => label, "status" => "error")
                .increment(1);
            if is_reserve {
                metrics::counter!(
                    observability::RESERVATIONS_REJECTED_TOTAL,
                    "reason" => observability::error_label(&err)
                )
                .increment(1);
            }
            error!(job, %err, "command failed");
            String::new()
        }
    }
}

async fn execute(engine: &Engine, cmd: Command) -> Result<String, EngineError> {
    match cmd {
        Command::Create { event_id, rows, cols } => {
            engine.create(event_id, rows, cols).await.map(|()| String::new())
        }
        Command::Reserve { event_id, seats } => {
            engine.reserve(event_id, &seats).await.map(|_| String::new())
        }
        Command::Show { event_id } => engine.show(event_id).await,
        Command::List => Ok(engine.list_events().await),
        Command::Help => Ok(HELP_TEXT.to_string()),
        // The job loop handles these inline and never dispatches them.
        Command::Wait { .. } | Command::Barrier | Command::Empty => Ok(String::new()),
    }
}
