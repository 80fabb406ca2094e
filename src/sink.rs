use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{self, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;

/// Per-job output sink.
///
/// Commands from one job file may finish out of order, but the job's output
/// file must read as if they ran sequentially. The sink hands out tickets in
/// issue order and buffers each completion until every earlier ticket has
/// been delivered, then writes the contiguous run in one go. Commands with
/// no output complete with an empty string, which advances the run without
/// writing anything.
pub struct OutputSink<W> {
    next_ticket: AtomicU64,
    inner: Mutex<SinkInner<W>>,
}

struct SinkInner<W> {
    /// Ticket the writer is waiting on. Everything below it is on disk.
    next_write: u64,
    pending: BTreeMap<u64, String>,
    writer: W,
}

impl<W: AsyncWrite + Unpin> OutputSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            next_ticket: AtomicU64::new(0),
            inner: Mutex::new(SinkInner {
                next_write: 0,
                pending: BTreeMap::new(),
                writer,
            }),
        }
    }

    /// Claim the next slot in the output order. Must be called in command
    /// issue order; the job loop is sequential so this holds by construction.
    pub fn ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    /// Deliver the output for `ticket`, flushing as much of the pending run
    /// as this completion unblocks.
    pub async fn complete(&self, ticket: u64, text: String) -> io::Result<()> {
        let mut inner = self.inner.lock().await;
        let state = &mut *inner;
        state.pending.insert(ticket, text);
        while let Some(text) = state.pending.remove(&state.next_write) {
            if !text.is_empty() {
                state.writer.write_all(text.as_bytes()).await?;
            }
            state.next_write += 1;
        }
        Ok(())
    }

    /// Flush and shut down the writer. Call only after every issued ticket
    /// has completed; stragglers are dropped with a warning.
    pub async fn close(&self) -> io::Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.pending.is_empty() {
            warn!(undelivered = inner.pending.len(), "closing sink with buffered output");
        }
        let state = &mut *inner;
        state.writer.flush().await?;
        state.writer.shutdown().await?;
        Ok(())
    }
}
