mod error;
mod store;

pub use error::EngineError;
pub use store::{EventStore, SharedEvent};

use tokio::sync::RwLockWriteGuard;

use crate::delay::DelaySim;
use crate::model::{Event, EventId, ReservationId, Seat};

/// The reservation engine: atomic multi-seat reservation and read operations
/// on top of the event store, with simulated access latency on every event
/// lookup and every individual seat touch.
///
/// Locking discipline: the store serializes structural changes internally;
/// each event carries its own `RwLock`. `reserve` holds the event's write
/// lock for the whole call, so at most one reservation is in flight per
/// event even though the injected per-seat delays stretch the critical
/// section. `show` holds the read lock while rendering.
pub struct Engine {
    store: EventStore,
    delay: DelaySim,
}

impl Engine {
    pub fn new(access_delay_ms: u64) -> Self {
        Self {
            store: EventStore::new(),
            delay: DelaySim::from_ms(access_delay_ms),
        }
    }

    /// Event lookup preceded by the simulated access delay. The sleep runs
    /// before any lock is taken.
    async fn event_with_delay(&self, id: EventId) -> Result<SharedEvent, EngineError> {
        self.delay.access().await;
        self.store.get(id).ok_or(EngineError::NotFound(id))
    }

    pub async fn create(&self, id: EventId, rows: usize, cols: usize) -> Result<(), EngineError> {
        // The duplicate probe counts as a storage access, like any lookup.
        self.delay.access().await;
        self.store.create(id, rows, cols).await
    }

    /// Reserve `seats` atomically. Either every listed seat ends up marked
    /// with one new reservation id, or the grid is left exactly as it was:
    /// on the first failing seat all tentative marks from this call are
    /// released and the counter stays untouched. Listing a seat twice fails
    /// the call, since the first tentative mark makes the second occurrence
    /// read as taken. A call cancelled at an await point releases its marks
    /// before the write lock drops.
    pub async fn reserve(
        &self,
        id: EventId,
        seats: &[Seat],
    ) -> Result<ReservationId, EngineError> {
        let event = self.event_with_delay(id).await?;
        let grid = event.write().await;

        let reservation = grid.reservations + 1;
        let mut tentative = TentativeMarks { grid, seats, marked: 0 };
        let mut failed = None;

        for &seat in seats {
            if !tentative.grid.in_bounds(seat) {
                failed = Some(EngineError::OutOfBounds { event_id: id, seat });
                break;
            }
            self.delay.access().await;
            if tentative.grid.seat(seat) != 0 {
                failed = Some(EngineError::SeatTaken { event_id: id, seat });
                break;
            }
            self.delay.access().await;
            tentative.grid.set_seat(seat, reservation);
            tentative.marked += 1;
        }

        if let Some(err) = failed {
            // Release in reverse marking order; each release is a seat
            // write and pays the access delay like any other.
            while tentative.marked > 0 {
                self.delay.access().await;
                tentative.release_last();
            }
            return Err(err);
        }

        tentative.commit(reservation);
        Ok(reservation)
    }

    /// Render the grid: `rows` lines of `cols` seat values, single-space
    /// separated. Holds the event's read lock for the whole rendering.
    pub async fn show(&self, id: EventId) -> Result<String, EngineError> {
        let event = self.event_with_delay(id).await?;
        let grid = event.read().await;

        let mut out = String::new();
        for row in 1..=grid.rows {
            for col in 1..=grid.cols {
                self.delay.access().await;
                out.push_str(&grid.seat(Seat::new(row, col)).to_string());
                if col < grid.cols {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        Ok(out)
    }

    /// One `Event: <id>` line per event in creation order, or `No events`.
    pub async fn list_events(&self) -> String {
        let ids = self.store.ids().await;
        if ids.is_empty() {
            return "No events\n".to_string();
        }
        ids.iter().map(|id| format!("Event: {id}\n")).collect()
    }

    /// Pure suspension of the calling task; no store interaction.
    pub async fn wait(&self, delay_ms: u64) {
        DelaySim::wait_ms(delay_ms).await;
    }
}

/// A reservation in progress under the event's write lock. Seats in
/// `seats[..marked]` carry a tentative id the event counter has not reached
/// yet. Dropping the guard releases those marks, so a call cancelled at an
/// await point leaves the grid as it found it.
struct TentativeMarks<'a> {
    grid: RwLockWriteGuard<'a, Event>,
    seats: &'a [Seat],
    marked: usize,
}

impl TentativeMarks<'_> {
    fn release_last(&mut self) {
        self.marked -= 1;
        let seat = self.seats[self.marked];
        self.grid.set_seat(seat, 0);
    }

    /// Make the marks permanent and bump the event counter.
    fn commit(mut self, reservation: ReservationId) {
        self.grid.reservations = reservation;
        self.marked = 0;
    }
}

impl Drop for TentativeMarks<'_> {
    fn drop(&mut self) {
        while self.marked > 0 {
            self.release_last();
        }
    }
}
