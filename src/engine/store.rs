use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

use crate::model::{Event, EventId};

use super::EngineError;

pub type SharedEvent = Arc<RwLock<Event>>;

/// In-memory event store.
///
/// Lookup goes through the concurrent map with no store-wide lock; structural
/// mutation (`create`) and the enumeration order serialize on `order`. A
/// create therefore never blocks on reservations running inside existing
/// events, and reservations never wait for a create.
pub struct EventStore {
    events: DashMap<EventId, SharedEvent>,
    /// Ids in creation order; doubles as the store-level structural lock.
    order: Mutex<Vec<EventId>>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    /// Insert a fresh zero-filled event. Ids are never reused: an id, once
    /// inserted, stays for the lifetime of the store. An existing id is
    /// reported before dimension validation.
    pub async fn create(&self, id: EventId, rows: usize, cols: usize) -> Result<(), EngineError> {
        let mut order = self.order.lock().await;
        if self.events.contains_key(&id) {
            return Err(EngineError::DuplicateEvent(id));
        }
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidDimensions { rows, cols });
        }
        let event = Event::try_new(id, rows, cols).ok_or(EngineError::GridAllocation {
            event_id: id,
            rows,
            cols,
        })?;
        self.events.insert(id, Arc::new(RwLock::new(event)));
        order.push(id);
        Ok(())
    }

    /// Shared handle to one event, or `None`. Takes no store-level lock.
    pub fn get(&self, id: EventId) -> Option<SharedEvent> {
        self.events.get(&id).map(|e| e.value().clone())
    }

    /// Snapshot of event ids in creation order; empty when no events exist.
    /// Callers may walk the snapshot any number of times.
    pub async fn ids(&self) -> Vec<EventId> {
        self.order.lock().await.clone()
    }
}
