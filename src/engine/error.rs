use crate::model::{EventId, Seat};

#[derive(Debug)]
pub enum EngineError {
    NotFound(EventId),
    DuplicateEvent(EventId),
    InvalidDimensions { rows: usize, cols: usize },
    OutOfBounds { event_id: EventId, seat: Seat },
    SeatTaken { event_id: EventId, seat: Seat },
    GridAllocation { event_id: EventId, rows: usize, cols: usize },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "event not found: {id}"),
            EngineError::DuplicateEvent(id) => write!(f, "event already exists: {id}"),
            EngineError::InvalidDimensions { rows, cols } => {
                write!(f, "invalid event dimensions: {rows}x{cols}")
            }
            EngineError::OutOfBounds { event_id, seat } => {
                write!(f, "seat {seat} outside the bounds of event {event_id}")
            }
            EngineError::SeatTaken { event_id, seat } => {
                write!(f, "seat {seat} already reserved on event {event_id}")
            }
            EngineError::GridAllocation { event_id, rows, cols } => {
                write!(f, "cannot allocate {rows}x{cols} seat grid for event {event_id}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
