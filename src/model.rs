use std::fmt;

/// Event identifier from the command stream. Always positive.
pub type EventId = u32;

/// Reservation counter value; `0` marks a free seat.
pub type ReservationId = u32;

/// One seat position, 1-based in both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub row: usize,
    pub col: usize,
}

impl Seat {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// One venue: a fixed `rows x cols` seat grid plus its reservation counter.
///
/// Seats are stored row-major; a seat holds `0` when free, else the id of
/// the reservation that claimed it. Mutation happens only under the event's
/// own lock (see the engine), so the struct itself carries no synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub rows: usize,
    pub cols: usize,
    /// Monotonically increasing; bumped once per fully successful reservation.
    pub reservations: ReservationId,
    seats: Vec<ReservationId>,
}

impl Event {
    /// Build an event with a zero-filled grid. Returns `None` when the grid
    /// is unallocatable: `rows * cols` overflows or the allocator refuses
    /// the buffer. Dimension validation (non-zero) is the store's job.
    pub fn try_new(id: EventId, rows: usize, cols: usize) -> Option<Self> {
        let seat_count = rows.checked_mul(cols)?;
        let mut seats = Vec::new();
        seats.try_reserve_exact(seat_count).ok()?;
        seats.resize(seat_count, 0);
        Some(Self {
            id,
            rows,
            cols,
            reservations: 0,
            seats,
        })
    }

    /// True when `seat` lies within `[1, rows] x [1, cols]`.
    pub fn in_bounds(&self, seat: Seat) -> bool {
        (1..=self.rows).contains(&seat.row) && (1..=self.cols).contains(&seat.col)
    }

    fn seat_index(&self, seat: Seat) -> usize {
        debug_assert!(self.in_bounds(seat), "seat {seat} outside grid");
        (seat.row - 1) * self.cols + (seat.col - 1)
    }

    /// Current value of a seat. Caller must have bounds-checked `seat`.
    pub fn seat(&self, seat: Seat) -> ReservationId {
        self.seats[self.seat_index(seat)]
    }

    /// Overwrite a seat. Caller must have bounds-checked `seat`.
    pub fn set_seat(&mut self, seat: Seat, value: ReservationId) {
        let idx = self.seat_index(seat);
        self.seats[idx] = value;
    }

    /// Row-major snapshot of the grid, for invariant checks in tests.
    pub fn seats(&self) -> &[ReservationId] {
        &self.seats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_starts_free() {
        let event = Event::try_new(1, 3, 4).unwrap();
        assert_eq!(event.reservations, 0);
        assert_eq!(event.seats().len(), 12);
        assert!(event.seats().iter().all(|&s| s == 0));
    }

    #[test]
    fn seat_addressing_is_row_major() {
        let mut event = Event::try_new(1, 2, 3).unwrap();
        event.set_seat(Seat::new(1, 1), 7);
        event.set_seat(Seat::new(1, 3), 8);
        event.set_seat(Seat::new(2, 1), 9);
        assert_eq!(event.seats(), &[7, 0, 8, 9, 0, 0]);
        assert_eq!(event.seat(Seat::new(1, 3)), 8);
        assert_eq!(event.seat(Seat::new(2, 1)), 9);
    }

    #[test]
    fn bounds_are_one_based_inclusive() {
        let event = Event::try_new(1, 2, 2).unwrap();
        assert!(event.in_bounds(Seat::new(1, 1)));
        assert!(event.in_bounds(Seat::new(2, 2)));
        assert!(!event.in_bounds(Seat::new(0, 1)));
        assert!(!event.in_bounds(Seat::new(1, 0)));
        assert!(!event.in_bounds(Seat::new(3, 2)));
        assert!(!event.in_bounds(Seat::new(2, 3)));
    }

    #[test]
    fn single_row_and_single_col_grids() {
        let row = Event::try_new(1, 1, 5).unwrap();
        assert!(row.in_bounds(Seat::new(1, 5)));
        assert!(!row.in_bounds(Seat::new(2, 1)));

        let col = Event::try_new(2, 5, 1).unwrap();
        assert!(col.in_bounds(Seat::new(5, 1)));
        assert!(!col.in_bounds(Seat::new(1, 2)));
    }

    #[test]
    fn overflowing_grid_is_rejected() {
        assert!(Event::try_new(1, usize::MAX, 2).is_none());
    }

    #[test]
    fn seat_display_matches_command_syntax() {
        assert_eq!(Seat::new(3, 12).to_string(), "(3,12)");
    }
}
