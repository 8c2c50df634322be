//! # The table: seats, chopsticks and who may reach for what.
//!
//! [`Table`] owns the two shared pools and the immutable adjacency between them:
//!
//! ```text
//!            seat s
//!        ┌─────┴─────┐
//!  primary: s mod K   secondary: (s + 1) mod K
//! ```
//!
//! Adjacency is defined over the chopstick count `K`, so seat and chopstick
//! counts may differ; with `S == K` every seat sits between its own chopstick
//! and its right-hand neighbor's.
//!
//! The table is built once by the coordinator and shared with every actor via `Arc`.

mod chopsticks;
mod seats;

pub use chopsticks::{Chopstick, ChopstickPool};
pub use seats::{SeatId, SeatRegistry};

/// Shared seats and chopsticks.
#[derive(Debug)]
pub struct Table {
    seats: SeatRegistry,
    chopsticks: ChopstickPool,
}

impl Table {
    /// Lays a table with `seats` seats and `chopsticks` chopsticks, all free.
    ///
    /// Expects a validated layout (`seats > 0`, `chopsticks >= 2`); see
    /// [`Config::validate`](crate::Config::validate).
    pub fn new(seats: usize, chopsticks: usize) -> Self {
        Self {
            seats: SeatRegistry::new(seats),
            chopsticks: ChopstickPool::new(chopsticks),
        }
    }

    pub fn seats(&self) -> &SeatRegistry {
        &self.seats
    }

    pub fn chopsticks(&self) -> &ChopstickPool {
        &self.chopsticks
    }

    /// Chopstick the occupant of `seat` picks up first.
    pub fn primary(&self, seat: usize) -> usize {
        seat % self.chopsticks.capacity()
    }

    /// Neighbor chopstick the occupant of `seat` needs as well.
    pub fn secondary(&self, seat: usize) -> usize {
        (seat + 1) % self.chopsticks.capacity()
    }
}
