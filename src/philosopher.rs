//! # Philosopher identity and observable state.
//!
//! A [`Philosopher`] is the data half of an actor: a stable id, the seat it
//! currently occupies (if any) and what it is doing. Only the owning actor
//! mutates it.

use std::fmt;

/// Stable identifier of a philosopher, unique for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhilosopherId(pub usize);

impl fmt::Display for PhilosopherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a philosopher is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhilosopherState {
    /// Not interested in food.
    Thinking,
    /// Looking for a seat or for chopsticks.
    Hungry,
    /// Holding both chopsticks.
    Eating,
}

/// One diner.
///
/// ### Invariant
/// `seat` is `Some` only between a successful sit and the following stand.
#[derive(Debug)]
pub struct Philosopher {
    id: PhilosopherId,
    pub(crate) seat: Option<usize>,
    pub(crate) state: PhilosopherState,
}

impl Philosopher {
    /// Creates a thinking, standing philosopher.
    pub fn new(id: PhilosopherId) -> Self {
        Self {
            id,
            seat: None,
            state: PhilosopherState::Thinking,
        }
    }

    pub fn id(&self) -> PhilosopherId {
        self.id
    }

    /// Index of the occupied seat, `None` when standing.
    pub fn seat(&self) -> Option<usize> {
        self.seat
    }

    pub fn state(&self) -> PhilosopherState {
        self.state
    }
}
