//! # Retry policies for chopstick acquisition.
//!
//! [`RetryPolicy`] determines what a seated philosopher does after its attempt to
//! pick up the secondary chopstick has timed out.
//!
//! - [`RetryPolicy::Unbounded`] put the primary down, think, try again from the same seat (default).
//! - [`RetryPolicy::StandAfter`] same, but after `n` consecutive timeouts give the seat back
//!   and go looking for another one.
//!
//! ```text
//! RetryPolicy::Unbounded      → timeout → think → retry (same seat, forever)
//! RetryPolicy::StandAfter(3)  → timeout ×3 → stand up → still hungry → sit again
//! ```

/// Policy controlling how long a philosopher keeps retrying from one seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry from the same seat until both chopsticks are held.
    Unbounded,
    /// Give the seat back after this many consecutive timeouts.
    StandAfter(u32),
}

impl Default for RetryPolicy {
    /// Returns [`RetryPolicy::Unbounded`].
    fn default() -> Self {
        RetryPolicy::Unbounded
    }
}

impl RetryPolicy {
    /// Returns `true` if a philosopher that has timed out `timeouts` times in a row should stand up.
    pub fn should_stand(&self, timeouts: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => false,
            RetryPolicy::StandAfter(limit) => timeouts >= *limit,
        }
    }
}
