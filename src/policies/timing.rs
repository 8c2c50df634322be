//! # Timing policy for thinking, eating and acquisition timeouts.
//!
//! [`TimingPolicy`] decides how long a philosopher thinks, how long it eats,
//! and how long it waits for its second chopstick before giving the first one back.
//!
//! - [`TimingPolicy::Random`]: everything is drawn from one `quantum`:
//!   think and eat in `[0, quantum)`, timeout in `[quantum, 2·quantum)`
//! - [`TimingPolicy::Fixed`]: exact durations, for reproducible runs and tests
//!
//! Timeouts differ from one attempt to the next; equal timeouts would let a full
//! table put its chopsticks down and pick them up again in lockstep.

use rand::Rng;
use std::time::Duration;

/// Default base time unit.
pub const DEFAULT_QUANTUM: Duration = Duration::from_secs(2);

/// Policy producing think/eat/timeout durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingPolicy {
    /// Durations drawn uniformly from one quantum.
    ///
    /// - think: `[0, quantum)`
    /// - eat: `[0, quantum)`
    /// - timeout: `[quantum, 2·quantum)`
    Random {
        /// Base time unit.
        quantum: Duration,
    },

    /// Exact durations.
    ///
    /// Use when:
    /// - Deterministic timing is required
    /// - Testing/debugging
    Fixed {
        /// Time spent thinking (also the delay before a retry).
        think: Duration,
        /// Time spent eating.
        eat: Duration,
        /// Wait for the second chopstick.
        timeout: Duration,
    },
}

impl Default for TimingPolicy {
    /// Returns [`TimingPolicy::Random`] with a 2s quantum.
    fn default() -> Self {
        TimingPolicy::Random {
            quantum: DEFAULT_QUANTUM,
        }
    }
}

impl TimingPolicy {
    /// Shorthand for [`TimingPolicy::Random`].
    pub fn random(quantum: Duration) -> Self {
        TimingPolicy::Random { quantum }
    }

    /// How long to think.
    pub fn think(&self) -> Duration {
        match self {
            TimingPolicy::Random { quantum } => below(*quantum),
            TimingPolicy::Fixed { think, .. } => *think,
        }
    }

    /// How long to eat.
    pub fn eat(&self) -> Duration {
        match self {
            TimingPolicy::Random { quantum } => below(*quantum),
            TimingPolicy::Fixed { eat, .. } => *eat,
        }
    }

    /// How long to wait for the secondary chopstick.
    pub fn timeout(&self) -> Duration {
        match self {
            TimingPolicy::Random { quantum } => quantum.saturating_add(below(*quantum)),
            TimingPolicy::Fixed { timeout, .. } => *timeout,
        }
    }
}

/// Uniform in `[0, bound)`; zero when `bound` is zero.
fn below(bound: Duration) -> Duration {
    let ns = u64::try_from(bound.as_nanos()).unwrap_or(u64::MAX);
    if ns == 0 {
        return Duration::ZERO;
    }
    let mut rng = rand::rng();
    Duration::from_nanos(rng.random_range(0..ns))
}
