//! # Dinner configuration.
//!
//! Provides [`Config`], the single place where the table layout, timing and
//! shutdown behavior are decided. The coordinator builder validates it before
//! anything is spawned.
//!
//! ## Sentinel values
//! - `grace = 0s` → wait for every philosopher indefinitely after the stop signal
//! - `bus_capacity` is clamped to a minimum of 1

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::{RetryPolicy, TimingPolicy};

/// Global configuration for one dinner.
///
/// ## Field semantics
/// - `philosophers`: number of actors to spawn (`> 0`)
/// - `seats`: seat identifiers handed out by the registry (`> 0`)
/// - `chopsticks`: chopsticks on the table (`>= 2`); adjacency is computed over this count
/// - `timing`: think/eat/timeout durations
/// - `retry`: what to do after repeated acquisition timeouts
/// - `grace`: maximum wait for acknowledgments after the stop signal (`0s` = unbounded)
/// - `bus_capacity`: event bus ring buffer size
/// - `stop_byte`: stdin byte that stops the dinner
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of philosophers.
    pub philosophers: usize,
    /// Number of seats.
    pub seats: usize,
    /// Number of chopsticks.
    pub chopsticks: usize,
    /// Think/eat/timeout durations.
    pub timing: TimingPolicy,
    /// Retry behavior after a timed-out acquisition.
    pub retry: RetryPolicy,
    /// Shutdown grace period (`Duration::ZERO` = unbounded).
    pub grace: Duration,
    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,
    /// Byte read from stdin that requests shutdown.
    pub stop_byte: u8,
}

impl Config {
    /// Returns a config for `philosophers` diners with every other field defaulted.
    pub fn with_philosophers(philosophers: usize) -> Self {
        Self {
            philosophers,
            ..Self::default()
        }
    }

    /// Returns the shutdown grace period as an `Option`.
    ///
    /// - `None` → wait indefinitely
    /// - `Some(d)` → give up after `d`
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks that the table can be laid out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.philosophers == 0 {
            return Err(ConfigError::NoPhilosophers);
        }
        if self.seats == 0 {
            return Err(ConfigError::NoSeats);
        }
        if self.chopsticks < 2 {
            return Err(ConfigError::TooFewChopsticks {
                got: self.chopsticks,
            });
        }
        if let TimingPolicy::Random { quantum } = self.timing {
            if quantum.is_zero() {
                return Err(ConfigError::ZeroQuantum);
            }
        }
        if self.retry == RetryPolicy::StandAfter(0) {
            return Err(ConfigError::ZeroRetryBudget);
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `philosophers = 5`, `seats = 5`, `chopsticks = 5`
    /// - `timing = TimingPolicy::default()` (random, 2s quantum)
    /// - `retry = RetryPolicy::Unbounded`
    /// - `grace = 0s` (unbounded)
    /// - `bus_capacity = 1024`
    /// - `stop_byte = b'n'`
    fn default() -> Self {
        Self {
            philosophers: 5,
            seats: 5,
            chopsticks: 5,
            timing: TimingPolicy::default(),
            retry: RetryPolicy::default(),
            grace: Duration::ZERO,
            bus_capacity: 1024,
            stop_byte: b'n',
        }
    }
}
