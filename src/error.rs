//! Error types used by the dinnervisor runtime.
//!
//! This module defines two error enums:
//!
//! - [`ConfigError`]: the table cannot be laid out as requested; raised before any actor is spawned.
//! - [`RuntimeError`]: the coordinator could not collect a clean acknowledgment from every actor.
//!
//! Contention is absent from both: a philosopher that cannot get its second
//! chopstick in time backs off and retries, and nothing surfaces to a caller.

use std::time::Duration;
use thiserror::Error;

use crate::philosopher::PhilosopherId;

/// # Errors produced while validating a [`Config`](crate::Config).
///
/// All of these are fatal: the dinner never starts.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one philosopher is required.
    #[error("philosopher count must be a positive integer")]
    NoPhilosophers,

    /// At least one seat is required.
    #[error("seat count must be a positive integer")]
    NoSeats,

    /// A seat needs two distinct chopsticks.
    #[error("at least two chopsticks are required, got {got}")]
    TooFewChopsticks {
        /// The configured chopstick count.
        got: usize,
    },

    /// Random timing needs a non-zero quantum.
    #[error("timing quantum must be greater than zero")]
    ZeroQuantum,

    /// `RetryPolicy::StandAfter(0)` would stand up before ever trying.
    #[error("retry budget must be greater than zero")]
    ZeroRetryBudget,

    /// The stop signal is matched byte-wise on stdin.
    #[error("stop key {key:?} is not a single ASCII character")]
    StopKeyNotAscii {
        /// The rejected key.
        key: char,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use dinnervisor::ConfigError;
    ///
    /// let err = ConfigError::TooFewChopsticks { got: 1 };
    /// assert_eq!(err.as_label(), "config_too_few_chopsticks");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::NoPhilosophers => "config_no_philosophers",
            ConfigError::NoSeats => "config_no_seats",
            ConfigError::TooFewChopsticks { .. } => "config_too_few_chopsticks",
            ConfigError::ZeroQuantum => "config_zero_quantum",
            ConfigError::ZeroRetryBudget => "config_zero_retry_budget",
            ConfigError::StopKeyNotAscii { .. } => "config_stop_key_not_ascii",
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_info(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// # Errors produced by the coordinator while winding the dinner down.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some philosophers never acknowledged.
    #[error("shutdown grace {grace:?} exceeded; still dining: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Philosophers that did not acknowledge in time.
        stuck: Vec<PhilosopherId>,
    },

    /// A philosopher's actor panicked instead of acknowledging.
    #[error("philosopher {philosopher} panicked: {info}")]
    ActorPanicked {
        /// The philosopher whose actor died.
        philosopher: PhilosopherId,
        /// Panic payload, if it was a string.
        info: String,
    },

    /// An actor task was torn down by the runtime before it could acknowledge.
    #[error("actor task lost: {reason}")]
    ActorLost {
        /// Join error description.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use dinnervisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::ActorPanicked { .. } => "runtime_actor_panicked",
            RuntimeError::ActorLost { .. } => "runtime_actor_lost",
        }
    }
}
