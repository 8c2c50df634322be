//! # Runtime events emitted by philosophers and the coordinator.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Cycle events**: one per state transition of a philosopher (thinking, hungry, seated, ...)
//! - **Contention events**: a timed-out acquisition and the retry it schedules
//! - **Runtime events**: actor start/finish, stop requested, all finished, subscriber trouble
//!
//! The [`Event`] struct carries the metadata: philosopher, seat, chopsticks, delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use dinnervisor::{Event, EventKind, PhilosopherId};
//!
//! let ev = Event::new(EventKind::AcquireTimedOut)
//!     .with_philosopher(PhilosopherId(2))
//!     .with_seat(4)
//!     .with_chopstick(4)
//!     .with_timeout(Duration::from_millis(2500))
//!     .with_attempt(1);
//!
//! assert_eq!(ev.kind, EventKind::AcquireTimedOut);
//! assert_eq!(ev.philosopher, Some(PhilosopherId(2)));
//! assert_eq!(ev.timeout_ms, Some(2500));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::philosopher::PhilosopherId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Runtime events ===
    /// Actor spawned and about to start its first cycle.
    ///
    /// Sets:
    /// - `philosopher`
    ActorStarted,

    /// Actor observed the stop signal and is acknowledging.
    ///
    /// Sets:
    /// - `philosopher`
    /// - `meals`: meals eaten over the whole dinner
    ActorFinished,

    /// Stop signal observed by the coordinator.
    StopRequested,

    /// Every philosopher acknowledged the stop signal.
    AllFinished,

    /// Grace period exceeded; some philosophers did not acknowledge in time.
    GraceExceeded,

    // === Cycle events ===
    /// Philosopher started thinking.
    ///
    /// Sets:
    /// - `philosopher`
    /// - `delay_ms`: planned thinking time
    Thinking,

    /// Philosopher got hungry and is looking for a seat.
    ///
    /// Sets:
    /// - `philosopher`
    Hungry,

    /// Philosopher took a seat.
    ///
    /// Sets:
    /// - `philosopher`
    /// - `seat`
    Seated,

    /// Primary chopstick picked up.
    ///
    /// Sets:
    /// - `philosopher`, `seat`
    /// - `chopstick`: primary index
    PrimaryPickedUp,

    /// Secondary chopstick picked up; the philosopher now holds both.
    ///
    /// Sets:
    /// - `philosopher`, `seat`
    /// - `chopstick`: primary index
    /// - `neighbor`: secondary index
    SecondaryPickedUp,

    /// Philosopher started eating.
    ///
    /// Sets:
    /// - `philosopher`, `seat`
    /// - `delay_ms`: planned eating time
    Eating,

    /// Both chopsticks returned to the table after eating.
    ///
    /// Sets:
    /// - `philosopher`, `seat`
    /// - `chopstick`, `neighbor`
    ChopsticksReleased,

    /// Philosopher gave its seat back.
    ///
    /// Sets:
    /// - `philosopher`
    /// - `seat`
    Stood,

    // === Contention events ===
    /// The secondary chopstick did not come in time; the primary was put down.
    ///
    /// Sets:
    /// - `philosopher`, `seat`
    /// - `chopstick`: primary index (just released)
    /// - `neighbor`: secondary index (never obtained)
    /// - `timeout_ms`: the timer that fired
    /// - `attempt`: consecutive timeouts from this seat (1-based)
    AcquireTimedOut,

    /// Philosopher thinks before retrying the acquisition.
    ///
    /// Sets:
    /// - `philosopher`, `seat`
    /// - `delay_ms`: thinking time before the next attempt
    /// - `attempt`: consecutive timeouts so far
    RetryScheduled,

    /// Retry budget exhausted; the philosopher stands up and stays hungry.
    ///
    /// Sets:
    /// - `philosopher`, `seat`
    /// - `attempt`: consecutive timeouts from this seat
    GaveUpSeat,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Philosopher concerned, if any.
    pub philosopher: Option<PhilosopherId>,
    /// Seat index.
    pub seat: Option<usize>,
    /// Primary chopstick index.
    pub chopstick: Option<usize>,
    /// Secondary chopstick index.
    pub neighbor: Option<usize>,
    /// Think/eat/retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Acquisition timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Consecutive timeout count.
    pub attempt: Option<u32>,
    /// Meals eaten.
    pub meals: Option<u64>,
    /// Subscriber name (subscriber events only).
    pub subscriber: Option<&'static str>,
    /// Human-readable reason (panics, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            philosopher: None,
            seat: None,
            chopstick: None,
            neighbor: None,
            delay_ms: None,
            timeout_ms: None,
            attempt: None,
            meals: None,
            subscriber: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_philosopher(mut self, id: PhilosopherId) -> Self {
        self.philosopher = Some(id);
        self
    }

    #[inline]
    pub fn with_seat(mut self, seat: usize) -> Self {
        self.seat = Some(seat);
        self
    }

    #[inline]
    pub fn with_chopstick(mut self, index: usize) -> Self {
        self.chopstick = Some(index);
        self
    }

    #[inline]
    pub fn with_neighbor(mut self, index: usize) -> Self {
        self.neighbor = Some(index);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    #[inline]
    pub fn with_meals(mut self, n: u64) -> Self {
        self.meals = Some(n);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow).with_reason(reason);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Returns `true` for events after which the coordinator publishes nothing more.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::AllFinished | EventKind::GraceExceeded)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::Hungry);
        let b = Event::new(EventKind::Hungry);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn huge_delays_saturate() {
        let ev = Event::new(EventKind::Thinking).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn subscriber_events_carry_name() {
        let ev = Event::subscriber_overflow("narrator", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.subscriber, Some("narrator"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
        assert!(!ev.is_terminal());
        assert!(Event::new(EventKind::AllFinished).is_terminal());
    }
}
