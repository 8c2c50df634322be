//! # Chopstick acquisition with a randomized stall timeout.
//!
//! A seated philosopher needs the two chopsticks adjacent to its seat. The
//! primary is waited for without limit; the secondary is raced against a timer
//! drawn from the [`TimingPolicy`]. Losing the race means the neighbor is
//! probably waiting on us, so the primary goes back on the table, the
//! philosopher thinks for a while and tries again.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► acquire(primary)                      (unbounded)
//!   ├─► publish PrimaryPickedUp
//!   ├─► timeout(timing.timeout(), acquire(secondary))
//!   │       ├─ Ok   ──► publish SecondaryPickedUp ──► return Acquired
//!   │       └─ Err  ──► publish AcquireTimedOut{ attempt }
//!   │                   release(primary)
//!   │                   ├─ retry.should_stand() ──► return GaveUp
//!   │                   ├─ publish RetryScheduled{ delay }
//!   │                   └─ sleep(timing.think())
//! }
//! ```
//!
//! ## Rules
//! - The primary is never held across a think delay
//! - Retry is a loop; a stalled philosopher never grows the stack
//! - Contention never surfaces as an error
//! - A release is published before the chopstick goes back, so on the bus every
//!   pick-up of a chopstick follows the release of its previous holder

use tokio::time;

use crate::events::{Bus, Event, EventKind};
use crate::philosopher::PhilosopherId;
use crate::policies::{RetryPolicy, TimingPolicy};
use crate::table::{Chopstick, ChopstickPool, SeatId, Table};

/// Both chopsticks of one seat, held together.
#[derive(Debug)]
#[must_use = "dropping utensils puts both chopsticks back on the table"]
pub struct Utensils {
    primary: Chopstick,
    secondary: Chopstick,
}

impl Utensils {
    pub fn primary(&self) -> usize {
        self.primary.index()
    }

    pub fn secondary(&self) -> usize {
        self.secondary.index()
    }

    /// Returns both chopsticks to `pool`, primary first.
    pub(crate) fn put_down(self, pool: &ChopstickPool) {
        pool.release(self.primary);
        pool.release(self.secondary);
    }
}

/// Outcome of [`acquire_chopsticks`].
#[derive(Debug)]
pub enum Acquisition {
    /// Both chopsticks are held.
    Acquired {
        utensils: Utensils,
        /// Timeouts suffered before succeeding.
        timeouts: u32,
    },
    /// The retry budget ran out; nothing is held.
    GaveUp {
        /// Consecutive timeouts from this seat.
        timeouts: u32,
    },
}

/// Acquires both chopsticks adjacent to `seat` for philosopher `who`.
///
/// Returns only once both are held, or when `retry` says to stand up.
pub async fn acquire_chopsticks(
    table: &Table,
    seat: &SeatId,
    who: PhilosopherId,
    timing: &TimingPolicy,
    retry: RetryPolicy,
    bus: &Bus,
) -> Acquisition {
    let pool = table.chopsticks();
    let seat = seat.index();
    let (first, second) = (table.primary(seat), table.secondary(seat));
    let mut timeouts: u32 = 0;

    loop {
        let primary = pool.acquire(first).await;
        bus.publish(
            Event::new(EventKind::PrimaryPickedUp)
                .with_philosopher(who)
                .with_seat(seat)
                .with_chopstick(first),
        );

        let wait = timing.timeout();
        match time::timeout(wait, pool.acquire(second)).await {
            Ok(secondary) => {
                bus.publish(
                    Event::new(EventKind::SecondaryPickedUp)
                        .with_philosopher(who)
                        .with_seat(seat)
                        .with_chopstick(first)
                        .with_neighbor(second),
                );
                return Acquisition::Acquired {
                    utensils: Utensils { primary, secondary },
                    timeouts,
                };
            }
            Err(_elapsed) => {
                timeouts = timeouts.saturating_add(1);
                bus.publish(
                    Event::new(EventKind::AcquireTimedOut)
                        .with_philosopher(who)
                        .with_seat(seat)
                        .with_chopstick(first)
                        .with_neighbor(second)
                        .with_timeout(wait)
                        .with_attempt(timeouts),
                );
                pool.release(primary);

                if retry.should_stand(timeouts) {
                    return Acquisition::GaveUp { timeouts };
                }

                let pause = timing.think();
                bus.publish(
                    Event::new(EventKind::RetryScheduled)
                        .with_philosopher(who)
                        .with_seat(seat)
                        .with_delay(pause)
                        .with_attempt(timeouts),
                );
                time::sleep(pause).await;
            }
        }
    }
}
