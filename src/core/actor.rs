//! # PhilosopherActor: one diner's life cycle.
//!
//! Drives a single [`Philosopher`] through the dinner until the stop token is
//! cancelled.
//!
//! ## Cycle
//! ```text
//! loop while !token.is_cancelled() {
//!   ├─► Thinking   publish Thinking{ delay }     sleep(timing.think())
//!   ├─► Hungry     publish Hungry
//!   ├─► sit        seats.take()                  publish Seated
//!   ├─► acquire    acquire_chopsticks()
//!   │      └─ GaveUp ──► publish GaveUpSeat ──► stand
//!   │                    ──► publish RetryScheduled{ delay } ──► sleep(timing.think()) ──► sit again
//!   ├─► Eating     publish Eating{ delay }       sleep(timing.eat())
//!   ├─► put down   publish ChopsticksReleased
//!   └─► stand      publish Stood                 seats.give()
//! }
//! publish ActorFinished{ meals } ──► return ActorReport
//! ```
//!
//! ## Rules
//! - The token is checked at the top of each cycle; a cycle in progress runs to completion
//! - A philosopher that just gave up its seat also checks the token before sitting again
//! - The chopsticks put down are exactly the ones picked up from the seat of this cycle
//! - Seat and chopsticks are always back on the table before the report is returned
//! - `ChopsticksReleased` and `Stood` are published before the resources go back,
//!   so the next holder's pick-up event is always later on the bus

use std::sync::Arc;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::acquire::{Acquisition, acquire_chopsticks};
use crate::events::{Bus, Event, EventKind};
use crate::philosopher::{Philosopher, PhilosopherId, PhilosopherState};
use crate::policies::{RetryPolicy, TimingPolicy};
use crate::table::{SeatId, Table};

/// Per-actor policies, copied out of the [`Config`](crate::Config).
#[derive(Clone, Copy, Debug)]
pub struct ActorParams {
    pub timing: TimingPolicy,
    pub retry: RetryPolicy,
}

/// Acknowledgment returned by an actor once it has observed the stop signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorReport {
    pub philosopher: PhilosopherId,
    /// Meals eaten over the whole dinner.
    pub meals: u64,
    /// Acquisitions that timed out.
    pub timeouts: u64,
    /// Seats given back after the retry budget ran out.
    pub seats_given_up: u64,
}

impl ActorReport {
    fn new(philosopher: PhilosopherId) -> Self {
        Self {
            philosopher,
            meals: 0,
            timeouts: 0,
            seats_given_up: 0,
        }
    }
}

/// Runs one philosopher against a shared [`Table`].
pub struct PhilosopherActor {
    philosopher: Philosopher,
    table: Arc<Table>,
    params: ActorParams,
    bus: Bus,
}

impl PhilosopherActor {
    pub fn new(id: PhilosopherId, table: Arc<Table>, params: ActorParams, bus: Bus) -> Self {
        Self {
            philosopher: Philosopher::new(id),
            table,
            params,
            bus,
        }
    }

    /// Dines until `token` is cancelled, then acknowledges with a report.
    pub async fn run(mut self, token: CancellationToken) -> ActorReport {
        let id = self.philosopher.id();
        let mut report = ActorReport::new(id);
        self.bus
            .publish(Event::new(EventKind::ActorStarted).with_philosopher(id));

        while !token.is_cancelled() {
            self.cycle(&mut report, &token).await;
        }

        self.bus.publish(
            Event::new(EventKind::ActorFinished)
                .with_philosopher(id)
                .with_meals(report.meals),
        );
        report
    }

    /// One think, sit, eat, stand round.
    async fn cycle(&mut self, report: &mut ActorReport, token: &CancellationToken) {
        let id = self.philosopher.id();
        let timing = self.params.timing;

        self.philosopher.state = PhilosopherState::Thinking;
        let think = timing.think();
        self.bus.publish(
            Event::new(EventKind::Thinking)
                .with_philosopher(id)
                .with_delay(think),
        );
        time::sleep(think).await;

        self.philosopher.state = PhilosopherState::Hungry;
        self.bus
            .publish(Event::new(EventKind::Hungry).with_philosopher(id));

        let (seat, utensils) = loop {
            let seat = self.sit().await;
            let outcome = acquire_chopsticks(
                &self.table,
                &seat,
                id,
                &timing,
                self.params.retry,
                &self.bus,
            )
            .await;

            match outcome {
                Acquisition::Acquired { utensils, timeouts } => {
                    report.timeouts += u64::from(timeouts);
                    break (seat, utensils);
                }
                Acquisition::GaveUp { timeouts } => {
                    report.timeouts += u64::from(timeouts);
                    report.seats_given_up += 1;
                    self.bus.publish(
                        Event::new(EventKind::GaveUpSeat)
                            .with_philosopher(id)
                            .with_seat(seat.index())
                            .with_attempt(timeouts),
                    );
                    self.stand(seat);
                    if token.is_cancelled() {
                        return;
                    }
                    let pause = timing.think();
                    self.bus.publish(
                        Event::new(EventKind::RetryScheduled)
                            .with_philosopher(id)
                            .with_delay(pause)
                            .with_attempt(timeouts),
                    );
                    time::sleep(pause).await;
                }
            }
        };

        self.philosopher.state = PhilosopherState::Eating;
        report.meals += 1;
        let eat = timing.eat();
        self.bus.publish(
            Event::new(EventKind::Eating)
                .with_philosopher(id)
                .with_seat(seat.index())
                .with_delay(eat),
        );
        time::sleep(eat).await;

        self.bus.publish(
            Event::new(EventKind::ChopsticksReleased)
                .with_philosopher(id)
                .with_seat(seat.index())
                .with_chopstick(utensils.primary())
                .with_neighbor(utensils.secondary()),
        );
        utensils.put_down(self.table.chopsticks());

        self.philosopher.state = PhilosopherState::Thinking;
        self.stand(seat);
    }

    async fn sit(&mut self) -> SeatId {
        let seat = self.table.seats().take().await;
        self.philosopher.seat = Some(seat.index());
        self.bus.publish(
            Event::new(EventKind::Seated)
                .with_philosopher(self.philosopher.id())
                .with_seat(seat.index()),
        );
        seat
    }

    fn stand(&mut self, seat: SeatId) {
        self.bus.publish(
            Event::new(EventKind::Stood)
                .with_philosopher(self.philosopher.id())
                .with_seat(seat.index()),
        );
        self.philosopher.seat = None;
        self.table.seats().give(seat);
    }
}
