//! # Coordinator: lays the table, seats the philosophers, waits for everyone to finish.
//!
//! The [`Coordinator`] owns the [`Table`], the event [`Bus`] and the subscribers.
//! It spawns one [`PhilosopherActor`] per philosopher, waits for the stop
//! signal, cancels the runtime token and collects exactly one
//! [`ActorReport`] per philosopher.
//!
//! ## High-level architecture
//! ```text
//! run_until(stop):
//!   narration listener: Bus.subscribe() ─► SubscriberSet::emit(Event)   (until a terminal event)
//!
//!   PhilosopherId(0)   PhilosopherId(1)  ...  PhilosopherId(N-1)
//!         │                  │                      │
//!         └──► PhilosopherActor::new(id, table, params, bus)
//!                    └──► child CancellationToken = runtime_token.child_token()
//!                         set.spawn(catch_unwind(actor.run(child)))
//!
//!   stop.await
//!     └─► Bus.publish(StopRequested)
//!     └─► runtime_token.cancel()      → actors finish their current cycle
//!     └─► collect acknowledgments (bounded by Config::grace when non-zero):
//!            ├─ all N reports     → Bus.publish(AllFinished)
//!            └─ grace exceeded    → abort the rest and wait for them to unwind,
//!                                   Bus.publish(GraceExceeded)
//!     └─► wait for the listener to flush every subscriber
//! ```
//!
//! ## Rules
//! - Actors are never interrupted mid-cycle; cancellation is cooperative
//! - Reports come back sorted by philosopher id
//! - Subscribers have seen every event, including the terminal one, when `run_until` returns
//! - Every seat and chopstick is back on the table when `run_until` returns, even after the grace ran out

use std::collections::BTreeSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::actor::{ActorParams, ActorReport, PhilosopherActor};
use crate::core::builder::CoordinatorBuilder;
use crate::core::shutdown;
use crate::philosopher::PhilosopherId;
use crate::subscribers::{Ledger, Subscribe, SubscriberSet};
use crate::table::Table;
use crate::{
    config::Config,
    error::{RuntimeError, panic_info},
    events::{Bus, Event, EventKind},
};

type Acknowledgment = Result<ActorReport, RuntimeError>;

/// Runs one dinner from start to the last acknowledgment.
pub struct Coordinator {
    cfg: Config,
    table: Arc<Table>,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    ledger: Arc<Ledger>,
}

impl Coordinator {
    /// Starts building a coordinator for `cfg`.
    pub fn builder(cfg: Config) -> CoordinatorBuilder {
        CoordinatorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
        ledger: Arc<Ledger>,
    ) -> Self {
        let table = Arc::new(Table::new(cfg.seats, cfg.chopsticks));
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            table,
            bus,
            subscribers,
            ledger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The shared table, e.g. to inspect pools after the dinner.
    pub fn table(&self) -> Arc<Table> {
        Arc::clone(&self.table)
    }

    /// The event bus; subscribe before running to observe every event.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The ledger installed by the builder.
    pub fn ledger(&self) -> Arc<Ledger> {
        Arc::clone(&self.ledger)
    }

    /// Runs until stdin yields the stop byte or reaches end of input, or an OS termination signal arrives.
    pub async fn run(self) -> Result<Vec<ActorReport>, RuntimeError> {
        let stop_byte = self.cfg.stop_byte;
        self.run_until(async move {
            let cause = shutdown::wait_for_stop_signal(stop_byte).await;
            info!(?cause, "stop signal received");
        })
        .await
    }

    /// Runs until `stop` completes, then collects one report per philosopher.
    pub async fn run_until<F>(self, stop: F) -> Result<Vec<ActorReport>, RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let narration = self.narration_listener();
        let token = CancellationToken::new();
        let mut set = JoinSet::new();
        self.spawn_actors(&mut set, &token);
        info!(
            philosophers = self.cfg.philosophers,
            seats = self.cfg.seats,
            chopsticks = self.cfg.chopsticks,
            "dinner started"
        );

        stop.await;
        self.bus.publish(Event::new(EventKind::StopRequested));
        token.cancel();

        let result = self.collect(&mut set).await;
        if let Err(e) = narration.await {
            warn!(error = %e, "narration listener died");
        }
        result
    }

    /// Subscribes to the bus and forwards events to the subscribers until a terminal event.
    fn narration_listener(&self) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let subscribers = self.subscribers.clone();
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let set = SubscriberSet::new(subscribers, bus);
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        let terminal = ev.is_terminal();
                        set.emit(ev).await;
                        if terminal {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "narration fell behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        })
    }

    fn spawn_actors(&self, set: &mut JoinSet<Acknowledgment>, runtime_token: &CancellationToken) {
        let params = ActorParams {
            timing: self.cfg.timing,
            retry: self.cfg.retry,
        };
        for i in 0..self.cfg.philosophers {
            let id = PhilosopherId(i);
            let actor = PhilosopherActor::new(id, Arc::clone(&self.table), params, self.bus.clone());
            let child = runtime_token.child_token();
            set.spawn(async move {
                AssertUnwindSafe(actor.run(child))
                    .catch_unwind()
                    .await
                    .map_err(|panic| RuntimeError::ActorPanicked {
                        philosopher: id,
                        info: panic_info(&*panic),
                    })
            });
        }
    }

    /// Waits for every acknowledgment, bounded by the grace period when one is set.
    ///
    /// Publishes [`EventKind::AllFinished`] once every actor has exited, or
    /// [`EventKind::GraceExceeded`] on timeout and returns
    /// [`RuntimeError::GraceExceeded`] naming the philosophers that never answered.
    async fn collect(&self, set: &mut JoinSet<Acknowledgment>) -> Result<Vec<ActorReport>, RuntimeError> {
        let mut reports = Vec::with_capacity(self.cfg.philosophers);
        let mut answered = BTreeSet::new();
        let mut failure: Option<RuntimeError> = None;

        let drain = async {
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(Ok(report)) => {
                        debug!(philosopher = %report.philosopher, meals = report.meals, "acknowledged");
                        answered.insert(report.philosopher);
                        reports.push(report);
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, label = e.as_label(), "actor failed");
                        if let RuntimeError::ActorPanicked { philosopher, .. } = &e {
                            answered.insert(*philosopher);
                        }
                        failure.get_or_insert(e);
                    }
                    Err(e) => {
                        warn!(error = %e, "actor task lost");
                        failure.get_or_insert(RuntimeError::ActorLost {
                            reason: e.to_string(),
                        });
                    }
                }
            }
        };

        let timed_out = match self.cfg.grace_period() {
            None => {
                drain.await;
                false
            }
            Some(grace) => time::timeout(grace, drain).await.is_err(),
        };

        if timed_out {
            set.abort_all();
            // Aborted actors drop their seats and chopsticks as they unwind.
            while set.join_next().await.is_some() {}
            let grace = self.cfg.grace;
            let stuck: Vec<PhilosopherId> = (0..self.cfg.philosophers)
                .map(PhilosopherId)
                .filter(|id| !answered.contains(id))
                .collect();
            warn!(?grace, ?stuck, "grace period exceeded");
            self.bus.publish(
                Event::new(EventKind::GraceExceeded).with_reason(format!("stuck: {stuck:?}")),
            );
            return Err(RuntimeError::GraceExceeded { grace, stuck });
        }

        self.bus.publish(Event::new(EventKind::AllFinished));
        if let Some(e) = failure {
            return Err(e);
        }
        reports.sort_by_key(|r| r.philosopher);
        info!(acknowledged = reports.len(), "all philosophers finished");
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::{RetryPolicy, TimingPolicy};
    use std::time::Duration;

    fn quick(philosophers: usize) -> Config {
        let mut cfg = Config::with_philosophers(philosophers);
        cfg.timing = TimingPolicy::Fixed {
            think: Duration::from_millis(1),
            eat: Duration::from_millis(1),
            timeout: Duration::from_millis(50),
        };
        cfg.bus_capacity = 8192;
        cfg
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn collects_exactly_one_report_per_philosopher() {
        let coord = Coordinator::builder(quick(4)).build().unwrap();
        let ledger = coord.ledger();

        let reports = coord
            .run_until(time::sleep(Duration::from_millis(100)))
            .await
            .unwrap();

        let ids: Vec<_> = reports.iter().map(|r| r.philosopher).collect();
        assert_eq!(ids, (0..4).map(PhilosopherId).collect::<Vec<_>>());
        assert!(ledger.still_dining().await.is_empty());
        let eaten: u64 = reports.iter().map(|r| r.meals).sum();
        assert_eq!(ledger.total_meals().await, eaten);
    }

    #[tokio::test(start_paused = true)]
    async fn grace_exceeded_names_the_stuck() {
        let mut cfg = quick(2);
        cfg.seats = 1;
        cfg.chopsticks = 2;
        cfg.grace = Duration::from_millis(200);
        cfg.retry = RetryPolicy::Unbounded;
        let coord = Coordinator::builder(cfg).build().unwrap();
        // Nobody can ever pick up chopstick 1.
        let table = coord.table();
        let ghost = table.chopsticks().try_acquire(1).unwrap();

        let err = coord
            .run_until(time::sleep(Duration::from_millis(10)))
            .await
            .unwrap_err();

        let RuntimeError::GraceExceeded { grace, stuck } = err else {
            panic!("expected grace to run out, got {err:?}");
        };
        assert_eq!(grace, Duration::from_millis(200));
        assert_eq!(stuck, vec![PhilosopherId(0), PhilosopherId(1)]);

        // The aborted philosophers left their seat and primary behind.
        assert_eq!(table.seats().free(), 1);
        assert_eq!(table.chopsticks().available_count(), 1);
        drop(ghost);
        assert_eq!(table.chopsticks().available_count(), 2);
    }
}
