//! # Dinner ledger with sequence-based ordering.
//!
//! Keeps a per-philosopher tally (meals, timeouts, whether it is still at the
//! dinner) built from the event stream. The coordinator always installs one;
//! read it through [`Coordinator::ledger`](crate::Coordinator::ledger) after the
//! dinner. Philosophers named in `GraceExceeded` come from the coordinator's own
//! acknowledgments, not from the ledger.
//!
//! ## Rules
//! - `ActorStarted` marks a philosopher present; `ActorFinished` marks it gone
//! - `Eating` counts a meal, `AcquireTimedOut` counts a timeout
//! - Reads are **eventually consistent** while the dinner runs (events arrive through a queue)
//! - Delivery is lossless, so once `run_until` returns the ledger has applied every narrated event
//! - Presence changes older than the last one applied (`seq < last_seq`) are **rejected**

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::philosopher::PhilosopherId;
use crate::subscribers::{Delivery, Subscribe};

/// Per-philosopher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Meals started.
    pub meals: u64,
    /// Acquisition attempts that timed out.
    pub timeouts: u64,
    /// Seats given up after exhausting the retry budget.
    pub seats_given_up: u64,
    /// `true` between `ActorStarted` and `ActorFinished`.
    pub dining: bool,
    last_seq: u64,
}

/// Thread-safe tally of the whole dinner.
#[derive(Default)]
pub struct Ledger {
    state: RwLock<BTreeMap<PhilosopherId, Tally>>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event; returns `true` if it changed the ledger.
    pub async fn update(&self, ev: &Event) -> bool {
        let Some(id) = ev.philosopher else {
            return false;
        };

        let mut state = self.state.write().await;
        let tally = state.entry(id).or_default();
        match ev.kind {
            EventKind::ActorStarted | EventKind::ActorFinished => {
                if ev.seq < tally.last_seq {
                    return false;
                }
                tally.last_seq = ev.seq;
                tally.dining = ev.kind == EventKind::ActorStarted;
                true
            }
            EventKind::Eating => {
                tally.meals += 1;
                true
            }
            EventKind::AcquireTimedOut => {
                tally.timeouts += 1;
                true
            }
            EventKind::GaveUpSeat => {
                tally.seats_given_up += 1;
                true
            }
            _ => false,
        }
    }

    /// Returns the tally of one philosopher.
    pub async fn tally(&self, id: PhilosopherId) -> Option<Tally> {
        self.state.read().await.get(&id).copied()
    }

    /// Returns every philosopher that started and has not finished, sorted by id.
    pub async fn still_dining(&self) -> Vec<PhilosopherId> {
        self.state
            .read()
            .await
            .iter()
            .filter(|(_, t)| t.dining)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns total meals eaten so far.
    pub async fn total_meals(&self) -> u64 {
        self.state.read().await.values().map(|t| t.meals).sum()
    }
}

#[async_trait]
impl Subscribe for Ledger {
    async fn on_event(&self, ev: &Event) {
        self.update(ev).await;
    }

    fn name(&self) -> &'static str {
        "ledger"
    }

    fn delivery(&self) -> Delivery {
        Delivery::Lossless
    }
}
