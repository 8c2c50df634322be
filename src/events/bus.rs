//! # Bus: every state transition of the dinner, in publication order.
//!
//! Philosophers and the coordinator publish [`Event`]s; the coordinator's
//! narration listener and any test that called [`Bus::subscribe`] read them.
//!
//! ```text
//! PhilosopherActor ×N ──┐
//! acquire_chopsticks  ──┼──► Bus ──► narration listener ──► SubscriberSet
//! Coordinator         ──┘      └───► Bus::subscribe() in tests
//! ```
//!
//! ## Rules
//! - Publishing never waits; a philosopher is never slowed by its audience
//! - Every receiver sees events in the same order, the order of publication
//! - Releases are published before the resource goes back, so a pick-up of a
//!   seat or chopstick is always later than the release of its previous holder
//! - A receiver more than `capacity` events behind gets `RecvError::Lagged` and
//!   resumes at the oldest event still buffered
//! - Events published with no receiver are gone

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the dinner's broadcast channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus buffering up to `capacity` events (at least 1), shared by all receivers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, ev: Event) {
        // No receivers is not an error.
        let _ = self.tx.send(ev);
    }

    /// Receives every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
