//! # Narration fan-out: one queue and one worker per subscriber.
//!
//! The coordinator's narration listener hands every event it reads from the
//! [`Bus`] to [`SubscriberSet::emit`]. Each subscriber owns a bounded queue
//! drained by its own worker task, so a subscriber only ever waits on itself.
//!
//! ## Architecture
//! ```text
//! narration listener ── emit(event).await
//!     │
//!     ├──► [queue: Lossless]   ──► worker ──► LogWriter.on_event()
//!     │         full → wait for room
//!     ├──► [queue: Lossless]   ──► worker ──► Ledger.on_event()
//!     └──► [queue: BestEffort] ──► worker ──► custom.on_event()
//!               full → drop, publish SubscriberOverflow{ reason: "full" }
//!                                      └──► panic → publish SubscriberPanicked
//! ```
//!
//! ## Rules
//! - Philosophers publish to the bus and never wait on a subscriber
//! - A lossless subscriber that falls behind slows the listener; the bus absorbs
//!   the difference up to its capacity
//! - A panic in `on_event` loses that one event; the worker keeps going
//! - An overflow report is never itself reported as an overflow
//! - [`SubscriberSet::shutdown`] returns once every queued event has been handled

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_info;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Delivery, Subscribe};

struct Worker {
    name: &'static str,
    delivery: Delivery,
    queue: mpsc::Sender<Arc<Event>>,
    handle: JoinHandle<()>,
}

/// Delivers narration events to a fixed list of subscribers.
pub struct SubscriberSet {
    workers: Vec<Worker>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let workers = subs
            .into_iter()
            .map(|sub| {
                let (queue, rx) = mpsc::channel(sub.queue_capacity().max(1));
                Worker {
                    name: sub.name(),
                    delivery: sub.delivery(),
                    queue,
                    handle: tokio::spawn(narrate(sub, rx, bus.clone())),
                }
            })
            .collect();
        Self { workers, bus }
    }

    /// Queues `event` for every subscriber, honoring each one's [`Delivery`].
    pub async fn emit(&self, event: Event) {
        let overflow = event.kind == EventKind::SubscriberOverflow;
        let event = Arc::new(event);

        for worker in &self.workers {
            let lost = match worker.delivery {
                Delivery::Lossless => worker
                    .queue
                    .send(Arc::clone(&event))
                    .await
                    .err()
                    .map(|_| "closed"),
                Delivery::BestEffort => match worker.queue.try_send(Arc::clone(&event)) {
                    Ok(()) => None,
                    Err(mpsc::error::TrySendError::Full(_)) => Some("full"),
                    Err(mpsc::error::TrySendError::Closed(_)) => Some("closed"),
                },
            };
            if let Some(reason) = lost
                && !overflow
            {
                self.bus
                    .publish(Event::subscriber_overflow(worker.name, reason));
            }
        }
    }

    /// Closes every queue and waits for the workers to drain them.
    pub async fn shutdown(self) {
        for worker in self.workers {
            drop(worker.queue);
            let _ = worker.handle.await;
        }
    }
}

/// Feeds one subscriber until its queue closes.
async fn narrate(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        if let Err(panic) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
            bus.publish(Event::subscriber_panicked(sub.name(), panic_info(&*panic)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counter {
        seen: AtomicUsize,
        delivery: Delivery,
        pause: Duration,
    }

    impl Counter {
        fn new(delivery: Delivery, pause: Duration) -> Arc<Self> {
            Arc::new(Self {
                seen: AtomicUsize::new(0),
                delivery,
                pause,
            })
        }

        fn seen(&self) -> usize {
            self.seen.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _ev: &Event) {
            tokio::time::sleep(self.pause).await;
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
        fn name(&self) -> &'static str {
            "counter"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
        fn delivery(&self) -> Delivery {
            self.delivery
        }
    }

    struct Grumpy;

    #[async_trait]
    impl Subscribe for Grumpy {
        async fn on_event(&self, ev: &Event) {
            if ev.kind == EventKind::Eating {
                panic!("no eating at this table");
            }
        }
        fn name(&self) -> &'static str {
            "grumpy"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lossless_subscriber_sees_every_event() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let slow = Counter::new(Delivery::Lossless, Duration::from_millis(10));
        let set = SubscriberSet::new(vec![slow.clone()], bus);

        for _ in 0..20 {
            set.emit(Event::new(EventKind::Thinking)).await;
        }
        set.shutdown().await;

        assert_eq!(slow.seen(), 20);
        assert!(rx.try_recv().is_err(), "lossless delivery reported a loss");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_best_effort_subscriber_overflows() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let slow = Counter::new(Delivery::BestEffort, Duration::from_millis(10));
        let set = SubscriberSet::new(vec![slow.clone()], bus);

        for _ in 0..20 {
            set.emit(Event::new(EventKind::Thinking)).await;
        }
        set.shutdown().await;

        assert!(slow.seen() < 20);
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.subscriber, Some("counter"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
    }

    #[tokio::test]
    async fn shutdown_flushes_queued_events() {
        let counter = Counter::new(Delivery::Lossless, Duration::ZERO);
        let set = SubscriberSet::new(vec![counter.clone()], Bus::new(16));
        for _ in 0..10 {
            set.emit(Event::new(EventKind::Thinking)).await;
        }
        set.shutdown().await;
        assert_eq!(counter.seen(), 10);
    }

    #[tokio::test]
    async fn panicking_subscriber_is_reported_and_isolated() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let counter = Counter::new(Delivery::Lossless, Duration::ZERO);
        let set = SubscriberSet::new(vec![Arc::new(Grumpy), counter.clone()], bus);

        set.emit(Event::new(EventKind::Eating)).await;
        set.emit(Event::new(EventKind::Stood)).await;
        set.shutdown().await;

        assert_eq!(counter.seen(), 2);
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.subscriber, Some("grumpy"));
        assert_eq!(ev.reason.as_deref(), Some("no eating at this table"));
    }
}
