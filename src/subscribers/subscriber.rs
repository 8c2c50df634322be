//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers into a dinner.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `EventKind::SubscriberPanicked`)
//!
//! ## Architecture
//! ```text
//! SubscriberSet ──► [bounded queue] ──► worker task ──► subscriber.on_event()
//!                                    └─► panic caught → EventKind::SubscriberPanicked
//! ```
//!
//! ## Rules
//! - A slow subscriber never holds up a philosopher.
//! - [`Delivery::Lossless`] subscribers see every event the narration listener received.
//! - [`Delivery::BestEffort`] subscribers lose events when their queue is full;
//!   each loss is published as `EventKind::SubscriberOverflow`.
//! - Events are processed sequentially (FIFO) per subscriber.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use dinnervisor::{Event, EventKind, Subscribe};
//!
//! struct Timeouts;
//!
//! #[async_trait]
//! impl Subscribe for Timeouts {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::AcquireTimedOut) {
//!             // export a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "timeouts" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// What happens to an event when a subscriber's queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Narration waits for room. Suits subscribers that must not miss a
    /// transition, such as the narration log and the [`Ledger`](crate::Ledger).
    Lossless,
    /// The event is dropped for this subscriber and `SubscriberOverflow` is published.
    #[default]
    BestEffort,
}

/// Event subscriber for dinner observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in overflow/panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// The runtime clamps capacity to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }

    /// Returns how a full queue is handled. Default: [`Delivery::BestEffort`].
    fn delivery(&self) -> Delivery {
        Delivery::BestEffort
    }
}
