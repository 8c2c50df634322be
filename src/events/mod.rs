//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by philosophers and the coordinator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `PhilosopherActor`, `acquire_chopsticks`, `Coordinator`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the coordinator's narration listener (fans out to `SubscriberSet`),
//!   and anything that calls [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
