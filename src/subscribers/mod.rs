//! # Event subscribers for the dinnervisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and built-in subscribers for events broadcast through the [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Philosopher ── publish(Event) ──► Bus ──► Coordinator listener ──► SubscriberSet
//!                                                                        │
//!                                                        ┌───────────────┼──────────┐
//!                                                        ▼               ▼          ▼
//!                                                    LogWriter        Ledger     Custom
//! ```
//!
//! ## Built-in subscribers
//! - [`LogWriter`] - narrates every transition on stdout
//! - [`Ledger`] - stateful per-philosopher tally (always installed by the coordinator)

mod ledger;
mod log;
mod subscriber;
mod subscriber_set;

pub use ledger::{Ledger, Tally};
pub use log::LogWriter;
pub use subscriber::{Delivery, Subscribe};
pub use subscriber_set::SubscriberSet;
