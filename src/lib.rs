//! # dinnervisor
//!
//! **Dinnervisor** runs the dining philosophers on tokio: N philosophers
//! compete for S seats and K chopsticks, detect a stalled neighbor with a
//! randomized timeout, back off and retry, and all stop cleanly on request.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!        │ Philosopher  │   │ Philosopher  │   │ Philosopher  │
//!        │    id 0      │   │    id 1      │   │   id N-1     │
//!        └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!               ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Coordinator                                                      │
//! │  - Table (SeatRegistry + ChopstickPool, shared via Arc)           │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (LogWriter, Ledger, user subscribers)            │
//! │  - runtime CancellationToken (child token per actor)              │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │PhilosopherAct│   │PhilosopherAct│   │PhilosopherAct│
//!   │ think/sit/eat│   │ think/sit/eat│   │ think/sit/eat│
//!   └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!    │ Seated           │ PrimaryPickedUp  │ AcquireTimedOut
//!    │ Eating           │ Stood            │ RetryScheduled
//!    ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                    Bus (broadcast channel)                        │
//! │                 (capacity: Config::bus_capacity)                  │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  narration listener    │
//!                       │   (in Coordinator)     │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌────────┼─────────┐
//!                          ▼        ▼         ▼
//!                     LogWriter   Ledger    user subs
//! ```
//!
//! ### Acquisition
//! ```text
//! seat s ──► primary = s mod K  (wait, unbounded)
//!        ──► secondary = (s + 1) mod K  raced against timing.timeout()
//!                 ├─ won  ──► eat ──► put both down ──► stand
//!                 └─ lost ──► put primary down ──► think ──► try again
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                      |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Coordination**  | Spawn the philosophers, stop them, collect every report. | [`Coordinator`], [`ActorReport`]        |
//! | **Table**         | Exclusive chopsticks, seat registry, adjacency.          | [`Table`], [`ChopstickPool`], [`SeatRegistry`] |
//! | **Policies**      | Think/eat/timeout durations and retry budget.            | [`TimingPolicy`], [`RetryPolicy`]       |
//! | **Subscriber API**| Hook into every state transition.                        | [`Subscribe`], [`LogWriter`], [`Ledger`]|
//! | **Errors**        | Typed errors for configuration and shutdown.             | [`ConfigError`], [`RuntimeError`]       |
//! | **Configuration** | Centralize the dinner settings.                          | [`Config`]                              |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use dinnervisor::{Config, Coordinator, TimingPolicy};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::with_philosophers(3);
//!     cfg.timing = TimingPolicy::random(Duration::from_millis(5));
//!
//!     let coord = Coordinator::builder(cfg).build()?;
//!     let ledger = coord.ledger();
//!
//!     let reports = coord
//!         .run_until(tokio::time::sleep(Duration::from_millis(50)))
//!         .await?;
//!
//!     assert_eq!(reports.len(), 3);
//!     assert!(ledger.still_dining().await.is_empty());
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod philosopher;
mod policies;
mod subscribers;
mod table;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{
    Acquisition, ActorParams, ActorReport, Coordinator, CoordinatorBuilder, PhilosopherActor,
    StopCause, Utensils, acquire_chopsticks, wait_for_os_signal, wait_for_stop_signal,
};
pub use error::{ConfigError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use philosopher::{Philosopher, PhilosopherId, PhilosopherState};
pub use policies::{DEFAULT_QUANTUM, RetryPolicy, TimingPolicy};
pub use subscribers::{Delivery, Ledger, LogWriter, Subscribe, SubscriberSet, Tally};
pub use table::{Chopstick, ChopstickPool, SeatId, SeatRegistry, Table};
