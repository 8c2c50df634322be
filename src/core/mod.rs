//! Runtime core: the acquisition protocol, the actors and their coordinator.
//!
//! The public entry point is [`Coordinator`], built through [`CoordinatorBuilder`].
//!
//! Internal modules:
//! - [`acquire`]: primary chopstick, then the secondary raced against a randomized timer;
//! - [`actor`]: one philosopher's think, sit, eat, stand loop;
//! - [`coordinator`]: spawns actors, waits for the stop signal, collects acknowledgments;
//! - [`builder`]: validates the config and installs the ledger;
//! - [`shutdown`]: stop byte on stdin, end of input, or OS termination signals.

mod acquire;
mod actor;
mod builder;
mod coordinator;
mod shutdown;

pub use acquire::{Acquisition, Utensils, acquire_chopsticks};
pub use actor::{ActorParams, ActorReport, PhilosopherActor};
pub use builder::CoordinatorBuilder;
pub use coordinator::Coordinator;
pub use shutdown::{StopCause, wait_for_os_signal, wait_for_stop_signal};
