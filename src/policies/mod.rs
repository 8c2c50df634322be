//! Timing and retry policies.
//!
//! This module groups the knobs that control **how long** a philosopher thinks,
//! eats and waits, and **what it does** when a wait times out.
//!
//! ## Contents
//! - [`TimingPolicy`] think/eat/timeout durations (random per quantum, or fixed)
//! - [`RetryPolicy`]  keep retrying from one seat, or stand up after `n` timeouts
//!
//! ## Quick wiring
//! ```text
//! Config { timing: TimingPolicy, retry: RetryPolicy, .. }
//!      └─► core::actor::PhilosopherActor uses:
//!           - timing.think() / timing.eat() for the cycle
//!           - timing.timeout() per acquisition attempt
//!           - retry.should_stand(timeouts) to decide whether to give the seat back
//! ```

mod retry;
mod timing;

pub use retry::RetryPolicy;
pub use timing::{DEFAULT_QUANTUM, TimingPolicy};
