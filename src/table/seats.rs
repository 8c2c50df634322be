//! # Seat registry: a bounded blocking queue of seat identifiers.
//!
//! Free seat indices live in an unbounded `mpsc` queue. [`SeatRegistry::take`]
//! waits on the receiving end; a [`SeatId`] carries a sender and puts its index
//! back when it is given back or dropped.
//!
//! ## Architecture
//! ```text
//! take() ──► lock receiver (FIFO among waiters) ──► recv() ──► SeatId{ index, home }
//!
//! give(seat) / drop(seat) ──► free += 1 ──► home.send(index) ──► wakes the first waiter
//! ```
//!
//! ## Rules
//! - [`SeatId`] is neither `Clone` nor `Copy` and only the registry creates one,
//!   so no seat can be issued twice
//! - A seat whose holder vanished (an aborted task) is back in the queue
//! - `free() + issued() == capacity()` at every observation point

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};

/// Token for an occupied seat; returns the seat to its registry when dropped.
#[derive(Debug)]
pub struct SeatId {
    index: usize,
    home: mpsc::UnboundedSender<usize>,
    free: Arc<AtomicUsize>,
}

impl SeatId {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Drop for SeatId {
    fn drop(&mut self) {
        self.free.fetch_add(1, Ordering::AcqRel);
        let _ = self.home.send(self.index);
    }
}

/// Fixed set of seats `0..capacity`.
#[derive(Debug)]
pub struct SeatRegistry {
    free_list: Mutex<mpsc::UnboundedReceiver<usize>>,
    home: mpsc::UnboundedSender<usize>,
    free: Arc<AtomicUsize>,
    capacity: usize,
}

impl SeatRegistry {
    /// Creates a registry with every seat free.
    pub fn new(capacity: usize) -> Self {
        let (home, free_list) = mpsc::unbounded_channel();
        for index in 0..capacity {
            let _ = home.send(index);
        }
        Self {
            free_list: Mutex::new(free_list),
            home,
            free: Arc::new(AtomicUsize::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free seat and takes it.
    ///
    /// Cancel-safe: dropping the future before it resolves takes nothing.
    pub async fn take(&self) -> SeatId {
        let mut free_list = self.free_list.lock().await;
        // `self.home` keeps the queue open.
        let Some(index) = free_list.recv().await else {
            return std::future::pending().await;
        };
        self.issue(index)
    }

    /// Takes a seat if one is free and nobody is already waiting for it.
    pub fn try_take(&self) -> Option<SeatId> {
        let mut free_list = self.free_list.try_lock().ok()?;
        let index = free_list.try_recv().ok()?;
        Some(self.issue(index))
    }

    /// Returns a seat to the registry.
    pub fn give(&self, seat: SeatId) {
        debug_assert!(
            seat.home.same_channel(&self.home),
            "seat {} not from this registry",
            seat.index
        );
        drop(seat);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Seats nobody occupies.
    pub fn free(&self) -> usize {
        self.free.load(Ordering::Acquire)
    }

    /// Seats currently occupied.
    pub fn issued(&self) -> usize {
        self.capacity - self.free()
    }

    fn issue(&self, index: usize) -> SeatId {
        self.free.fetch_sub(1, Ordering::AcqRel);
        SeatId {
            index,
            home: self.home.clone(),
            free: Arc::clone(&self.free),
        }
    }
}
