//! # Chopstick pool: K independent binary tokens.
//!
//! Each slot is a one-holder async lock. [`ChopstickPool::acquire`] waits until the
//! slot is free and returns an owned [`Chopstick`] guard; handing the guard back via
//! [`ChopstickPool::release`] (or dropping it) frees the slot and wakes at most one
//! waiter, in FIFO order.
//!
//! ## Rules
//! - At most one guard per slot exists at any time (mutual exclusion)
//! - Guards are never cloned, so a chopstick is released exactly once per acquire
//! - `available_count() + held_count() == capacity()` at every observation point

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug)]
struct Slot {
    lock: Arc<Mutex<()>>,
    held: AtomicBool,
}

/// Fixed set of chopsticks indexed `0..capacity`.
#[derive(Debug)]
pub struct ChopstickPool {
    slots: Vec<Arc<Slot>>,
}

/// Exclusive hold on one chopstick.
///
/// The slot is marked available again when the guard is released or dropped.
#[derive(Debug)]
#[must_use = "dropping a chopstick puts it straight back on the table"]
pub struct Chopstick {
    index: usize,
    slot: Arc<Slot>,
    _guard: OwnedMutexGuard<()>,
}

impl Chopstick {
    /// Position of this chopstick on the table.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Drop for Chopstick {
    fn drop(&mut self) {
        // Flag first, lock second (fields drop after this body).
        self.slot.held.store(false, Ordering::Release);
    }
}

impl ChopstickPool {
    /// Creates `capacity` available chopsticks.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| {
                Arc::new(Slot {
                    lock: Arc::new(Mutex::new(())),
                    held: AtomicBool::new(false),
                })
            })
            .collect();
        Self { slots }
    }

    /// Waits until chopstick `index` is available and takes it.
    ///
    /// The wait has no timeout of its own; wrap it in `tokio::time::timeout` to bound it.
    /// Dropping the returned future before completion leaves the pool untouched.
    ///
    /// # Panics
    /// If `index >= capacity()`.
    pub async fn acquire(&self, index: usize) -> Chopstick {
        let slot = Arc::clone(&self.slots[index]);
        let guard = Arc::clone(&slot.lock).lock_owned().await;
        slot.held.store(true, Ordering::Release);
        Chopstick {
            index,
            slot,
            _guard: guard,
        }
    }

    /// Takes chopstick `index` only if nobody holds it.
    ///
    /// # Panics
    /// If `index >= capacity()`.
    pub fn try_acquire(&self, index: usize) -> Option<Chopstick> {
        let slot = Arc::clone(&self.slots[index]);
        let guard = Arc::clone(&slot.lock).try_lock_owned().ok()?;
        slot.held.store(true, Ordering::Release);
        Some(Chopstick {
            index,
            slot,
            _guard: guard,
        })
    }

    /// Puts a chopstick back on the table.
    pub fn release(&self, chopstick: Chopstick) {
        drop(chopstick);
    }

    /// Returns `true` if nobody holds chopstick `index`.
    ///
    /// # Panics
    /// If `index >= capacity()`.
    pub fn is_available(&self, index: usize) -> bool {
        !self.slots[index].held.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn held_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.held.load(Ordering::Acquire))
            .count()
    }

    pub fn available_count(&self) -> usize {
        self.capacity() - self.held_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn acquire_and_release_conserve_tokens() {
        let pool = ChopstickPool::new(5);
        assert_eq!(pool.available_count(), 5);

        let a = pool.acquire(0).await;
        let b = pool.acquire(3).await;
        assert_eq!(a.index(), 0);
        assert!(!pool.is_available(0));
        assert!(!pool.is_available(3));
        assert_eq!(pool.held_count(), 2);
        assert_eq!(pool.available_count() + pool.held_count(), 5);

        pool.release(a);
        pool.release(b);
        assert_eq!(pool.available_count(), 5);
    }

    #[tokio::test]
    async fn held_chopstick_cannot_be_taken() {
        let pool = ChopstickPool::new(2);
        let held = pool.acquire(1).await;
        assert!(pool.try_acquire(1).is_none());

        let waited = tokio::time::timeout(Duration::from_millis(20), pool.acquire(1)).await;
        assert!(waited.is_err(), "second holder got in");
        assert_eq!(pool.held_count(), 1, "abandoned wait changed the pool");

        pool.release(held);
        assert!(pool.try_acquire(1).is_some());
    }

    #[tokio::test]
    async fn release_wakes_a_waiter() {
        let pool = Arc::new(ChopstickPool::new(1));
        let held = pool.acquire(0).await;

        let p = Arc::clone(&pool);
        let waiter = tokio::spawn(async move { p.acquire(0).await.index() });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        pool.release(held);
        assert_eq!(waiter.await.unwrap(), 0);
        assert_eq!(pool.available_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mutual_exclusion_under_contention() {
        let pool = Arc::new(ChopstickPool::new(1));
        let inside = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let pool = Arc::clone(&pool);
            let inside = Arc::clone(&inside);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let c = pool.acquire(0).await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    assert_eq!(now, 1, "two holders of one chopstick");
                    tokio::task::yield_now().await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                    pool.release(c);
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(pool.available_count(), 1);
    }
}
