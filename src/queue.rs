//! Thread-safe FIFO queue.
//!
//! A `Mutex<VecDeque<T>>` paired with a `Condvar` that is signalled on every
//! push. Consumers can block indefinitely, poll without blocking, or wait with
//! a deadline:
//!
//! ```text
//!  producers ──push──▶ ┌──────────────────────┐ ──pop_blocking──▶ consumer
//!  producers ──push──▶ │ Mutex<VecDeque<T>>   │ ──try_pop───────▶ consumer
//!  producers ──push──▶ │ Condvar (on push)    │ ──try_pop_timed─▶ consumer
//!                      └──────────────────────┘
//! ```
//!
//! The queue is unbounded: `push` never waits for space and there is no
//! backpressure. A producer that permanently outpaces its consumers grows the
//! queue without limit.

use std::collections::VecDeque;
use std::fmt;
use std::ptr;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A generic multi-producer, multi-consumer FIFO queue.
///
/// Every operation takes the same lock, so all of them are atomic with respect
/// to each other and the order of items is the global order in which pushes
/// acquired the lock. Share it between threads with an `Arc`.
pub struct ConcurrentQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> ConcurrentQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    // No critical section below can panic, so a poisoned lock still guards a
    // consistent sequence.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an item to the back and wake one waiting consumer.
    pub fn push(&self, item: T) {
        self.lock().push_back(item);
        self.available.notify_one();
    }

    /// Remove the front item, waiting for as long as it takes.
    ///
    /// Blocks forever if nothing is ever pushed. Consumers that must also
    /// react to an external stop signal should use [`try_pop_timed`] instead.
    ///
    /// [`try_pop_timed`]: ConcurrentQueue::try_pop_timed
    pub fn pop_blocking(&self) -> T {
        let mut items = self.lock();

        // Re-check after every wake-up; the condvar may wake spuriously.
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            items = self
                .available
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remove the front item if there is one. Never suspends the caller.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Remove the front item, waiting at most `timeout` for one to arrive.
    ///
    /// Returns `None` if the queue is still empty at the deadline. Spurious
    /// wake-ups are absorbed and do not extend the total wait.
    pub fn try_pop_timed(&self, timeout: Duration) -> Option<T> {
        let (mut items, _) = self
            .available
            .wait_timeout_while(self.lock(), timeout, |items| items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        items.pop_front()
    }

    /// Whether the queue is empty right now. Stale as soon as it returns.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of pending items right now. Stale as soon as it returns.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Take every pending item at once, front first.
    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    /// Exchange the contents of two queues.
    ///
    /// Both locks are taken in address order, so two threads swapping the
    /// same pair in opposite directions cannot deadlock.
    pub fn swap(&self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }

        let (first, second) = if (self as *const Self) < (other as *const Self) {
            (self, other)
        } else {
            (other, self)
        };

        let mut a = first.lock();
        let mut b = second.lock();
        std::mem::swap(&mut *a, &mut *b);
        let (a_len, b_len) = (a.len(), b.len());
        drop(b);
        drop(a);

        // Consumers parked on either queue may now have something to take.
        if a_len > 0 {
            first.available.notify_all();
        }
        if b_len > 0 {
            second.available.notify_all();
        }
    }
}

impl<T: Clone> ConcurrentQueue<T> {
    /// Copy of the pending items, front first.
    pub fn snapshot(&self) -> VecDeque<T> {
        self.lock().clone()
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for ConcurrentQueue<T> {
    fn clone(&self) -> Self {
        Self {
            items: Mutex::new(self.snapshot()),
            available: Condvar::new(),
        }
    }
}

impl<T> FromIterator<T> for ConcurrentQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: Mutex::new(iter.into_iter().collect()),
            available: Condvar::new(),
        }
    }
}

impl<T> fmt::Debug for ConcurrentQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentQueue")
            .field("len", &self.len())
            .finish()
    }
}
