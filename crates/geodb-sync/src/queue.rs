//! Bounded blocking FIFO used as the handoff between pipeline stages.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct QueueState<T> {
    items:   VecDeque<T>,
    stopped: bool,
}

/// Fixed-capacity multi-producer multi-consumer queue.
///
/// * [`push`](Self::push) blocks while the queue is full.  After
///   [`stop`](Self::stop) it drops the item and returns `false`.
/// * [`pop`](Self::pop) blocks while the queue is empty.  Items queued before
///   `stop` are still handed out; `None` means stopped **and** drained.
///
/// The stop signal doubles as the failure signal: a stage that fails stops
/// every queue it touches so that the other stages wind down.
pub struct BoundedTaskQueue<T> {
    state:     Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full:  Condvar,
    capacity:  usize,
}

impl<T> BoundedTaskQueue<T> {
    /// A queue holding at most `capacity` items (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state:     Mutex::new(QueueState { items: VecDeque::with_capacity(capacity.min(1024)), stopped: false }),
            not_empty: Condvar::new(),
            not_full:  Condvar::new(),
            capacity,
        }
    }

    /// Enqueue `item`, waiting for free space.  Returns `false` (and drops the
    /// item) if the queue is or becomes stopped.
    pub fn push(&self, item: T) -> bool {
        let mut st = self.lock();
        while !st.stopped && st.items.len() >= self.capacity {
            st = self.not_full.wait(st).unwrap_or_else(PoisonError::into_inner);
        }
        if st.stopped {
            return false;
        }
        st.items.push_back(item);
        drop(st);
        self.not_empty.notify_one();
        true
    }

    /// Dequeue the oldest item, waiting while the queue is empty and running.
    pub fn pop(&self) -> Option<T> {
        let mut st = self.lock();
        loop {
            if let Some(item) = st.items.pop_front() {
                drop(st);
                self.not_full.notify_one();
                return Some(item);
            }
            if st.stopped {
                return None;
            }
            st = self.not_empty.wait(st).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Stop the queue and wake every waiter.  Idempotent.
    pub fn stop(&self) {
        self.lock().stopped = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
