//! Writer-priority, reentrant read/write latch.
//!
//! # Rules
//!
//! * A thread that already holds the latch (shared or exclusive) re-enters
//!   shared access immediately.
//! * Any other thread asking for shared access waits while a writer owns the
//!   latch **or is waiting for it**.  Writers therefore cannot starve.
//! * The exclusive owner re-enters exclusive access immediately.
//! * Exclusive access is granted once there is no owner and no shared holder
//!   other than the requesting thread, so a sole reader may upgrade.
//! * Releasing the last exclusive level wakes the waiting writers if there
//!   are any, otherwise every waiting reader.
//!
//! Two readers that try to upgrade at the same time deadlock, as with any
//! upgradable lock.
//!
//! The latch guards no data by itself.  Callers pair it with the state it
//! protects (see `geodb-db`).

use std::marker::PhantomData;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use rustc_hash::FxHashMap;

#[derive(Default)]
struct LatchState {
    /// Thread holding exclusive access.
    owner: Option<ThreadId>,
    /// Exclusive reentrancy depth of `owner`.
    depth: usize,
    /// Threads blocked in [`ReentrantRWLatch::lock`].
    waiting_writers: usize,
    /// Shared reentrancy depth per thread.
    shared: FxHashMap<ThreadId, usize>,
}

impl LatchState {
    #[inline]
    fn holds_any(&self, me: ThreadId) -> bool {
        self.owner == Some(me) || self.shared.contains_key(&me)
    }

    #[inline]
    fn exclusive_free_for(&self, me: ThreadId) -> bool {
        self.owner.is_none() && self.shared.keys().all(|t| *t == me)
    }
}

/// Reentrant read/write latch with writer priority.
#[derive(Default)]
pub struct ReentrantRWLatch {
    state:   Mutex<LatchState>,
    readers: Condvar,
    writers: Condvar,
}

impl ReentrantRWLatch {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Shared ───────────────────────────────────────────────────────────────

    /// Acquire shared access, blocking as described in the module docs.
    pub fn lock_shared(&self) -> SharedGuard<'_> {
        let me = thread::current().id();
        let mut st = self.lock_state();
        if !st.holds_any(me) {
            while st.owner.is_some() || st.waiting_writers > 0 {
                st = self.readers.wait(st).unwrap_or_else(PoisonError::into_inner);
            }
        }
        *st.shared.entry(me).or_insert(0) += 1;
        SharedGuard { latch: self, _not_send: PhantomData }
    }

    /// Non-blocking variant of [`lock_shared`](Self::lock_shared).
    pub fn try_lock_shared(&self) -> Option<SharedGuard<'_>> {
        let me = thread::current().id();
        let mut st = self.lock_state();
        if !st.holds_any(me) && (st.owner.is_some() || st.waiting_writers > 0) {
            return None;
        }
        *st.shared.entry(me).or_insert(0) += 1;
        Some(SharedGuard { latch: self, _not_send: PhantomData })
    }

    fn unlock_shared(&self) {
        let me = thread::current().id();
        let mut st = self.lock_state();
        let Some(depth) = st.shared.get_mut(&me) else {
            return;
        };
        *depth -= 1;
        if *depth == 0 {
            st.shared.remove(&me);
            if st.waiting_writers > 0 {
                drop(st);
                self.writers.notify_all();
            }
        }
    }

    // ── Exclusive ────────────────────────────────────────────────────────────

    /// Acquire exclusive access, blocking as described in the module docs.
    pub fn lock(&self) -> ExclusiveGuard<'_> {
        let me = thread::current().id();
        let mut st = self.lock_state();
        if st.owner == Some(me) {
            st.depth += 1;
            return ExclusiveGuard { latch: self, _not_send: PhantomData };
        }
        st.waiting_writers += 1;
        while !st.exclusive_free_for(me) {
            st = self.writers.wait(st).unwrap_or_else(PoisonError::into_inner);
        }
        st.waiting_writers -= 1;
        st.owner = Some(me);
        st.depth = 1;
        ExclusiveGuard { latch: self, _not_send: PhantomData }
    }

    /// Non-blocking variant of [`lock`](Self::lock).
    pub fn try_lock(&self) -> Option<ExclusiveGuard<'_>> {
        let me = thread::current().id();
        let mut st = self.lock_state();
        if st.owner == Some(me) {
            st.depth += 1;
        } else if st.exclusive_free_for(me) {
            st.owner = Some(me);
            st.depth = 1;
        } else {
            return None;
        }
        Some(ExclusiveGuard { latch: self, _not_send: PhantomData })
    }

    fn unlock(&self) {
        let me = thread::current().id();
        let mut st = self.lock_state();
        if st.owner != Some(me) {
            return;
        }
        st.depth -= 1;
        if st.depth > 0 {
            return;
        }
        st.owner = None;
        let writers_pending = st.waiting_writers > 0;
        drop(st);
        if writers_pending {
            self.writers.notify_all();
        } else {
            self.readers.notify_all();
        }
    }

    // ── Introspection ────────────────────────────────────────────────────────

    /// Number of threads currently holding shared access.
    pub fn shared_holders(&self) -> usize {
        self.lock_state().shared.len()
    }

    /// Number of threads waiting for exclusive access.
    pub fn pending_writers(&self) -> usize {
        self.lock_state().waiting_writers
    }

    pub fn is_locked_exclusive(&self) -> bool {
        self.lock_state().owner.is_some()
    }

    fn lock_state(&self) -> MutexGuard<'_, LatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Guards ────────────────────────────────────────────────────────────────────

/// Shared access; released on drop.  Bound to the acquiring thread.
pub struct SharedGuard<'a> {
    latch:     &'a ReentrantRWLatch,
    _not_send: PhantomData<*const ()>,
}

impl Drop for SharedGuard<'_> {
    fn drop(&mut self) {
        self.latch.unlock_shared();
    }
}

/// Exclusive access; released on drop.  Bound to the acquiring thread.
pub struct ExclusiveGuard<'a> {
    latch:     &'a ReentrantRWLatch,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ExclusiveGuard<'_> {
    fn drop(&mut self) {
        self.latch.unlock();
    }
}
