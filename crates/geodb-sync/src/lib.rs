//! `geodb-sync` — the two concurrency primitives of the import core.
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`queue`]  | `BoundedTaskQueue`: blocking FIFO handoff between stages   |
//! | [`latch`]  | `ReentrantRWLatch`: writer-priority reentrant shared lock  |
//!
//! Both are built on `std::sync::{Mutex, Condvar}` and recover from mutex
//! poisoning: the protected state is only mutated in short critical sections
//! that cannot panic halfway.

pub mod latch;
pub mod queue;


pub use latch::{ExclusiveGuard, ReentrantRWLatch, SharedGuard};
pub use queue::BoundedTaskQueue;
