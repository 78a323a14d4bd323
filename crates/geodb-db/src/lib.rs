//! `geodb-db` — query-time access to the files of one import.
//!
//! A [`Database`] owns the open index readers and the coordinate store of a
//! destination directory.  Queries run under the shared side of a
//! [`ReentrantRWLatch`](geodb_sync::ReentrantRWLatch); opening, closing and
//! reloading take the exclusive side, so handles are never swapped under a
//! running query.
//!
//! | Module       | Contents                            |
//! |--------------|-------------------------------------|
//! | [`database`] | `Database`                          |
//! | [`error`]    | `DbError`, `DbResult`               |

pub mod database;
pub mod error;


pub use database::Database;
pub use error::{DbError, DbResult};
