//! `geodb-coord` — deduplicated, id-addressable coordinate storage.
//!
//! The raw coordinate file lists every source node as `(external id,
//! coordinate)`.  [`CoordDataGenerator`] turns it into `coord.dat`, where
//! coincident coordinates are told apart by a per-position serial number:
//!
//! 1. sort by position key and mark every position seen more than once;
//! 2. sort by external id, hand out serials in id order and write the
//!    coordinates into fixed-size disk pages plus a page index.
//!
//! Both passes run the paged external sorter, a parallel page sort stage and
//! the consumer as three threads connected by `BoundedTaskQueue`s.
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`raw`]       | `RawCoord`, raw coordinate file reader and writer      |
//! | [`serial`]    | `SerialAssignment`                                     |
//! | [`generator`] | `CoordDataGenerator`, `CoordStats`                     |
//! | [`store`]     | `CoordStore` reader, `Point`                           |
//! | [`error`]     | `CoordError`, `CoordResult`                            |

pub mod error;
pub mod generator;
pub mod raw;
pub mod serial;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{CoordError, CoordResult};
pub use generator::{CoordDataGenerator, CoordStats};
pub use raw::{RAW_COORD_DAT, RawCoord, RawCoordFile, RawCoordKey, RawCoordWriter};
pub use serial::{SERIAL_OVERFLOW, SerialAssignment};
pub use store::{COORD_DAT, CoordStore, Point};
