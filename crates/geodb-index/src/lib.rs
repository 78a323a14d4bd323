//! `geodb-index` — per-type grid bitmap indexes over node, way and area data.
//!
//! Every record type gets its own uniform grid.  The grid level is chosen per
//! type so that cells hold few entries (see [`distribution`]), then each
//! type's occupied rectangle is written as a fixed-width bitmap followed by
//! delta-coded offset lists (see [`builder`]).  A query reads only the bitmap
//! rows covered by the query box.
//!
//! | Module           | Contents                                           |
//! |------------------|----------------------------------------------------|
//! | [`record`]       | `GeoRecord`, `RecordKind`, data file reader/writer |
//! | [`distribution`] | Level selection (`select_levels`, `TypeIndexLevel`)|
//! | [`builder`]      | `GridBitmapIndexBuilder`, `IndexStats`             |
//! | [`reader`]       | `GridIndexReader`, `TypeLookup`, `OffsetQuery`     |
//! | [`error`]        | `IndexError`, `IndexResult`                        |
//!
//! # File layout
//!
//! ```text
//! u32 LE        indexed type count
//! per type      varint type id, u64 LE bitmap offset, u8 address width,
//!               varint level, varint x start, x end, y start, y end
//! per level ↑   per type at that level ↑:
//!                 bitmap: x count × y count slots of address width bytes
//!                 cells in (y, x) order: varint count, varint first offset,
//!                 varint deltas
//! ```

pub mod builder;
pub mod distribution;
pub mod error;
pub mod reader;
pub mod record;


pub use builder::{GridBitmapIndexBuilder, IndexStats};
pub use distribution::{TypeIndexLevel, select_levels};
pub use error::{IndexError, IndexResult};
pub use reader::{GridIndexReader, OffsetQuery, TypeIndex, TypeLookup};
pub use record::{DataFile, DataFileWriter, GeoRecord, RecordKind};
