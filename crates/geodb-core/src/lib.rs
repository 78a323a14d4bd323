//! `geodb-core` — foundational types for the geodb import core.
//!
//! Every other `geodb-*` crate depends on this one.  It has no `geodb-*`
//! dependencies and only `thiserror` and `tracing` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `FileOffset`, `TypeId`, `ExternalId`                    |
//! | [`geo`]       | `GeoCoord` (7-byte disk encoding, position key), `GeoBox` |
//! | [`cell`]      | `Level`, `Cell`, `CellBox` — the uniform global grid    |
//! | [`config`]    | `ImportParameter`, `GridIndexParameter`                 |
//! | [`progress`]  | `ImportProgress` sink, `TracingProgress`, `NoopProgress`|
//! | [`error`]     | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to config and id types.     |

pub mod cell;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod progress;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::{Cell, CellBox, Level};
pub use config::{GridIndexParameter, ImportParameter};
pub use error::{CoreError, CoreResult};
pub use geo::{COORD_BYTE_SIZE, GeoBox, GeoCoord};
pub use ids::{ExternalId, FileOffset, TypeId};
pub use progress::{ImportProgress, NoopProgress, TracingProgress};
