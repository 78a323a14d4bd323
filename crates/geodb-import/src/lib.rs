//! `geodb-import` — drives the generators that turn upstream files into a
//! queryable database directory.
//!
//! An import is a list of [`ImportModule`]s run one after the other by an
//! [`Importer`].  [`Importer::standard`] contains, in order:
//!
//! | Module                    | Reads           | Writes          |
//! |---------------------------|-----------------|-----------------|
//! | `CoordDataGenerator`      | `rawcoord.dat`  | `coord.dat`     |
//! | `AreaNodeIndexGenerator`  | `nodes.dat`     | `areanode.idx`  |
//! | `AreaWayIndexGenerator`   | `ways.dat`      | `areaway.idx`   |
//! | `AreaAreaIndexGenerator`  | `areas.dat`     | `areaarea.idx`  |
//!
//! The first failing module ends the import.
//!
//! # Example
//!
//! ```rust,ignore
//! let param = ImportParameter::new("/data/bavaria");
//! let report = Importer::standard().run(&param, &mut TracingProgress::new())?;
//! println!("import took {:?}", report.total());
//! ```

pub mod error;
pub mod importer;
pub mod module;


pub use error::{ImportError, ImportResult};
pub use importer::{ImportReport, Importer, StepReport};
pub use module::{AreaIndexModule, CoordDataModule, ImportModule};
