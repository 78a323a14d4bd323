//! Error types for geodb-import.

use std::path::PathBuf;

use geodb_coord::CoordError;
use geodb_core::CoreError;
use geodb_index::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("destination directory '{}' does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("{module} failed: {source}")]
    ModuleFailed {
        module: &'static str,
        #[source]
        source: Box<ImportError>,
    },
}

/// Alias for `Result<T, ImportError>`.
pub type ImportResult<T> = Result<T, ImportError>;
