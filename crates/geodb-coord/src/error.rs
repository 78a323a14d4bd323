//! Error types for geodb-coord.

use geodb_core::CoreError;
use geodb_io::IoError;
use geodb_sort::SortError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Sort(#[from] SortError),

    #[error("{0} worker panicked")]
    WorkerPanicked(&'static str),
}

/// Alias for `Result<T, CoordError>`.
pub type CoordResult<T> = Result<T, CoordError>;
