//! Error types for geodb-db.

use std::path::PathBuf;

use geodb_coord::CoordError;
use geodb_index::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database is not open")]
    NotOpen,

    #[error("database is already open at '{}'", .0.display())]
    AlreadyOpen(PathBuf),

    /// The file was never generated (or its generation failed).
    #[error("'{}' has not been built", .0.display())]
    NotBuilt(PathBuf),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// Alias for `Result<T, DbError>`.
pub type DbResult<T> = Result<T, DbError>;
