//! Error types for geodb-index.

use geodb_core::CoreError;
use geodb_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Alias for `Result<T, IndexError>`.
pub type IndexResult<T> = Result<T, IndexError>;
