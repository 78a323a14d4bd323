//! Error types for geodb-sort.

use geodb_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("sort input is inconsistent: {0}")]
    Corrupt(String),

    #[error("key {key} arrived after key {previous}; keys must ascend")]
    OutOfOrder { previous: u64, key: u64 },

    #[error("page size must be greater than zero")]
    ZeroPageSize,

    #[error("consumer stopped accepting pages")]
    Aborted,
}

/// Alias for `Result<T, SortError>`.
pub type SortResult<T> = Result<T, SortError>;
