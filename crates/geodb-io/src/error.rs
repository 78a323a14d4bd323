//! Error types for geodb-io.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading or writing geodb files.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot {op} '{}': {source}", path.display())]
    File {
        path:   PathBuf,
        op:     &'static str,
        source: std::io::Error,
    },

    #[error("corrupt file '{}' at byte {pos}: {reason}", path.display())]
    Corrupt {
        path:   PathBuf,
        pos:    u64,
        reason: String,
    },

    #[error("value {value} does not fit into {width} byte(s)")]
    WidthOverflow { value: u64, width: u8 },
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;
