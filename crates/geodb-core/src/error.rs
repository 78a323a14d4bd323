//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant through `#[from]`.

use thiserror::Error;

/// Errors produced by `geodb-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("coordinate out of range: lat {lat}, lon {lon}")]
    CoordOutOfRange { lat: f64, lon: f64 },
}

/// Shorthand result type for `geodb-core`.
pub type CoreResult<T> = Result<T, CoreError>;
