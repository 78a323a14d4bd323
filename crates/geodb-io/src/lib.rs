//! `geodb-io` — low-level file access shared by every generator and reader.
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`varint`]  | Unsigned LEB128 encode / decode, byte-width helpers       |
//! | [`writer`]  | `FileWriter`: buffered, position-tracking, patchable      |
//! | [`scanner`] | `FileScanner`: buffered, seekable little-endian reader    |
//! | [`error`]   | `IoError`, `IoResult`                                     |
//!
//! All multi-byte integers are little-endian.  Writers track their own
//! position so callers can remember where a field lives and patch it later
//! with [`FileWriter::set_pos`].

pub mod error;
pub mod scanner;
pub mod varint;
pub mod writer;

#[cfg(test)]
mod tests;

pub use error::{IoError, IoResult};
pub use scanner::FileScanner;
pub use writer::FileWriter;
