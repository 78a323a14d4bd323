//! `geodb-sort` — sorting datasets that do not fit in memory.
//!
//! The input is rescanned once per round.  Each round keeps as many key pages
//! resident as the entry budget allows, hands them to the consumer in
//! ascending page order and moves the window to the pages after them.
//!
//! | Module           | Contents                                            |
//! |------------------|-----------------------------------------------------|
//! | [`source`]       | `SortSource`: rescannable keyed input               |
//! | [`page_manager`] | `PageManager` (one round's window), `ExternalSorter`|
//! | [`splitter`]     | `PageSplitter`: ascending keys → fixed disk pages   |
//! | [`error`]        | `SortError`, `SortResult`                           |

pub mod error;
pub mod page_manager;
pub mod source;
pub mod splitter;

#[cfg(test)]
mod tests;

pub use error::{SortError, SortResult};
pub use page_manager::{ExternalSorter, Page, PageManager, SortStats};
pub use source::SortSource;
pub use splitter::{DiskPage, PageSplitter};
