//! Rescannable keyed input of the external sorter.

use crate::SortResult;

/// An input that can be scanned from the start any number of times, yielding
/// the same entries (in the same order) on every scan.
pub trait SortSource<E> {
    /// Number of entries a full scan yields.
    fn entry_count(&self) -> u64;

    /// Scan from the start, calling `visit(key, entry)` for every entry.
    /// Stops early (successfully) once `visit` returns `false`.
    fn scan(&mut self, visit: &mut dyn FnMut(u64, E) -> bool) -> SortResult<()>;
}

impl<E: Clone> SortSource<E> for Vec<(u64, E)> {
    fn entry_count(&self) -> u64 {
        self.len() as u64
    }

    fn scan(&mut self, visit: &mut dyn FnMut(u64, E) -> bool) -> SortResult<()> {
        for (key, entry) in self.iter() {
            if !visit(*key, entry.clone()) {
                break;
            }
        }
        Ok(())
    }
}
