//! Reader for the coordinate store (`coord.dat`).
//!
//! ```text
//! u64 LE   index section offset (0 while the file is incomplete)
//! u32 LE   disk page size (slots per page)
//! pages    page size × (u8 serial, 7 coordinate bytes)
//! u32 LE   page count
//! count ×  (i64 LE first external id of the page, u64 LE page offset)
//! ```
//!
//! A disk page covers `page size` consecutive external-id sort keys.  Unused
//! slots hold serial 0 and the invalid coordinate sentinel.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use geodb_core::{COORD_BYTE_SIZE, ExternalId, GeoCoord};
use geodb_io::FileScanner;

use crate::CoordResult;

pub const COORD_DAT: &str = "coord.dat";

/// Size of one slot on disk.
pub(crate) const SLOT_SIZE: u64 = 1 + COORD_BYTE_SIZE as u64;

/// A stored coordinate and its serial among coincident coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    pub serial: u8,
    pub coord:  GeoCoord,
}

/// Random access to `coord.dat` by external id.  Safe to share between
/// threads; lookups serialise on the file scanner.
pub struct CoordStore {
    scanner:   Mutex<FileScanner>,
    page_size: u32,
    /// `(first id of page, page offset)`, ascending by id sort key.
    index:     Vec<(ExternalId, u64)>,
}

impl CoordStore {
    pub fn open(path: &Path) -> CoordResult<Self> {
        let mut scanner = FileScanner::open(path)?;
        let index_offset = scanner.read_u64()?;
        if index_offset == 0 {
            return Err(scanner.corrupt("coordinate store was not completely written").into());
        }
        let page_size = scanner.read_u32()?;
        if page_size == 0 {
            return Err(scanner.corrupt("disk page size is 0").into());
        }

        scanner.set_pos(index_offset)?;
        let count = scanner.read_u32()?;
        let mut index = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = ExternalId(scanner.read_i64()?);
            let offset = scanner.read_u64()?;
            index.push((id, offset));
        }
        if !index.windows(2).all(|w| w[0].0.sort_key() < w[1].0.sort_key()) {
            return Err(scanner.corrupt("page index is not ascending").into());
        }

        Ok(Self { scanner: Mutex::new(scanner), page_size, index })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of non-empty disk pages.
    pub fn page_count(&self) -> usize {
        self.index.len()
    }

    /// First external id of every non-empty page, ascending.
    pub fn page_ids(&self) -> impl Iterator<Item = ExternalId> + '_ {
        self.index.iter().map(|(id, _)| *id)
    }

    /// The stored point for `id`, `None` if the id was never stored.
    pub fn get(&self, id: ExternalId) -> CoordResult<Option<Point>> {
        let Some(pos) = self.slot_offset(id) else {
            return Ok(None);
        };
        let mut scanner = self.scanner.lock().unwrap_or_else(PoisonError::into_inner);
        Self::read_slot(&mut scanner, pos)
    }

    /// Look up several ids at once; the result is aligned with `ids`.
    pub fn get_many(&self, ids: &[ExternalId]) -> CoordResult<Vec<Option<Point>>> {
        let mut order: Vec<(u64, usize)> = ids
            .iter()
            .enumerate()
            .filter_map(|(i, id)| self.slot_offset(*id).map(|pos| (pos, i)))
            .collect();
        order.sort_unstable();

        let mut result = vec![None; ids.len()];
        let mut scanner = self.scanner.lock().unwrap_or_else(PoisonError::into_inner);
        for (pos, i) in order {
            result[i] = Self::read_slot(&mut scanner, pos)?;
        }
        Ok(result)
    }

    fn slot_offset(&self, id: ExternalId) -> Option<u64> {
        let page_size = self.page_size as u64;
        let key = id.sort_key();
        let first = ExternalId::from_sort_key(key - key % page_size);
        let i = self
            .index
            .binary_search_by_key(&first.sort_key(), |(page_id, _)| page_id.sort_key())
            .ok()?;
        Some(self.index[i].1 + (key % page_size) * SLOT_SIZE)
    }

    fn read_slot(scanner: &mut FileScanner, pos: u64) -> CoordResult<Option<Point>> {
        scanner.set_pos(pos)?;
        let serial = scanner.read_u8()?;
        Ok(scanner.read_coord()?.map(|coord| Point { serial, coord }))
    }
}
