//! Query side of the grid bitmap index.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use geodb_core::{Cell, CellBox, FileOffset, GeoBox, Level, TypeId};
use geodb_io::{FileScanner, IoResult};
use tracing::debug;

use crate::IndexResult;

/// Header entry of one indexed type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeIndex {
    pub type_id:       TypeId,
    pub level:         Level,
    pub cells:         CellBox,
    pub bitmap_offset: u64,
    /// Byte width of one bitmap slot.
    pub width:         u8,
}

impl TypeIndex {
    /// Position of the first cell list, directly behind the bitmap.
    pub fn data_offset(&self) -> u64 {
        self.bitmap_offset + self.cells.count() * self.width as u64
    }
}

/// Result of a single-type lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeLookup {
    /// The type has no data in this index.
    Absent,
    /// Ascending, duplicate-free offsets; may be empty.
    Found(Vec<FileOffset>),
}

/// Result of a multi-type query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetQuery {
    /// Ascending, duplicate-free offsets over all requested types.
    pub offsets:      Vec<FileOffset>,
    /// Requested types that are present in the index.
    pub loaded_types: BTreeSet<TypeId>,
}

/// Reads an index written by [`GridBitmapIndexBuilder`](crate::GridBitmapIndexBuilder).
///
/// The header is loaded on open; bitmaps and cell lists are read on demand.
/// Lookups take `&self` and share one scanner behind a mutex.
pub struct GridIndexReader {
    path:    PathBuf,
    scanner: Mutex<FileScanner>,
    types:   BTreeMap<TypeId, TypeIndex>,
}

impl GridIndexReader {
    pub fn open(path: &Path) -> IndexResult<Self> {
        let mut scanner = FileScanner::open(path)?;
        let count = scanner.read_u32()?;
        let mut types = BTreeMap::new();
        for _ in 0..count {
            let t = read_type_header(&mut scanner)?;
            if t.width == 0 || t.width > 8 {
                return Err(scanner.corrupt(format!("{} has address width {}", t.type_id, t.width)).into());
            }
            types.insert(t.type_id, t);
        }
        debug!(path = %path.display(), types = types.len(), "grid index opened");
        Ok(Self { path: path.to_path_buf(), scanner: Mutex::new(scanner), types })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header entries, ascending by type id.
    pub fn types(&self) -> impl Iterator<Item = &TypeIndex> {
        self.types.values()
    }

    pub fn type_index(&self, type_id: TypeId) -> Option<&TypeIndex> {
        self.types.get(&type_id)
    }

    /// Offsets of the records of `type_id` in the cells covered by `bbox`.
    pub fn lookup(&self, bbox: &GeoBox, type_id: TypeId) -> IndexResult<TypeLookup> {
        let Some(t) = self.types.get(&type_id) else {
            return Ok(TypeLookup::Absent);
        };
        let Some(query) = t.level.cells_of(bbox).intersection(&t.cells) else {
            return Ok(TypeLookup::Found(Vec::new()));
        };

        let mut scanner = self.scanner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut offsets = Vec::new();
        read_cells(&mut scanner, t, &query, &mut offsets)?;
        offsets.sort_unstable();
        offsets.dedup();
        Ok(TypeLookup::Found(offsets))
    }

    /// Union of [`lookup`](Self::lookup) over `types`.
    pub fn offsets(&self, bbox: &GeoBox, types: &[TypeId]) -> IndexResult<OffsetQuery> {
        let mut result = OffsetQuery::default();
        for &type_id in types {
            if let TypeLookup::Found(offsets) = self.lookup(bbox, type_id)? {
                result.loaded_types.insert(type_id);
                result.offsets.extend(offsets);
            }
        }
        result.offsets.sort_unstable();
        result.offsets.dedup();
        Ok(result)
    }
}

fn read_type_header(scanner: &mut FileScanner) -> IoResult<TypeIndex> {
    let raw_type = scanner.read_varint()?;
    let type_id = u16::try_from(raw_type)
        .map(TypeId)
        .map_err(|_| scanner.corrupt(format!("type id {raw_type} out of range")))?;
    let bitmap_offset = scanner.read_u64()?;
    let width = scanner.read_u8()?;
    let level = scanner.read_varint()?;
    if level > Level::MAX.0 as u64 {
        return Err(scanner.corrupt(format!("level {level} out of range")));
    }
    let mut bounds = [0u32; 4];
    for b in &mut bounds {
        let v = scanner.read_varint()?;
        *b = u32::try_from(v).map_err(|_| scanner.corrupt(format!("cell coordinate {v} out of range")))?;
    }
    let [x_start, x_end, y_start, y_end] = bounds;
    if x_start > x_end || y_start > y_end {
        return Err(scanner.corrupt(format!("{type_id} has an empty cell rectangle")));
    }
    Ok(TypeIndex {
        type_id,
        level: Level(level as u32),
        cells: CellBox { x_start, x_end, y_start, y_end },
        bitmap_offset,
        width,
    })
}

/// Collect the offsets of every occupied cell of `query`, row by row.  The
/// lists of one row are stored back to back, so each row costs one bitmap
/// read and one sequential run over cell data.
fn read_cells(
    scanner: &mut FileScanner,
    t: &TypeIndex,
    query: &CellBox,
    out: &mut Vec<FileOffset>,
) -> IoResult<()> {
    let data_offset = t.data_offset();
    for y in query.y_start..=query.y_end {
        let row_start = t.cells.slot_of(Cell::new(query.x_start, y));
        scanner.set_pos(t.bitmap_offset + row_start * t.width as u64)?;

        let mut first = 0u64;
        let mut occupied = 0usize;
        for _ in query.x_start..=query.x_end {
            let slot = scanner.read_file_offset(t.width)?;
            if slot != 0 {
                if occupied == 0 {
                    first = slot;
                }
                occupied += 1;
            }
        }
        if occupied == 0 {
            continue;
        }

        scanner.set_pos(data_offset + first - 1)?;
        for _ in 0..occupied {
            read_offsets(scanner, out)?;
        }
    }
    Ok(())
}

/// Decode one cell list (count, first offset, deltas) onto `out`.
fn read_offsets(scanner: &mut FileScanner, out: &mut Vec<FileOffset>) -> IoResult<()> {
    let count = scanner.read_varint()?;
    let mut previous = 0u64;
    for _ in 0..count {
        let delta = scanner.read_varint()?;
        previous = previous
            .checked_add(delta)
            .ok_or_else(|| scanner.corrupt("cell offset overflows"))?;
        out.push(previous);
    }
    Ok(())
}

/// In-memory counterpart of [`read_offsets`].
#[cfg(test)]
pub(crate) fn decode_offsets(mut buf: &[u8]) -> Option<Vec<FileOffset>> {
    let (count, n) = geodb_io::varint::decode(buf)?;
    buf = &buf[n..];
    let mut previous = 0u64;
    let mut offsets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (delta, n) = geodb_io::varint::decode(buf)?;
        buf = &buf[n..];
        previous = previous.checked_add(delta)?;
        offsets.push(previous);
    }
    Some(offsets)
}
