//! The raw coordinate input file (`rawcoord.dat`).
//!
//! ```text
//! u32 LE   count
//! count ×  i64 LE external id, 7 coordinate bytes
//! ```

use std::path::Path;

use geodb_core::{ExternalId, GeoCoord};
use geodb_io::{FileScanner, FileWriter, IoResult};
use geodb_sort::{SortResult, SortSource};

pub const RAW_COORD_DAT: &str = "rawcoord.dat";

const HEADER_SIZE: u64 = 4;

/// One source node: its external id and coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawCoord {
    pub id:    ExternalId,
    pub coord: GeoCoord,
}

impl RawCoord {
    pub fn new(id: i64, lat: f64, lon: f64) -> Self {
        Self { id: ExternalId(id), coord: GeoCoord::new(lat, lon) }
    }
}

// ── Writer ────────────────────────────────────────────────────────────────────

/// Writes `rawcoord.dat`.  The entry count is patched in by
/// [`finish`](Self::finish).
pub struct RawCoordWriter {
    writer: FileWriter,
    count:  u32,
}

impl RawCoordWriter {
    pub fn create(path: &Path) -> IoResult<Self> {
        let mut writer = FileWriter::create(path)?;
        writer.write_u32(0)?;
        Ok(Self { writer, count: 0 })
    }

    pub fn write(&mut self, raw: &RawCoord) -> IoResult<()> {
        self.writer.write_i64(raw.id.0)?;
        self.writer.write_coord(raw.coord)?;
        self.count += 1;
        Ok(())
    }

    /// Patch the count and close.  Returns the number of entries written.
    pub fn finish(mut self) -> IoResult<u32> {
        self.writer.set_pos(0)?;
        self.writer.write_u32(self.count)?;
        self.writer.close()?;
        Ok(self.count)
    }
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Which sort key a [`RawCoordFile`] scan yields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RawCoordKey {
    /// [`GeoCoord::position_key`]: groups coincident coordinates.
    Position,
    /// [`ExternalId::sort_key`]: ascending external id.
    ExternalId,
}

impl RawCoordKey {
    #[inline]
    pub fn of(self, raw: &RawCoord) -> u64 {
        match self {
            RawCoordKey::Position   => raw.coord.position_key(),
            RawCoordKey::ExternalId => raw.id.sort_key(),
        }
    }
}

/// Rescannable reader over `rawcoord.dat`.
pub struct RawCoordFile {
    scanner: FileScanner,
    count:   u32,
    key:     RawCoordKey,
}

impl RawCoordFile {
    pub fn open(path: &Path, key: RawCoordKey) -> IoResult<Self> {
        let mut scanner = FileScanner::open(path)?;
        let count = scanner.read_u32()?;
        Ok(Self { scanner, count, key })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Read the entry at the current position.
    pub fn read_entry(&mut self) -> IoResult<RawCoord> {
        let id = ExternalId(self.scanner.read_i64()?);
        let coord = self
            .scanner
            .read_coord()?
            .ok_or_else(|| self.scanner.corrupt(format!("{id} has no valid coordinate")))?;
        Ok(RawCoord { id, coord })
    }
}

impl SortSource<RawCoord> for RawCoordFile {
    fn entry_count(&self) -> u64 {
        self.count as u64
    }

    fn scan(&mut self, visit: &mut dyn FnMut(u64, RawCoord) -> bool) -> SortResult<()> {
        self.scanner.set_pos(HEADER_SIZE)?;
        for _ in 0..self.count {
            let raw = self.read_entry()?;
            if !visit(self.key.of(&raw), raw) {
                break;
            }
        }
        Ok(())
    }
}
