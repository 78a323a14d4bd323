//! Typed geographic records and their flat data files.
//!
//! ```text
//! u32 LE   record count
//! count ×  varint type id, 7-byte min coordinate, 7-byte max coordinate
//! ```
//!
//! A record is identified by the file offset of its first byte.

use std::fmt;
use std::path::Path;

use geodb_core::{FileOffset, GeoBox, GeoCoord, TypeId};
use geodb_io::{FileScanner, FileWriter, IoResult};

const HEADER_SIZE: u64 = 4;

// ── RecordKind ────────────────────────────────────────────────────────────────

/// The three record families, each with its own data file and area index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Node,
    Way,
    Area,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Node, RecordKind::Way, RecordKind::Area];

    pub fn data_file(self) -> &'static str {
        match self {
            RecordKind::Node => "nodes.dat",
            RecordKind::Way  => "ways.dat",
            RecordKind::Area => "areas.dat",
        }
    }

    pub fn index_file(self) -> &'static str {
        match self {
            RecordKind::Node => "areanode.idx",
            RecordKind::Way  => "areaway.idx",
            RecordKind::Area => "areaarea.idx",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Node => "node",
            RecordKind::Way  => "way",
            RecordKind::Area => "area",
        };
        f.write_str(name)
    }
}

// ── GeoRecord ─────────────────────────────────────────────────────────────────

/// The part of a record the area index cares about.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoRecord {
    pub offset:  FileOffset,
    pub type_id: TypeId,
    pub bbox:    GeoBox,
}

// ── DataFileWriter ────────────────────────────────────────────────────────────

/// Writes a data file; the record count is patched in by
/// [`finish`](Self::finish).
pub struct DataFileWriter {
    writer: FileWriter,
    count:  u32,
}

impl DataFileWriter {
    pub fn create(path: &Path) -> IoResult<Self> {
        let mut writer = FileWriter::create(path)?;
        writer.write_u32(0)?;
        Ok(Self { writer, count: 0 })
    }

    /// Append a record; returns its offset.
    pub fn write(&mut self, type_id: TypeId, bbox: &GeoBox) -> IoResult<FileOffset> {
        let offset = self.writer.pos();
        self.writer.write_varint(type_id.0 as u64)?;
        self.writer.write_coord(bbox.min)?;
        self.writer.write_coord(bbox.max)?;
        self.count += 1;
        Ok(offset)
    }

    /// Append a node at `coord`; returns its offset.
    pub fn write_point(&mut self, type_id: TypeId, coord: GeoCoord) -> IoResult<FileOffset> {
        self.write(type_id, &GeoBox::from_point(coord))
    }

    pub fn finish(mut self) -> IoResult<u32> {
        self.writer.set_pos(0)?;
        self.writer.write_u32(self.count)?;
        self.writer.close()?;
        Ok(self.count)
    }
}

// ── DataFile ──────────────────────────────────────────────────────────────────

/// Sequential reader over a data file.  Each scan starts from the first
/// record.
pub struct DataFile {
    scanner: FileScanner,
    count:   u32,
}

impl DataFile {
    pub fn open(path: &Path) -> IoResult<Self> {
        let mut scanner = FileScanner::open(path)?;
        let count = scanner.read_u32()?;
        Ok(Self { scanner, count })
    }

    pub fn path(&self) -> &Path {
        self.scanner.path()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Visit every record in file order.
    pub fn scan(&mut self, visit: &mut dyn FnMut(&GeoRecord)) -> IoResult<()> {
        self.scanner.set_pos(HEADER_SIZE)?;
        for _ in 0..self.count {
            let record = self.read_record()?;
            visit(&record);
        }
        Ok(())
    }

    fn read_record(&mut self) -> IoResult<GeoRecord> {
        let offset = self.scanner.pos();
        let raw_type = self.scanner.read_varint()?;
        let type_id = u16::try_from(raw_type)
            .map(TypeId)
            .map_err(|_| self.scanner.corrupt(format!("type id {raw_type} out of range")))?;
        let min = self.scanner.read_coord()?;
        let max = self.scanner.read_coord()?;
        match (min, max) {
            (Some(min), Some(max)) => Ok(GeoRecord { offset, type_id, bbox: GeoBox::new(min, max) }),
            _ => Err(self.scanner.corrupt(format!("record at {offset} has an invalid bounding box"))),
        }
    }
}
