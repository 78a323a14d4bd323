//! Writes a grid bitmap index file from a data file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use geodb_core::{Cell, FileOffset, GridIndexParameter, ImportProgress, Level, TypeId};
use geodb_io::{FileWriter, varint};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::{DataFile, IndexResult, RecordKind, TypeIndexLevel, select_levels};

/// Figures reported by [`GridBitmapIndexBuilder::build`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexStats {
    /// Types written to the index.
    pub types:      usize,
    /// Sum of cell entries over all types.
    pub entries:    u64,
    /// Bytes of bitmaps plus cell data.
    pub index_size: u64,
    /// Number of types per level.
    pub levels:     BTreeMap<Level, usize>,
}

/// Builds one area index (`areanode.idx`, `areaway.idx` or `areaarea.idx`).
///
/// Any previous index file is removed first.  If the build fails the partial
/// file is removed too, so an index file exists only if it is complete.
pub struct GridBitmapIndexBuilder<'a> {
    param:      &'a GridIndexParameter,
    data_path:  PathBuf,
    index_path: PathBuf,
}

impl<'a> GridBitmapIndexBuilder<'a> {
    pub fn new(param: &'a GridIndexParameter, data_path: PathBuf, index_path: PathBuf) -> Self {
        Self { param, data_path, index_path }
    }

    /// Builder for the standard files of `kind` inside `directory`.
    pub fn for_kind(param: &'a GridIndexParameter, directory: &Path, kind: RecordKind) -> Self {
        Self::new(param, directory.join(kind.data_file()), directory.join(kind.index_file()))
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn build(&self, progress: &mut dyn ImportProgress) -> IndexResult<IndexStats> {
        remove_stale(&self.index_path);

        let mut data = DataFile::open(&self.data_path)?;
        progress.info(&format!(
            "Analysing distribution of {} records in '{}'",
            data.count(),
            self.data_path.display()
        ));
        let types = select_levels(&mut data, self.param, progress)?;

        progress.info(&format!("Writing file '{}'", self.index_path.display()));
        let mut writer = FileWriter::create(&self.index_path)?;
        match write_index(&mut writer, &mut data, &types, progress) {
            Ok(stats) => {
                info!(path = %self.index_path.display(), types = stats.types, size = stats.index_size, "index written");
                Ok(stats)
            }
            Err(e) => {
                writer.close_failsafe();
                remove_stale(&self.index_path);
                Err(e)
            }
        }
    }
}

fn remove_stale(path: &Path) {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => {
            debug!(path = %path.display(), error = %e, "cannot remove index file");
        }
        _ => {}
    }
}

fn write_index(
    writer: &mut FileWriter,
    data: &mut DataFile,
    types: &[TypeIndexLevel],
    progress: &mut dyn ImportProgress,
) -> IndexResult<IndexStats> {
    let mut stats = IndexStats { types: types.len(), ..IndexStats::default() };

    // Header; bitmap offsets and widths are patched once known.
    writer.write_u32(0)?;
    let mut header_slots: FxHashMap<TypeId, u64> = FxHashMap::default();
    for t in types {
        writer.write_varint(t.type_id.0 as u64)?;
        header_slots.insert(t.type_id, writer.pos());
        writer.write_u64(0)?;
        writer.write_u8(0)?;
        writer.write_varint(t.level.0 as u64)?;
        writer.write_varint(t.cells.x_start as u64)?;
        writer.write_varint(t.cells.x_end as u64)?;
        writer.write_varint(t.cells.y_start as u64)?;
        writer.write_varint(t.cells.y_end as u64)?;
    }

    let mut by_level: BTreeMap<Level, Vec<&TypeIndexLevel>> = BTreeMap::new();
    for t in types {
        by_level.entry(t.level).or_default().push(t);
    }

    for (level, level_types) in &by_level {
        stats.levels.insert(*level, level_types.len());
        progress.info(&format!("Scanning for {} types at {level}", level_types.len()));

        let wanted: FxHashMap<TypeId, usize> =
            level_types.iter().enumerate().map(|(i, t)| (t.type_id, i)).collect();
        let mut cell_lists: Vec<BTreeMap<Cell, Vec<FileOffset>>> = vec![BTreeMap::new(); level_types.len()];
        data.scan(&mut |record| {
            if let Some(&i) = wanted.get(&record.type_id) {
                for cell in level.cells_of(&record.bbox).cells() {
                    cell_lists[i].entry(cell).or_default().push(record.offset);
                }
            }
        })?;

        for (t, cells) in level_types.iter().zip(&cell_lists) {
            let Some(&header_pos) = header_slots.get(&t.type_id) else {
                continue;
            };
            let size = write_type(writer, header_pos, t, cells)?;
            stats.index_size += size;
            stats.entries += t.entries;
            progress.debug(&format!(
                "{}: {level}, {} cells ({} occupied, fill rate {:.3}), {} entries, max cell {}, {} bytes",
                t.type_id,
                t.cells.count(),
                t.occupied_cells,
                t.fill_rate(),
                t.entries,
                t.max_cell_size,
                size
            ));
        }
    }

    writer.set_pos(0)?;
    writer.write_u32(types.len() as u32)?;
    writer.close()?;
    Ok(stats)
}

/// Append the bitmap and cell data of one type and patch its header slot.
/// Slot values are `cell data position + 1`; 0 marks an empty cell.
/// Returns the bytes appended.
fn write_type(
    writer: &mut FileWriter,
    header_pos: u64,
    t: &TypeIndexLevel,
    cells: &BTreeMap<Cell, Vec<FileOffset>>,
) -> IndexResult<u64> {
    let mut cell_data = Vec::new();
    let mut cell_positions = Vec::with_capacity(cells.len());
    for (cell, offsets) in cells {
        cell_positions.push((*cell, cell_data.len() as u64));
        encode_offsets(offsets, &mut cell_data);
    }

    let width = varint::bytes_needed(cell_data.len() as u64 + 1);
    let mut bitmap = vec![0u64; t.cells.count() as usize];
    for (cell, pos) in cell_positions {
        bitmap[t.cells.slot_of(cell) as usize] = pos + 1;
    }

    let bitmap_pos = writer.pos();
    writer.set_pos(header_pos)?;
    writer.write_u64(bitmap_pos)?;
    writer.write_u8(width)?;
    writer.set_pos(bitmap_pos)?;

    for slot in bitmap {
        writer.write_file_offset(slot, width)?;
    }
    writer.write_bytes(&cell_data)?;
    Ok(writer.pos() - bitmap_pos)
}

/// Encode an ascending offset list: count, first offset, then deltas.
pub(crate) fn encode_offsets(offsets: &[FileOffset], buf: &mut Vec<u8>) {
    varint::encode(offsets.len() as u64, buf);
    let mut previous = 0;
    for &offset in offsets {
        varint::encode(offset - previous, buf);
        previous = offset;
    }
}
