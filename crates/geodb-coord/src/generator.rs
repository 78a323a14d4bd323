//! Builds `coord.dat` from `rawcoord.dat`.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use geodb_core::{ExternalId, ImportParameter, ImportProgress};
use geodb_io::FileWriter;
use geodb_sort::{DiskPage, ExternalSorter, Page, PageSplitter, SortError, SortStats};
use geodb_sync::BoundedTaskQueue;
use tracing::{debug, info};

use crate::store::SLOT_SIZE;
use crate::{
    COORD_DAT, CoordError, CoordResult, Point, RAW_COORD_DAT, RawCoord, RawCoordFile,
    RawCoordKey, SERIAL_OVERFLOW, SerialAssignment,
};

/// Figures reported by [`CoordDataGenerator::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoordStats {
    /// Entries of the raw coordinate file.
    pub coords: u64,
    /// Positions shared by more than one coordinate.
    pub duplicate_positions: usize,
    /// Coordinates that share their position with an earlier one.
    pub duplicate_coords: u64,
    /// Coordinates dropped because their position ran out of serials.
    pub dropped: u64,
    /// Disk pages written to `coord.dat`.
    pub pages_written: u64,
    pub detect_rounds: u32,
    pub store_rounds: u32,
}

/// Two-pass coordinate deduplicator.
pub struct CoordDataGenerator<'a> {
    param: &'a ImportParameter,
}

impl<'a> CoordDataGenerator<'a> {
    pub fn new(param: &'a ImportParameter) -> Self {
        Self { param }
    }

    fn sorter(&self) -> ExternalSorter {
        ExternalSorter::new(self.param.raw_coord_block_size, self.param.coord_sort_page_size)
    }

    pub fn run(&self, progress: &mut dyn ImportProgress) -> CoordResult<CoordStats> {
        self.param.validate()?;
        let raw_path = self.param.destination_file(RAW_COORD_DAT);
        let mut stats = CoordStats::default();

        progress.info("Detecting duplicate coordinates");
        let mut serials = SerialAssignment::new();
        let mut source = RawCoordFile::open(&raw_path, RawCoordKey::Position)?;
        stats.coords = source.count() as u64;
        let sort = self.pipeline(&mut source, |page| {
            for pair in page.entries.windows(2) {
                if pair[0].0 == pair[1].0 {
                    serials.mark_duplicate(pair[1].0);
                    stats.duplicate_coords += 1;
                }
            }
            Ok(())
        })?;
        stats.detect_rounds = sort.rounds;
        stats.duplicate_positions = serials.len();
        progress.info(&format!(
            "Found {} duplicate coordinates at {} positions",
            stats.duplicate_coords, stats.duplicate_positions
        ));

        progress.info("Storing coordinates");
        let store_path = self.param.destination_file(COORD_DAT);
        let mut source = RawCoordFile::open(&raw_path, RawCoordKey::ExternalId)?;
        let mut writer = CoordStoreWriter::create(&store_path, self.param.coord_disk_page_size)?;
        let written = self.pipeline(&mut source, |page| {
            for (key, raw) in page.entries {
                let serial = serials.next_serial(raw.coord.position_key());
                if serial == SERIAL_OVERFLOW {
                    progress.error(&format!(
                        "Coordinate {} {} has more than {} nodes",
                        raw.id, raw.coord, SERIAL_OVERFLOW
                    ));
                    stats.dropped += 1;
                    continue;
                }
                writer.push(key, Point { serial, coord: raw.coord })?;
            }
            Ok(())
        });
        let sort = match written.and_then(|sort| writer.finish().map(|pages| (sort, pages))) {
            Ok((sort, pages)) => {
                stats.pages_written = pages;
                sort
            }
            Err(e) => {
                writer.abort();
                return Err(e);
            }
        };
        stats.store_rounds = sort.rounds;
        progress.info(&format!(
            "Written {} pages to '{}'",
            stats.pages_written,
            store_path.display()
        ));
        Ok(stats)
    }

    /// Run reader → page sort → `consume` as three threads.  Any failure
    /// stops both queues so the other stages wind down.
    fn pipeline<F>(&self, source: &mut RawCoordFile, mut consume: F) -> CoordResult<SortStats>
    where
        F: FnMut(Page<RawCoord>) -> CoordResult<()>,
    {
        let capacity = self.param.queue_capacity;
        let unsorted = BoundedTaskQueue::<Page<RawCoord>>::new(capacity);
        let sorted = BoundedTaskQueue::<Page<RawCoord>>::new(capacity);
        let sorter = self.sorter();

        thread::scope(|s| {
            let reader = s.spawn(|| {
                let res = sorter.run(source, &mut |page| unsorted.push(page));
                unsorted.stop();
                if res.is_err() {
                    sorted.stop();
                }
                res
            });

            let sort_stage = s.spawn(|| {
                while let Some(mut page) = unsorted.pop() {
                    page.sort();
                    if !sorted.push(page) {
                        unsorted.stop();
                        break;
                    }
                }
                sorted.stop();
            });

            let mut consumed = Ok(());
            while let Some(page) = sorted.pop() {
                debug!(page = page.index, entries = page.entries.len(), "consuming page");
                if let Err(e) = consume(page) {
                    consumed = Err(e);
                    sorted.stop();
                    unsorted.stop();
                    break;
                }
            }

            let read = reader.join().map_err(|_| CoordError::WorkerPanicked("reader"))?;
            sort_stage.join().map_err(|_| CoordError::WorkerPanicked("sort"))?;
            consumed?;
            Ok(read?)
        })
    }
}

// ── coord.dat writer ──────────────────────────────────────────────────────────

/// Writes disk pages as the splitter completes them and the page index at
/// the end.  See [`crate::store`] for the layout.
struct CoordStoreWriter {
    path:     PathBuf,
    writer:   FileWriter,
    splitter: PageSplitter<Point>,
    index:    Vec<(ExternalId, u64)>,
}

impl CoordStoreWriter {
    fn create(path: &Path, disk_page_size: u32) -> CoordResult<Self> {
        let mut writer = FileWriter::create(path)?;
        info!(path = %path.display(), "writing coordinate store");
        writer.write_u64(0)?;
        writer.write_u32(disk_page_size)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            splitter: PageSplitter::new(disk_page_size as u64)?,
            index: Vec::new(),
        })
    }

    fn push(&mut self, key: u64, point: Point) -> CoordResult<()> {
        if let Some(page) = self.splitter.push(key, point)? {
            self.write_page(page)?;
        }
        Ok(())
    }

    fn write_page(&mut self, page: DiskPage<Point>) -> CoordResult<()> {
        if page.occupied() == 0 {
            return Ok(());
        }
        let offset = self.writer.pos();
        for slot in &page.slots {
            match slot {
                Some(p) => {
                    self.writer.write_u8(p.serial)?;
                    self.writer.write_coord(p.coord)?;
                }
                None => {
                    self.writer.write_u8(0)?;
                    self.writer.write_invalid_coord()?;
                }
            }
        }
        debug_assert_eq!(self.writer.pos() - offset, page.slots.len() as u64 * SLOT_SIZE);
        self.index.push((ExternalId::from_sort_key(page.first_key()), offset));
        Ok(())
    }

    /// Flush the last page, write the index, patch the header.  Returns the
    /// number of pages written.
    fn finish(&mut self) -> CoordResult<u64> {
        if let Some(page) = self.splitter.finish() {
            self.write_page(page)?;
        }
        let index_offset = self.writer.pos();
        let count = u32::try_from(self.index.len())
            .map_err(|_| SortError::Corrupt(format!("{} disk pages exceed the index format", self.index.len())))?;
        self.writer.write_u32(count)?;
        for (id, offset) in &self.index {
            self.writer.write_i64(id.0)?;
            self.writer.write_u64(*offset)?;
        }
        self.writer.set_pos(0)?;
        self.writer.write_u64(index_offset)?;
        self.writer.close()?;
        Ok(self.index.len() as u64)
    }

    /// Close without flushing and remove the partial file.
    fn abort(&mut self) {
        self.writer.close_failsafe();
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "cannot remove partial file");
        }
    }
}
