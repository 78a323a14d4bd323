//! The handle set of an opened destination directory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use geodb_coord::{COORD_DAT, CoordStore, Point};
use geodb_core::{ExternalId, GeoBox, TypeId};
use geodb_index::{GridIndexReader, OffsetQuery, RecordKind};
use geodb_sync::{ReentrantRWLatch, SharedGuard};
use tracing::{debug, info};

use crate::{DbError, DbResult};

/// Files opened from one directory.  A file that does not exist is `None`.
struct OpenFiles {
    directory:  PathBuf,
    area_node:  Option<GridIndexReader>,
    area_way:   Option<GridIndexReader>,
    area_area:  Option<GridIndexReader>,
    coords:     Option<CoordStore>,
}

impl OpenFiles {
    fn load(directory: &Path) -> DbResult<Self> {
        let coord_path = directory.join(COORD_DAT);
        let coords = if coord_path.exists() {
            Some(CoordStore::open(&coord_path)?)
        } else {
            debug!(path = %coord_path.display(), "coordinate store not built");
            None
        };
        Ok(Self {
            directory: directory.to_path_buf(),
            area_node: open_index(directory, RecordKind::Node)?,
            area_way:  open_index(directory, RecordKind::Way)?,
            area_area: open_index(directory, RecordKind::Area)?,
            coords,
        })
    }

    fn index(&self, kind: RecordKind) -> DbResult<&GridIndexReader> {
        let reader = match kind {
            RecordKind::Node => &self.area_node,
            RecordKind::Way  => &self.area_way,
            RecordKind::Area => &self.area_area,
        };
        reader.as_ref().ok_or_else(|| DbError::NotBuilt(self.directory.join(kind.index_file())))
    }

    fn coords(&self) -> DbResult<&CoordStore> {
        self.coords.as_ref().ok_or_else(|| DbError::NotBuilt(self.directory.join(COORD_DAT)))
    }
}

fn open_index(directory: &Path, kind: RecordKind) -> DbResult<Option<GridIndexReader>> {
    let path = directory.join(kind.index_file());
    if !path.exists() {
        debug!(path = %path.display(), "{kind} index not built");
        return Ok(None);
    }
    Ok(Some(GridIndexReader::open(&path)?))
}

/// Shared, thread-safe access to the generated files of one import.
///
/// Every query holds the latch shared for its whole duration; `open`,
/// `close` and `reload` hold it exclusively.  The latch is reentrant, so a
/// caller may hold [`lock_shared`](Self::lock_shared) across several queries
/// and a thread holding the exclusive side may still query.
#[derive(Default)]
pub struct Database {
    latch: ReentrantRWLatch,
    files: Mutex<Option<Arc<OpenFiles>>>,
}

impl Database {
    /// A closed database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the files in `directory`.  Missing files are tolerated; queries
    /// against them fail with [`DbError::NotBuilt`].
    pub fn open(&self, directory: &Path) -> DbResult<()> {
        let _guard = self.latch.lock();
        if let Some(files) = self.current() {
            return Err(DbError::AlreadyOpen(files.directory.clone()));
        }
        let files = OpenFiles::load(directory)?;
        info!(directory = %directory.display(), "database opened");
        self.replace(Some(files));
        Ok(())
    }

    /// Drop every handle.  Idempotent.
    pub fn close(&self) {
        let _guard = self.latch.lock();
        if self.current().is_some() {
            self.replace(None);
            info!("database closed");
        }
    }

    /// Reopen all files of the current directory, e.g. after a new import.
    /// On failure the previous handles stay in place.
    pub fn reload(&self) -> DbResult<()> {
        let _guard = self.latch.lock();
        let current = self.current().ok_or(DbError::NotOpen)?;
        let files = OpenFiles::load(&current.directory)?;
        info!(directory = %current.directory.display(), "database reloaded");
        self.replace(Some(files));
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        let _guard = self.latch.lock_shared();
        self.current().is_some()
    }

    pub fn directory(&self) -> Option<PathBuf> {
        let _guard = self.latch.lock_shared();
        self.current().map(|files| files.directory.clone())
    }

    /// Hold the handle set fixed across several queries.
    pub fn lock_shared(&self) -> SharedGuard<'_> {
        self.latch.lock_shared()
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Offsets into `nodes.dat` of the nodes of `types` near `bbox`.
    pub fn node_offsets(&self, bbox: &GeoBox, types: &[TypeId]) -> DbResult<OffsetQuery> {
        self.offsets(RecordKind::Node, bbox, types)
    }

    /// Offsets into `ways.dat` of the ways of `types` near `bbox`.
    pub fn way_offsets(&self, bbox: &GeoBox, types: &[TypeId]) -> DbResult<OffsetQuery> {
        self.offsets(RecordKind::Way, bbox, types)
    }

    /// Offsets into `areas.dat` of the areas of `types` near `bbox`.
    pub fn area_offsets(&self, bbox: &GeoBox, types: &[TypeId]) -> DbResult<OffsetQuery> {
        self.offsets(RecordKind::Area, bbox, types)
    }

    pub fn offsets(&self, kind: RecordKind, bbox: &GeoBox, types: &[TypeId]) -> DbResult<OffsetQuery> {
        self.read(|files| Ok(files.index(kind)?.offsets(bbox, types)?))
    }

    /// The stored point of `id`; `None` if the id is unknown.
    pub fn coord(&self, id: ExternalId) -> DbResult<Option<Point>> {
        self.read(|files| Ok(files.coords()?.get(id)?))
    }

    /// Batch variant of [`coord`](Self::coord), aligned with `ids`.
    pub fn coords(&self, ids: &[ExternalId]) -> DbResult<Vec<Option<Point>>> {
        self.read(|files| Ok(files.coords()?.get_many(ids)?))
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn read<T>(&self, query: impl FnOnce(&OpenFiles) -> DbResult<T>) -> DbResult<T> {
        let _guard = self.latch.lock_shared();
        let files = self.current().ok_or(DbError::NotOpen)?;
        query(&files)
    }

    fn current(&self) -> Option<Arc<OpenFiles>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace(&self, files: Option<OpenFiles>) {
        *self.files.lock().unwrap_or_else(PoisonError::into_inner) = files.map(Arc::new);
    }
}
