//! The import step abstraction and the standard steps.

use geodb_coord::{COORD_DAT, CoordDataGenerator};
use geodb_core::{GridIndexParameter, ImportParameter, ImportProgress};
use geodb_index::{GridBitmapIndexBuilder, RecordKind};

use crate::ImportResult;

/// One step of an import.
///
/// Modules read their inputs from and write their outputs to
/// [`ImportParameter::destination_directory`].
pub trait ImportModule {
    fn name(&self) -> &'static str;

    /// One-line summary shown when the step starts.
    fn description(&self) -> &'static str;

    /// File names this module writes.
    fn provides(&self) -> Vec<&'static str>;

    fn run(&self, param: &ImportParameter, progress: &mut dyn ImportProgress) -> ImportResult<()>;
}

// ── CoordDataModule ───────────────────────────────────────────────────────────

/// Builds `coord.dat` from `rawcoord.dat`.
pub struct CoordDataModule;

impl ImportModule for CoordDataModule {
    fn name(&self) -> &'static str {
        "CoordDataGenerator"
    }

    fn description(&self) -> &'static str {
        "Deduplicate raw coordinates and write the coordinate store"
    }

    fn provides(&self) -> Vec<&'static str> {
        vec![COORD_DAT]
    }

    fn run(&self, param: &ImportParameter, progress: &mut dyn ImportProgress) -> ImportResult<()> {
        let stats = CoordDataGenerator::new(param).run(progress)?;
        progress.info(&format!(
            "{} coordinates, {} positions shared by {} coordinates, {} dropped, {} disk pages",
            stats.coords, stats.duplicate_positions, stats.duplicate_coords, stats.dropped, stats.pages_written
        ));
        Ok(())
    }
}

// ── AreaIndexModule ───────────────────────────────────────────────────────────

/// Builds the grid index of one record kind.
pub struct AreaIndexModule {
    kind: RecordKind,
}

impl AreaIndexModule {
    pub fn new(kind: RecordKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    fn parameter<'p>(&self, param: &'p ImportParameter) -> &'p GridIndexParameter {
        match self.kind {
            RecordKind::Node => &param.area_node_index,
            RecordKind::Way  => &param.area_way_index,
            RecordKind::Area => &param.area_area_index,
        }
    }
}

impl ImportModule for AreaIndexModule {
    fn name(&self) -> &'static str {
        match self.kind {
            RecordKind::Node => "AreaNodeIndexGenerator",
            RecordKind::Way  => "AreaWayIndexGenerator",
            RecordKind::Area => "AreaAreaIndexGenerator",
        }
    }

    fn description(&self) -> &'static str {
        match self.kind {
            RecordKind::Node => "Generate 'areanode.idx'",
            RecordKind::Way  => "Generate 'areaway.idx'",
            RecordKind::Area => "Generate 'areaarea.idx'",
        }
    }

    fn provides(&self) -> Vec<&'static str> {
        vec![self.kind.index_file()]
    }

    fn run(&self, param: &ImportParameter, progress: &mut dyn ImportProgress) -> ImportResult<()> {
        let grid = self.parameter(param);
        let stats = GridBitmapIndexBuilder::for_kind(grid, param.destination(), self.kind).build(progress)?;
        let levels: Vec<String> = stats.levels.iter().map(|(level, n)| format!("{level}: {n}")).collect();
        progress.info(&format!(
            "{} {} types, {} entries, {} bytes ({})",
            stats.types,
            self.kind,
            stats.entries,
            stats.index_size,
            levels.join(", ")
        ));
        Ok(())
    }
}
