//! Import configuration.
//!
//! Typically loaded from a JSON file by the import driver and handed to
//! every generator.  All fields are `pub`; call [`ImportParameter::validate`]
//! before a run.

use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult, Level};

// ── GridIndexParameter ────────────────────────────────────────────────────────

/// Level-selection limits for one record kind's grid index.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridIndexParameter {
    /// First level tried during level selection.
    pub min_level: Level,

    /// Level at which every still-undecided type is accepted, whether it fits
    /// the cell criteria or not.  Bounds the index size for badly distributed
    /// types.
    pub max_level: Level,

    /// Maximum number of entries in any single cell.
    pub cell_size_max: usize,

    /// Maximum average number of entries per occupied cell.
    pub cell_size_average: f64,

    /// Occupied / total cells ratio at or below which a type is accepted at
    /// the current level anyway (sparse data gets no finer grid).
    pub min_fill_rate: f64,
}

impl GridIndexParameter {
    pub fn nodes() -> Self {
        Self { min_level: Level(4), max_level: Level(20), ..Self::base() }
    }

    pub fn ways() -> Self {
        Self { min_level: Level(10), max_level: Level(15), ..Self::base() }
    }

    pub fn areas() -> Self {
        Self { min_level: Level(4), max_level: Level(17), ..Self::base() }
    }

    fn base() -> Self {
        Self {
            min_level:         Level(0),
            max_level:         Level(0),
            cell_size_max:     255,
            cell_size_average: 64.0,
            min_fill_rate:     0.1,
        }
    }

    fn validate(&self, what: &str) -> CoreResult<()> {
        if self.min_level > self.max_level {
            return Err(CoreError::Config(format!(
                "{what}: min_level {} is above max_level {}",
                self.min_level, self.max_level
            )));
        }
        if self.max_level > Level::MAX {
            return Err(CoreError::Config(format!(
                "{what}: max_level {} exceeds {}",
                self.max_level,
                Level::MAX
            )));
        }
        if self.cell_size_max == 0 || self.cell_size_average <= 0.0 {
            return Err(CoreError::Config(format!("{what}: cell size limits must be positive")));
        }
        Ok(())
    }
}

impl Default for GridIndexParameter {
    fn default() -> Self {
        Self::nodes()
    }
}

// ── ImportParameter ───────────────────────────────────────────────────────────

/// Top-level import configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImportParameter {
    /// Directory holding the upstream input files; every generated file is
    /// written here as well.
    pub destination_directory: PathBuf,

    /// Maximum number of raw coordinates resident in memory while sorting.
    pub raw_coord_block_size: usize,

    /// Key range covered by one sort page.
    pub coord_sort_page_size: u64,

    /// Number of slots per coordinate-store disk page.
    pub coord_disk_page_size: u32,

    /// Capacity of each pipeline queue (in pages).
    pub queue_capacity: usize,

    pub area_node_index: GridIndexParameter,
    pub area_way_index:  GridIndexParameter,
    pub area_area_index: GridIndexParameter,
}

impl ImportParameter {
    /// Defaults with the given destination directory.
    pub fn new(destination_directory: impl Into<PathBuf>) -> Self {
        Self { destination_directory: destination_directory.into(), ..Self::default() }
    }

    /// Full path of `file_name` inside the destination directory.
    pub fn destination_file(&self, file_name: &str) -> PathBuf {
        self.destination_directory.join(file_name)
    }

    pub fn destination(&self) -> &Path {
        &self.destination_directory
    }

    /// Reject parameter combinations the generators cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.raw_coord_block_size == 0 {
            return Err(CoreError::Config("raw_coord_block_size must be > 0".into()));
        }
        if self.coord_sort_page_size == 0 {
            return Err(CoreError::Config("coord_sort_page_size must be > 0".into()));
        }
        if self.coord_disk_page_size == 0 {
            return Err(CoreError::Config("coord_disk_page_size must be > 0".into()));
        }
        if self.queue_capacity == 0 {
            return Err(CoreError::Config("queue_capacity must be > 0".into()));
        }
        self.area_node_index.validate("area_node_index")?;
        self.area_way_index.validate("area_way_index")?;
        self.area_area_index.validate("area_area_index")?;
        Ok(())
    }
}

impl Default for ImportParameter {
    fn default() -> Self {
        Self {
            destination_directory: PathBuf::from("."),
            raw_coord_block_size:  60_000_000,
            coord_sort_page_size:  100_000_000,
            coord_disk_page_size:  64,
            queue_capacity:        10_000,
            area_node_index:       GridIndexParameter::nodes(),
            area_way_index:        GridIndexParameter::ways(),
            area_area_index:       GridIndexParameter::areas(),
        }
    }
}
