//! Level selection: find, per record type, the coarsest grid level at which
//! the type's cells stay small.
//!
//! Starting at `min_level`, every round scans the data file and tallies the
//! records of all still undecided types per cell (a record counts in every
//! cell its bounding box covers).  A type is committed at the current level
//! when
//!
//! 1. its occupied / rectangle cell ratio is at or below `min_fill_rate`
//!    (sparse data gets no finer grid; a warning is reported),
//! 2. its fullest cell holds at most `cell_size_max` entries and the average
//!    occupied cell at most `cell_size_average`, or
//! 3. the current level is `max_level` (a warning is reported).
//!
//! All other types move on to the next level.  Committed levels never change,
//! so the level of a type only grows from round to round.

use std::collections::BTreeMap;

use geodb_core::{Cell, CellBox, GridIndexParameter, ImportProgress, Level, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::{DataFile, IndexResult};

/// Committed grid geometry of one record type.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeIndexLevel {
    pub type_id:        TypeId,
    pub level:          Level,
    /// Rectangle of all cells touched by the type's records.
    pub cells:          CellBox,
    /// Sum of per-cell entry counts.
    pub entries:        u64,
    pub occupied_cells: u64,
    pub max_cell_size:  usize,
}

impl TypeIndexLevel {
    pub fn fill_rate(&self) -> f64 {
        self.occupied_cells as f64 / self.cells.count() as f64
    }

    pub fn average_cell_size(&self) -> f64 {
        if self.occupied_cells == 0 {
            0.0
        } else {
            self.entries as f64 / self.occupied_cells as f64
        }
    }
}

/// Per-type tally of one round.
#[derive(Default)]
struct Tally {
    cells:   FxHashMap<Cell, usize>,
    rect:    Option<CellBox>,
    entries: u64,
}

impl Tally {
    fn add(&mut self, cells: CellBox) {
        for cell in cells.cells() {
            *self.cells.entry(cell).or_insert(0) += 1;
            self.entries += 1;
        }
        self.rect = Some(match self.rect {
            Some(r) => r
                .include(Cell::new(cells.x_start, cells.y_start))
                .include(Cell::new(cells.x_end, cells.y_end)),
            None => cells,
        });
    }

    fn commit(&self, type_id: TypeId, level: Level) -> Option<TypeIndexLevel> {
        Some(TypeIndexLevel {
            type_id,
            level,
            cells: self.rect?,
            entries: self.entries,
            occupied_cells: self.cells.len() as u64,
            max_cell_size: self.cells.values().copied().max().unwrap_or(0),
        })
    }
}

/// Choose the level of every type present in `data`.  Returns one entry per
/// type with at least one record, ascending by type id.
pub fn select_levels(
    data: &mut DataFile,
    param: &GridIndexParameter,
    progress: &mut dyn ImportProgress,
) -> IndexResult<Vec<TypeIndexLevel>> {
    let mut committed: BTreeMap<TypeId, TypeIndexLevel> = BTreeMap::new();
    let mut decided: FxHashSet<TypeId> = FxHashSet::default();
    let mut level = param.min_level;

    loop {
        progress.info(&format!("Analysing distribution at level {level}"));
        let mut tallies: BTreeMap<TypeId, Tally> = BTreeMap::new();
        data.scan(&mut |record| {
            if !decided.contains(&record.type_id) {
                tallies.entry(record.type_id).or_default().add(level.cells_of(&record.bbox));
            }
        })?;
        if tallies.is_empty() {
            break;
        }

        let mut carried = 0usize;
        for (type_id, tally) in &tallies {
            let Some(candidate) = tally.commit(*type_id, level) else {
                continue;
            };
            let fill_rate = candidate.fill_rate();
            let fits = candidate.max_cell_size <= param.cell_size_max
                && candidate.average_cell_size() <= param.cell_size_average;

            if fill_rate <= param.min_fill_rate {
                if !fits {
                    progress.warning(&format!(
                        "{type_id} is sparse at {level} (fill rate {fill_rate:.3}) but cells hold up to {} entries",
                        candidate.max_cell_size
                    ));
                }
            } else if !fits {
                if level < param.max_level {
                    carried += 1;
                    continue;
                }
                progress.warning(&format!(
                    "{type_id} still does not fit at the maximum {level} (max cell {}, average {:.1})",
                    candidate.max_cell_size,
                    candidate.average_cell_size()
                ));
            }

            debug!(
                type_id = type_id.0,
                level = level.0,
                cells = candidate.cells.count(),
                occupied = candidate.occupied_cells,
                entries = candidate.entries,
                "type level committed"
            );
            decided.insert(*type_id);
            committed.insert(*type_id, candidate);
        }

        if carried == 0 {
            break;
        }
        level = level.next();
    }

    Ok(committed.into_values().collect())
}
