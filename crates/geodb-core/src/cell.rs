//! The uniform global grid used by the area indexes.
//!
//! At level `L` the globe is split into `2^L × 2^L` cells, each
//! `360 / 2^L` degrees wide and `180 / 2^L` degrees high.  Cell `(0, 0)` is
//! the south-west corner at (-90, -180).
//!
//! `Cell` orders by `(y, x)` so that a `BTreeMap<Cell, _>` iterates in
//! bitmap row order; the reader relies on the cell lists of one bitmap row
//! being written back to back.

use std::fmt;

use crate::{GeoBox, GeoCoord};

// ── Level ─────────────────────────────────────────────────────────────────────

/// Grid magnification level.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Level(pub u32);

impl Level {
    /// Highest level whose cell count per axis still fits a `u32`.
    pub const MAX: Level = Level(30);

    /// Number of cells along each axis.
    #[inline]
    pub fn cells_per_axis(self) -> u32 {
        1u32 << self.0
    }

    #[inline]
    pub fn cell_width(self) -> f64 {
        360.0 / self.cells_per_axis() as f64
    }

    #[inline]
    pub fn cell_height(self) -> f64 {
        180.0 / self.cells_per_axis() as f64
    }

    #[inline]
    pub fn next(self) -> Level {
        Level(self.0 + 1)
    }

    /// The cell containing `c`.  Coordinates on the north / east border fall
    /// into the last row / column.
    pub fn cell_of(self, c: GeoCoord) -> Cell {
        let last = (self.cells_per_axis() - 1) as f64;
        let x = ((c.lon + 180.0) / self.cell_width()).floor().clamp(0.0, last);
        let y = ((c.lat + 90.0) / self.cell_height()).floor().clamp(0.0, last);
        Cell { x: x as u32, y: y as u32 }
    }

    /// The rectangle of cells covered by `bbox`.
    pub fn cells_of(self, bbox: &GeoBox) -> CellBox {
        CellBox::spanning(self.cell_of(bbox.min), self.cell_of(bbox.max))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

// ── Cell ──────────────────────────────────────────────────────────────────────

/// Integer address of one grid cell.  Field order gives `(y, x)` ordering.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Cell {
    pub y: u32,
    pub x: u32,
}

impl Cell {
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { y, x }
    }
}

// ── CellBox ───────────────────────────────────────────────────────────────────

/// Inclusive rectangle of cells.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct CellBox {
    pub x_start: u32,
    pub x_end:   u32,
    pub y_start: u32,
    pub y_end:   u32,
}

impl CellBox {
    pub fn from_cell(c: Cell) -> Self {
        Self { x_start: c.x, x_end: c.x, y_start: c.y, y_end: c.y }
    }

    pub fn spanning(a: Cell, b: Cell) -> Self {
        Self {
            x_start: a.x.min(b.x),
            x_end:   a.x.max(b.x),
            y_start: a.y.min(b.y),
            y_end:   a.y.max(b.y),
        }
    }

    /// Grow the rectangle to contain `c`.
    pub fn include(self, c: Cell) -> Self {
        Self {
            x_start: self.x_start.min(c.x),
            x_end:   self.x_end.max(c.x),
            y_start: self.y_start.min(c.y),
            y_end:   self.y_end.max(c.y),
        }
    }

    #[inline]
    pub fn width(&self) -> u64 {
        (self.x_end - self.x_start) as u64 + 1
    }

    #[inline]
    pub fn height(&self) -> u64 {
        (self.y_end - self.y_start) as u64 + 1
    }

    /// Number of cells in the rectangle.
    #[inline]
    pub fn count(&self) -> u64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn contains(&self, c: Cell) -> bool {
        (self.x_start..=self.x_end).contains(&c.x) && (self.y_start..=self.y_end).contains(&c.y)
    }

    /// Row-major slot of `c` inside the rectangle.  `c` must be contained.
    #[inline]
    pub fn slot_of(&self, c: Cell) -> u64 {
        (c.y - self.y_start) as u64 * self.width() + (c.x - self.x_start) as u64
    }

    /// Overlap of two rectangles, `None` if they are disjoint.
    pub fn intersection(&self, other: &CellBox) -> Option<CellBox> {
        let x_start = self.x_start.max(other.x_start);
        let x_end   = self.x_end.min(other.x_end);
        let y_start = self.y_start.max(other.y_start);
        let y_end   = self.y_end.min(other.y_end);
        (x_start <= x_end && y_start <= y_end).then_some(CellBox { x_start, x_end, y_start, y_end })
    }

    /// Iterate all cells in `(y, x)` order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.y_start..=self.y_end)
            .flat_map(move |y| (self.x_start..=self.x_end).map(move |x| Cell { y, x }))
    }
}

impl fmt::Display for CellBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]x[{}..{}]", self.x_start, self.x_end, self.y_start, self.y_end)
    }
}
