//! The cell grid.

use crate::bug::BugKey;
use crate::constants::FOOD_START;
use crate::hex::{CellPos, GridBounds};
use serde::{Deserialize, Serialize};

/// One cell: its food store, the squatting bug if any, and the distance to
/// the nearest bug as of the last food pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cell {
    pub food: i64,
    pub bug: Option<BugKey>,
    /// 0 when occupied, -1 when no bug is near.
    pub nearest: i32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            food: FOOD_START,
            bug: None,
            nearest: -1,
        }
    }
}

/// Row-major cell storage over toroidal hex bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGrid {
    bounds: GridBounds,
    cells: Vec<Cell>,
}

impl WorldGrid {
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: vec![Cell::default(); bounds.area()],
        }
    }

    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    #[inline]
    fn offset(&self, p: CellPos) -> usize {
        (p.y as usize) * (self.bounds.width as usize) + (p.x as usize)
    }

    #[must_use]
    pub fn cell(&self, p: CellPos) -> &Cell {
        &self.cells[self.offset(p)]
    }

    #[must_use]
    pub fn cell_mut(&mut self, p: CellPos) -> &mut Cell {
        let idx = self.offset(p);
        &mut self.cells[idx]
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// One step from `p` in `dir`, wrapping toroidally.
    #[must_use]
    pub fn step(&self, p: CellPos, dir: i32) -> CellPos {
        self.bounds.step(p, dir)
    }

    /// Number of cells currently holding a bug.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.bug.is_some()).count()
    }
}
