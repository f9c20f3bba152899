use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular arena of cells stored row-major, addressable by `(x, y)` or by linear index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
    mine_count: CellCount,
}

impl Grid {
    /// Builds an empty board: no mines, every cell hidden.
    pub fn allocate(width: Coord, height: Coord) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidDimension);
        }

        let cells = Array2::from_shape_fn(
            (usize::from(height), usize::from(width)),
            |(row, column)| Cell::new(column as Coord, row as Coord),
        );
        log::debug!("Allocated {}x{} grid", width, height);

        Ok(Self {
            cells,
            mine_count: 0,
        })
    }

    /// `(width, height)` of the board.
    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.cells.dim();
        (columns as Coord, rows as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (width, height) = self.size();
        mult(width, height)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// Counts mines around `coords` straight from the placement, ignoring the stored annotation.
    pub fn count_adjacent_mines(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self[pos].is_mine)
            .count() as u8
    }

    pub(crate) fn index_of(&self, (x, y): Coord2) -> usize {
        usize::from(y) * usize::from(self.width()) + usize::from(x)
    }

    pub(crate) fn coords_of(&self, index: usize) -> Coord2 {
        let width = usize::from(self.width());
        ((index % width) as Coord, (index / width) as Coord)
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub(crate) fn set_mine_count(&mut self, mine_count: CellCount) {
        self.mine_count = mine_count;
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}
