use serde::{Deserialize, Serialize};

use crate::*;
pub use fixed::*;
pub use random::*;

mod fixed;
mod random;

/// Decides where the mines go on a freshly allocated grid.
pub trait MinefieldGenerator {
    fn generate(self, grid: &mut Grid) -> Result<()>;
}

/// Whether the engine opens a cell on its own before the player's first move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartReveal {
    /// Leave every cell hidden.
    Untouched,
    /// Open a random zero-count cell when one exists, otherwise leave the board untouched.
    #[default]
    AlwaysZero,
}

/// Clears any previous placement so generators always start from an empty field.
fn clear_mines(grid: &mut Grid) {
    for cell in grid.cells_mut() {
        cell.is_mine = false;
    }
    grid.set_mine_count(0);
}

fn check_mine_count(grid: &Grid, mines: CellCount) -> Result<()> {
    let total_cells = grid.total_cells();
    if mines < total_cells {
        Ok(())
    } else {
        Err(GameError::InvalidMineCount { mines, total_cells })
    }
}
