use serde::{Deserialize, Serialize};

use crate::*;

/// Player-facing marker state of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealState {
    #[default]
    Hidden,
    Revealed,
    Flagged,
    Questioned,
}

impl RevealState {
    pub const fn is_unrevealed(self) -> bool {
        !matches!(self, Self::Revealed)
    }

    pub const fn is_marked(self) -> bool {
        matches!(self, Self::Flagged | Self::Questioned)
    }
}

/// Sentinel stored in [`Cell::adjacent_mine_count`] for mine cells.
pub const MINE_SENTINEL: i8 = -1;

/// One square of the board. Cells are owned by the [`Grid`] and only mutated by the engine, everything outside the
/// crate gets a shared reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) column: Coord,
    pub(crate) row: Coord,
    pub(crate) is_mine: bool,
    pub(crate) adjacent_mine_count: i8,
    pub(crate) reveal_state: RevealState,
    pub(crate) was_triggered: bool,
}

impl Cell {
    pub(crate) const fn new(column: Coord, row: Coord) -> Self {
        Self {
            column,
            row,
            is_mine: false,
            adjacent_mine_count: 0,
            reveal_state: RevealState::Hidden,
            was_triggered: false,
        }
    }

    pub const fn column(&self) -> Coord {
        self.column
    }

    pub const fn row(&self) -> Coord {
        self.row
    }

    pub const fn coords(&self) -> Coord2 {
        (self.column, self.row)
    }

    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    /// Mines in the 8-neighborhood, or [`MINE_SENTINEL`] when the cell is itself a mine.
    pub const fn adjacent_mine_count(&self) -> i8 {
        self.adjacent_mine_count
    }

    /// The neighborhood count for safe cells, `None` for mines.
    pub fn number(&self) -> Option<u8> {
        u8::try_from(self.adjacent_mine_count).ok()
    }

    pub const fn reveal_state(&self) -> RevealState {
        self.reveal_state
    }

    pub const fn is_revealed(&self) -> bool {
        matches!(self.reveal_state, RevealState::Revealed)
    }

    /// Only set on the mine that ended the game.
    pub const fn was_triggered(&self) -> bool {
        self.was_triggered
    }

    pub(crate) const fn is_opening(&self) -> bool {
        !self.is_mine && self.adjacent_mine_count == 0
    }
}
