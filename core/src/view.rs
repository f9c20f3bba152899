use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a front end should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Questioned,
    Open(u8),
    /// A mine shown at the end of the game, or at any time in debug mode.
    Mine,
    /// The mine that ended the game.
    Exploded,
    /// A flag on a safe cell, only shown after a loss.
    WrongFlag,
}

impl CellView {
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged | Self::Questioned | Self::WrongFlag)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Player,
    /// Shows hidden mines, for debugging boards.
    Debug,
}

/// Read-only snapshot of a game, safe to hand to a renderer or serialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub size: Coord2,
    pub remaining_flags: isize,
    pub outcome: GameOutcome,
    pub cells: Array2<CellView>,
}

impl BoardView {
    pub fn from_game(game: &Game) -> Self {
        Self::from_game_with_mode(game, ViewMode::Player)
    }

    pub fn from_game_with_mode(game: &Game, mode: ViewMode) -> Self {
        let size = game.size();
        let outcome = game.outcome();
        let mut cells = Array2::from_elem(size.to_nd_index(), CellView::Hidden);

        for cell in game.grid().iter() {
            cells[cell.coords().to_nd_index()] = cell_view(cell, outcome, mode);
        }

        Self {
            size,
            remaining_flags: game.remaining_flag_count(),
            outcome,
            cells,
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }
}

fn cell_view(cell: &Cell, outcome: GameOutcome, mode: ViewMode) -> CellView {
    use RevealState::*;

    match cell.reveal_state() {
        Revealed if cell.was_triggered() => CellView::Exploded,
        Revealed => cell.number().map_or(CellView::Mine, CellView::Open),
        Flagged if outcome == GameOutcome::Lost && !cell.is_mine() => CellView::WrongFlag,
        _ if mode == ViewMode::Debug && cell.is_mine() => CellView::Mine,
        Flagged => CellView::Flagged,
        Questioned => CellView::Questioned,
        Hidden => CellView::Hidden,
    }
}

impl Game {
    pub fn view(&self) -> BoardView {
        BoardView::from_game(self)
    }
}
