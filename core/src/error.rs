use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board width and height must be positive")]
    InvalidDimension,
    #[error("Invalid mine count {mines}, must be below {total_cells}")]
    InvalidMineCount {
        mines: CellCount,
        total_cells: CellCount,
    },
    #[error("Invalid coordinates")]
    InvalidCoords,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Why an interaction was absorbed without changing the board.
///
/// These are routine during play (clicking an open cell, flagging after the game ended), so they are reported inside
/// the outcome of an operation rather than as a [`GameError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IllegalTransition {
    /// The cell is already open.
    AlreadyRevealed,
    /// The cell carries a flag or question marker, which protects it from a plain reveal.
    Marked,
    /// The game was already won or lost.
    GameEnded,
    /// Chording needs an open cell with a non-zero count.
    NotNumbered,
    /// Chording needs exactly as many flagged neighbors as the cell's count.
    FlagCountMismatch,
    /// A chord or interaction touched nothing that could change.
    NothingToDo,
}
