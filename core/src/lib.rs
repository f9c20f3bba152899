#![no_std]

extern crate alloc;

use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use annotate::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use flood::*;
pub use generator::*;
pub use grid::*;
pub use input::*;
pub use types::*;
pub use view::*;

mod annotate;
mod cell;
mod engine;
mod error;
mod flood;
mod generator;
mod grid;
mod input;
mod types;
mod view;

/// Board shape, mine count and opening policy for one game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    #[serde(default)]
    pub start: StartReveal,
}

impl GameConfig {
    pub const fn new_unchecked(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
            start: StartReveal::AlwaysZero,
        }
    }

    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(width, height, mines);
        config.validate()?;
        Ok(config)
    }

    pub const fn with_start(self, start: StartReveal) -> Self {
        Self { start, ..self }
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    /// A board needs at least one cell and at least one safe cell.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidDimension);
        }

        let total_cells = self.total_cells();
        if self.mines >= total_cells {
            return Err(GameError::InvalidMineCount {
                mines: self.mines,
                total_cells,
            });
        }

        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::default().config()
    }
}

/// Preset boards a front end can offer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::new_unchecked(8, 8, 10),
            Self::Intermediate => GameConfig::new_unchecked(16, 16, 40),
            Self::Expert => GameConfig::new_unchecked(24, 24, 99),
        }
    }

    /// Matches a config back to its preset, ignoring the opening policy.
    pub fn of(config: &GameConfig) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.config().size() == config.size() && difficulty.config().mines == config.mines)
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.config()
    }
}

/// Game status derived from the board, never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    InProgress,
    Won,
    Lost,
}

impl GameOutcome {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange(IllegalTransition),
    /// The marker moved to the given state.
    Changed(RevealState),
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange(IllegalTransition),
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange(_))
    }
}

/// Merges outcomes of a multi-cell reveal: hitting a mine wins over winning, which wins over a plain reveal.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange(a), NoChange(b)) if a == b => NoChange(a),
            (NoChange(_), NoChange(_)) => NoChange(IllegalTransition::NothingToDo),
        }
    }
}
