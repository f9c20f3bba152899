use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// Pointer buttons held when an interaction is released. Bit values follow the DOM `buttons` mask so a web
    /// front end can pass it through unchanged.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Buttons: u8 {
        const PRIMARY = 1;
        const SECONDARY = 2;
        const AUXILIARY = 4;
    }
}

impl Buttons {
    /// Both main buttons together, or the middle button alone, request a chord.
    pub fn is_chord(self) -> bool {
        self.contains(Self::PRIMARY | Self::SECONDARY) || self.contains(Self::AUXILIARY)
    }
}

/// What an interaction ended up doing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    Reveal(RevealOutcome),
    Chord(RevealOutcome),
    Mark(MarkOutcome),
    /// No button was held.
    Ignored,
}

impl Interaction {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Reveal(outcome) | Self::Chord(outcome) => outcome.has_update(),
            Self::Mark(outcome) => outcome.has_update(),
            Self::Ignored => false,
        }
    }
}

impl Game {
    /// Dispatches a pointer interaction on `coords` according to the buttons that were held.
    pub fn interact(&mut self, coords: Coord2, buttons: Buttons) -> Result<Interaction> {
        Ok(if buttons.is_chord() {
            Interaction::Chord(self.chord_reveal(coords)?)
        } else if buttons.contains(Buttons::PRIMARY) {
            Interaction::Reveal(self.reveal(coords)?)
        } else if buttons.contains(Buttons::SECONDARY) {
            Interaction::Mark(self.toggle_flag(coords)?)
        } else {
            self.grid().validate_coords(coords)?;
            Interaction::Ignored
        })
    }
}
