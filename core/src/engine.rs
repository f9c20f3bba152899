use alloc::vec::Vec;
use core::ops::BitOr;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use crate::*;

/// A single game: the board plus the running counters that decide the outcome.
///
/// All mutators take `&mut self` and run to completion, so a front end serializes interactions simply by owning the
/// game. Routine misplays come back as `NoChange` outcomes; only out-of-bounds coordinates are errors.
#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    config: GameConfig,
    grid: Grid,
    defused_count: CellCount,
    flagged_count: CellCount,
    triggered_mine: Option<Coord2>,
    started: bool,
}

impl Game {
    /// Builds a board from `config`: allocate, place mines with `rng`, annotate, then apply the opening policy.
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let mut grid = Grid::allocate(config.width, config.height)?;
        RandomMinefieldGenerator::new(&mut *rng, config.mines).generate(&mut grid)?;
        let mut game = Self::from_grid(config, grid);

        if config.start == StartReveal::AlwaysZero {
            game.open_safe_start(rng);
        }
        Ok(game)
    }

    /// Reproducible game for a given seed.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(config, &mut rng)
    }

    /// Game seeded from the thread-local generator.
    #[cfg(feature = "std")]
    pub fn from_entropy(config: GameConfig) -> Result<Self> {
        Self::new(config, &mut rand::rng())
    }

    /// Game with mines at exactly `mine_coords`, every cell left hidden.
    pub fn from_layout(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut grid = Grid::allocate(size.0, size.1)?;
        FixedMinefieldGenerator::new(mine_coords).generate(&mut grid)?;
        let config =
            GameConfig::new_unchecked(size.0, size.1, grid.mine_count()).with_start(StartReveal::Untouched);
        Ok(Self::from_grid(config, grid))
    }

    fn from_grid(config: GameConfig, mut grid: Grid) -> Self {
        annotate(&mut grid);
        log::debug!(
            "New game {}x{} with {} mines",
            config.width,
            config.height,
            grid.mine_count()
        );
        Self {
            config,
            grid,
            defused_count: 0,
            flagged_count: 0,
            triggered_mine: None,
            started: false,
        }
    }

    /// Replaces this game with a fresh board. On error the current game is kept.
    pub fn restart<R: Rng + ?Sized>(&mut self, config: GameConfig, rng: &mut R) -> Result<()> {
        *self = Self::new(config, rng)?;
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn mine_count(&self) -> CellCount {
        self.grid.mine_count()
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<&Cell> {
        let coords = self.grid.validate_coords(coords)?;
        Ok(&self.grid[coords])
    }

    /// Mines minus flags placed, negative when the player over-flags.
    pub fn remaining_flag_count(&self) -> isize {
        (self.grid.mine_count() as isize) - (self.flagged_count as isize)
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Safe cells opened so far.
    pub fn defused_count(&self) -> CellCount {
        self.defused_count
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Whether the player has made a move that changed the board.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn outcome(&self) -> GameOutcome {
        if self.triggered_mine.is_some() {
            GameOutcome::Lost
        } else if self.defused_count == self.grid.safe_cell_count() {
            GameOutcome::Won
        } else {
            GameOutcome::InProgress
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_finished()
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.grid.validate_coords(coords)?;
        let outcome = self.reveal_single_cell(coords);
        self.mark_started(outcome.has_update());
        Ok(outcome)
    }

    /// Cycles the marker: hidden, flagged, questioned, hidden.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use RevealState::*;

        let coords = self.grid.validate_coords(coords)?;
        if self.is_finished() {
            return Ok(MarkOutcome::NoChange(IllegalTransition::GameEnded));
        }

        let next = match self.grid[coords].reveal_state {
            Revealed => return Ok(MarkOutcome::NoChange(IllegalTransition::AlreadyRevealed)),
            Hidden => {
                self.flagged_count += 1;
                Flagged
            }
            Flagged => {
                self.flagged_count -= 1;
                Questioned
            }
            Questioned => Hidden,
        };
        self.grid.cell_mut(coords).reveal_state = next;
        self.mark_started(true);
        log::debug!("Marked cell at {:?} as {:?}", coords, next);

        Ok(MarkOutcome::Changed(next))
    }

    /// Opens every non-flagged neighbor of a numbered cell whose count is matched by adjacent flags.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.grid.validate_coords(coords)?;
        if self.is_finished() {
            return Ok(RevealOutcome::NoChange(IllegalTransition::GameEnded));
        }

        let cell = self.grid[coords];
        let count = match cell.number() {
            Some(count) if cell.is_revealed() && count > 0 => count,
            _ => return Ok(RevealOutcome::NoChange(IllegalTransition::NotNumbered)),
        };

        if count != self.count_flagged_neighbors(coords) {
            return Ok(RevealOutcome::NoChange(IllegalTransition::FlagCountMismatch));
        }

        let targets: SmallVec<[Coord2; 8]> = self
            .grid
            .iter_neighbors(coords)
            .filter(|&pos| self.grid[pos].reveal_state != RevealState::Flagged)
            .collect();

        let outcome = targets
            .into_iter()
            .map(|pos| self.reveal_single_cell(pos))
            .reduce(BitOr::bitor)
            .unwrap_or(RevealOutcome::NoChange(IllegalTransition::NothingToDo));
        self.mark_started(outcome.has_update());
        Ok(outcome)
    }

    /// Opens a random zero-count cell before the first move so the player starts from an open area.
    ///
    /// Scans for candidates instead of sampling blindly, so dense boards without any zero cell return `None` and
    /// stay untouched.
    pub fn open_safe_start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(Coord2, RevealOutcome)> {
        if self.started || self.is_finished() {
            return None;
        }

        let candidates: Vec<usize> = self
            .grid
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_opening() && cell.reveal_state == RevealState::Hidden)
            .map(|(index, _)| index)
            .collect();

        if candidates.is_empty() {
            log::warn!("No zero cell to open, leaving the board untouched");
            return None;
        }

        let coords = self
            .grid
            .coords_of(candidates[rng.random_range(0..candidates.len())]);
        let outcome = self.reveal_single_cell(coords);
        log::debug!("Opened start cell at {:?}", coords);
        Some((coords, outcome))
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealState::*;

        if self.is_finished() {
            return RevealOutcome::NoChange(IllegalTransition::GameEnded);
        }

        let cell = self.grid[coords];
        match cell.reveal_state {
            Revealed => RevealOutcome::NoChange(IllegalTransition::AlreadyRevealed),
            Flagged | Questioned => RevealOutcome::NoChange(IllegalTransition::Marked),
            Hidden if cell.is_mine => {
                self.grid.cell_mut(coords).was_triggered = true;
                self.triggered_mine = Some(coords);
                log::debug!("Hit mine at {:?}, game lost", coords);
                self.reveal_mines();
                RevealOutcome::HitMine
            }
            Hidden => {
                self.grid.cell_mut(coords).reveal_state = Revealed;
                self.defused_count += 1;
                log::debug!(
                    "Open cell at {:?}, mine count: {}",
                    coords,
                    cell.adjacent_mine_count
                );

                if cell.adjacent_mine_count == 0 {
                    let report = RevealSession::new(&self.grid, coords).run(&mut self.grid);
                    self.defused_count += report.revealed;
                    log::debug!("Flood-fill from {:?} opened {} cells", coords, report.revealed);
                }

                if self.defused_count == self.grid.safe_cell_count() {
                    log::debug!("All safe cells open, game won");
                    self.reveal_mines();
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Revealed
                }
            }
        }
    }

    /// End-of-game display pass: every mine is opened whatever its marker. Does not count toward the win.
    fn reveal_mines(&mut self) {
        let mut unflagged: CellCount = 0;
        for cell in self.grid.cells_mut().filter(|cell| cell.is_mine) {
            if cell.reveal_state == RevealState::Flagged {
                unflagged += 1;
            }
            cell.reveal_state = RevealState::Revealed;
        }
        self.flagged_count -= unflagged;
    }

    fn mark_started(&mut self, changed: bool) {
        if changed && !self.started {
            log::debug!("Game started");
            self.started = true;
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.grid
            .iter_neighbors(coords)
            .filter(|&pos| self.grid[pos].reveal_state == RevealState::Flagged)
            .count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, mines: &[Coord2]) -> Game {
        Game::from_layout(size, mines).unwrap()
    }

    fn revealed_count(game: &Game) -> usize {
        game.grid().iter().filter(|cell| cell.is_revealed()).count()
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_cell() {
        let mut engine = layout((2, 2), &[(0, 0), (1, 1)]);
        engine.toggle_flag((1, 1)).unwrap();

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.outcome(), GameOutcome::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
        assert!(engine.cell_at((0, 0)).unwrap().was_triggered());
        assert!(!engine.cell_at((1, 1)).unwrap().was_triggered());
        // every mine is shown, flagged or not, and none of them counts as defused
        assert!(engine.cell_at((1, 1)).unwrap().is_revealed());
        assert_eq!(engine.defused_count(), 0);
        assert_eq!(engine.remaining_flag_count(), 2);
    }

    #[test]
    fn numbered_cell_reveals_alone() {
        let mut engine = layout((3, 3), &[(1, 1)]);

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(revealed_count(&engine), 1);
        assert_eq!(engine.defused_count(), 1);
        assert_eq!(engine.outcome(), GameOutcome::InProgress);
    }

    #[test]
    fn corner_mine_flood_wins_from_far_corner() {
        let mut engine = layout((3, 3), &[(2, 2)]);

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((0, 0)).unwrap().adjacent_mine_count(), 0);
        assert_eq!(engine.cell_at((1, 1)).unwrap().adjacent_mine_count(), 1);
        assert_eq!(engine.defused_count(), 8);
        // shown at the end, not triggered
        assert!(engine.cell_at((2, 2)).unwrap().is_revealed());
        assert!(!engine.cell_at((2, 2)).unwrap().was_triggered());
    }

    #[test]
    fn empty_board_floods_in_one_call() {
        let mut engine = layout((5, 5), &[]);

        assert_eq!(engine.reveal((2, 2)).unwrap(), RevealOutcome::Won);
        assert_eq!(revealed_count(&engine), 25);
        assert_eq!(engine.defused_count(), 25);
    }

    #[test]
    fn second_reveal_is_a_no_op() {
        let mut engine = layout((4, 4), &[(3, 3)]);
        engine.reveal((3, 2)).unwrap();
        let before = engine.clone();

        let outcome = engine.reveal((3, 2)).unwrap();

        assert_eq!(outcome, RevealOutcome::NoChange(IllegalTransition::AlreadyRevealed));
        assert_eq!(engine, before);
    }

    #[test]
    fn marked_cells_are_protected() {
        let mut engine = layout((3, 1), &[(0, 0)]);
        engine.toggle_flag((0, 0)).unwrap();

        assert_eq!(
            engine.reveal((0, 0)).unwrap(),
            RevealOutcome::NoChange(IllegalTransition::Marked)
        );
        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(
            engine.reveal((0, 0)).unwrap(),
            RevealOutcome::NoChange(IllegalTransition::Marked)
        );
        assert_eq!(engine.outcome(), GameOutcome::InProgress);
    }

    #[test]
    fn flag_cycle_restores_counter() {
        let mut engine = layout((3, 3), &[(0, 0), (2, 2)]);
        assert_eq!(engine.remaining_flag_count(), 2);

        assert_eq!(
            engine.toggle_flag((1, 1)).unwrap(),
            MarkOutcome::Changed(RevealState::Flagged)
        );
        assert_eq!(engine.remaining_flag_count(), 1);

        assert_eq!(
            engine.toggle_flag((1, 1)).unwrap(),
            MarkOutcome::Changed(RevealState::Questioned)
        );
        assert_eq!(engine.remaining_flag_count(), 2);

        assert_eq!(
            engine.toggle_flag((1, 1)).unwrap(),
            MarkOutcome::Changed(RevealState::Hidden)
        );
        assert_eq!(engine.remaining_flag_count(), 2);
    }

    #[test]
    fn over_flagging_goes_negative() {
        let mut engine = layout((3, 1), &[(0, 0)]);
        engine.toggle_flag((0, 0)).unwrap();
        engine.toggle_flag((1, 0)).unwrap();

        assert_eq!(engine.remaining_flag_count(), -1);
    }

    #[test]
    fn flagging_open_cell_is_a_no_op() {
        let mut engine = layout((3, 1), &[(0, 0)]);
        engine.reveal((1, 0)).unwrap();

        assert_eq!(
            engine.toggle_flag((1, 0)).unwrap(),
            MarkOutcome::NoChange(IllegalTransition::AlreadyRevealed)
        );
    }

    #[test]
    fn ended_game_absorbs_moves() {
        let mut engine = layout((3, 1), &[(0, 0)]);
        engine.reveal((0, 0)).unwrap();
        let before = engine.clone();

        assert_eq!(
            engine.reveal((2, 0)).unwrap(),
            RevealOutcome::NoChange(IllegalTransition::GameEnded)
        );
        assert_eq!(
            engine.toggle_flag((2, 0)).unwrap(),
            MarkOutcome::NoChange(IllegalTransition::GameEnded)
        );
        assert_eq!(
            engine.chord_reveal((1, 0)).unwrap(),
            RevealOutcome::NoChange(IllegalTransition::GameEnded)
        );
        assert_eq!(engine, before);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut engine = layout((2, 2), &[]);

        assert_eq!(engine.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((0, 2)), Err(GameError::InvalidCoords));
        assert_eq!(engine.chord_reveal((5, 5)), Err(GameError::InvalidCoords));
        assert!(engine.cell_at((2, 2)).is_err());
    }

    #[test]
    fn chord_reveal_uses_flagged_neighbors() {
        let mines = &[(0, 1), (2, 1)];
        let mut engine = layout((3, 3), mines);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();
        engine.toggle_flag((2, 1)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((1, 0)).unwrap().number(), Some(2));
        assert_eq!(engine.cell_at((1, 2)).unwrap().number(), Some(2));
    }

    #[test]
    fn chord_with_wrong_flag_loses() {
        let mut engine = layout((3, 3), &[(0, 0)]);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((2, 2)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
        assert_eq!(engine.outcome(), GameOutcome::Lost);
    }

    #[test]
    fn chord_requires_matching_flags() {
        let mut engine = layout((3, 3), &[(0, 0), (2, 2)]);
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();
        let before = engine.clone();

        assert_eq!(
            engine.chord_reveal((1, 1)).unwrap(),
            RevealOutcome::NoChange(IllegalTransition::FlagCountMismatch)
        );
        assert_eq!(engine, before);
    }

    #[test]
    fn chord_needs_a_numbered_open_cell() {
        let mut engine = layout((4, 1), &[(0, 0)]);

        assert_eq!(
            engine.chord_reveal((2, 0)).unwrap(),
            RevealOutcome::NoChange(IllegalTransition::NotNumbered)
        );
        // the wrong flag keeps the flood from finishing the board
        engine.toggle_flag((1, 0)).unwrap();
        assert_eq!(engine.reveal((3, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(
            engine.chord_reveal((3, 0)).unwrap(),
            RevealOutcome::NoChange(IllegalTransition::NotNumbered)
        );
    }

    #[test]
    fn chord_skips_questioned_neighbors() {
        let mut engine = layout((3, 2), &[(0, 0), (2, 1)]);
        engine.reveal((1, 0)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();
        engine.toggle_flag((2, 1)).unwrap();
        engine.toggle_flag((2, 0)).unwrap();
        engine.toggle_flag((2, 0)).unwrap();

        let outcome = engine.chord_reveal((1, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Revealed);
        assert_eq!(
            engine.cell_at((2, 0)).unwrap().reveal_state(),
            RevealState::Questioned
        );
        assert!(engine.cell_at((1, 1)).unwrap().is_revealed());
        assert!(engine.cell_at((0, 1)).unwrap().is_revealed());
        assert_eq!(engine.outcome(), GameOutcome::InProgress);
    }

    #[test]
    fn flood_clears_questions_and_keeps_flags() {
        let mut engine = layout((5, 1), &[]);
        engine.toggle_flag((3, 0)).unwrap();
        engine.toggle_flag((1, 0)).unwrap();
        engine.toggle_flag((1, 0)).unwrap();

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);
        assert!(engine.cell_at((1, 0)).unwrap().is_revealed());
        assert!(engine.cell_at((2, 0)).unwrap().is_revealed());
        assert_eq!(
            engine.cell_at((3, 0)).unwrap().reveal_state(),
            RevealState::Flagged
        );
        assert!(!engine.cell_at((4, 0)).unwrap().is_revealed());
        assert_eq!(engine.defused_count(), 3);
        assert_eq!(engine.remaining_flag_count(), -1);
    }

    #[test]
    fn win_detected_from_injected_state() {
        let mut engine = layout((3, 3), &[(1, 1)]);
        for cell in engine.grid.cells_mut().filter(|cell| !cell.is_mine) {
            cell.reveal_state = RevealState::Revealed;
        }
        engine.defused_count = engine.grid.safe_cell_count();

        assert_eq!(engine.outcome(), GameOutcome::Won);
        assert_eq!(
            engine.reveal((1, 1)).unwrap(),
            RevealOutcome::NoChange(IllegalTransition::GameEnded)
        );
    }

    #[test]
    fn safe_start_opens_a_zero_cell() {
        let config = GameConfig::new(16, 16, 40).unwrap();

        for seed in 0..20 {
            let engine = Game::with_seed(config, seed).unwrap();
            let opened: Vec<_> = engine
                .grid()
                .iter()
                .filter(|cell| cell.is_revealed() && cell.adjacent_mine_count() == 0)
                .collect();

            assert!(!opened.is_empty());
            assert_eq!(engine.outcome(), GameOutcome::InProgress);
            assert!(!engine.is_started());
        }
    }

    #[test]
    fn safe_start_falls_back_on_dense_board() {
        // every safe cell touches a mine, so there is nothing to open
        let config = GameConfig::new(3, 3, 8).unwrap();
        let engine = Game::with_seed(config, 3).unwrap();

        assert_eq!(revealed_count(&engine), 0);
        assert_eq!(engine.outcome(), GameOutcome::InProgress);
    }

    #[test]
    fn safe_start_does_nothing_after_first_move() {
        let mut engine = layout((5, 5), &[(0, 0)]);
        engine.toggle_flag((0, 0)).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);

        assert_eq!(engine.open_safe_start(&mut rng), None);
        assert_eq!(revealed_count(&engine), 0);
    }

    #[test]
    fn untouched_start_leaves_board_hidden() {
        let config = GameConfig::new(8, 8, 10)
            .unwrap()
            .with_start(StartReveal::Untouched);
        let engine = Game::with_seed(config, 9).unwrap();

        assert_eq!(revealed_count(&engine), 0);
        assert_eq!(engine.mine_count(), 10);
    }

    #[test]
    fn restart_rebuilds_or_keeps_on_error() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut engine = Game::new(Difficulty::Beginner.into(), &mut rng).unwrap();
        engine.reveal((0, 0)).unwrap();

        engine
            .restart(Difficulty::Expert.into(), &mut rng)
            .unwrap();
        assert_eq!(engine.size(), (24, 24));
        assert_eq!(engine.mine_count(), 99);
        assert!(!engine.is_started());

        let before = engine.clone();
        assert_eq!(
            engine.restart(GameConfig::new_unchecked(0, 4, 1), &mut rng),
            Err(GameError::InvalidDimension)
        );
        assert_eq!(engine, before);
    }

    #[test]
    fn construction_rejects_bad_configs() {
        assert_eq!(
            Game::with_seed(GameConfig::new_unchecked(4, 0, 0), 0),
            Err(GameError::InvalidDimension)
        );
        assert_eq!(
            Game::with_seed(GameConfig::new_unchecked(2, 2, 4), 0),
            Err(GameError::InvalidMineCount {
                mines: 4,
                total_cells: 4
            })
        );
    }
}
