use alloc::collections::VecDeque;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

/// Summary of a single flood-fill pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodReport {
    /// Cells opened by the pass, not counting the start cell.
    pub revealed: CellCount,
    /// Size of the open region the pass covered, start cell included.
    pub region: CellCount,
    /// Zero-count cells whose neighborhoods were expanded.
    pub expanded: CellCount,
    /// Question markers removed from cells the pass opened.
    pub cleared_marks: CellCount,
}

/// Working set of one flood-fill: a queue of zero-count cells still to expand and the set of cells already claimed
/// by the pass, both keyed by linear cell index. Dropped when the pass finishes.
#[derive(Debug)]
pub struct RevealSession {
    frontier: VecDeque<usize>,
    visited: HashSet<usize>,
}

impl RevealSession {
    /// Starts a session at an already open zero-count cell.
    pub fn new(grid: &Grid, start: Coord2) -> Self {
        let index = grid.index_of(start);
        let mut visited = HashSet::new();
        visited.insert(index);
        Self {
            frontier: VecDeque::from([index]),
            visited,
        }
    }

    /// Expands the frontier until it is empty. Every cell enters the frontier at most once, so the pass is linear in
    /// the number of cells it opens.
    pub fn run(mut self, grid: &mut Grid) -> FloodReport {
        let mut report = FloodReport::default();

        while let Some(index) = self.frontier.pop_front() {
            let coords = grid.coords_of(index);
            report.expanded += 1;

            for pos in grid.iter_neighbors(coords) {
                let pos_index = grid.index_of(pos);
                if self.visited.contains(&pos_index) {
                    continue;
                }

                let cell = grid[pos];
                if cell.is_mine || matches!(cell.reveal_state, RevealState::Revealed | RevealState::Flagged) {
                    log::trace!("Skipping cell at {:?}", pos);
                    continue;
                }

                if cell.reveal_state == RevealState::Questioned {
                    report.cleared_marks += 1;
                }
                grid.cell_mut(pos).reveal_state = RevealState::Revealed;
                self.visited.insert(pos_index);
                report.revealed += 1;
                log::trace!(
                    "Flood opened cell at {:?}, mine count: {}",
                    pos,
                    cell.adjacent_mine_count
                );

                if cell.adjacent_mine_count == 0 {
                    self.frontier.push_back(pos_index);
                }
            }
        }

        report.region = self.visited.len() as CellCount;
        report
    }
}
