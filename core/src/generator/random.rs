use alloc::vec::Vec;
use rand::Rng;

use super::*;

/// Uniform placement: shuffles every cell position with Fisher–Yates and mines the first `mines` of them.
#[derive(Debug)]
pub struct RandomMinefieldGenerator<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
    mines: CellCount,
}

impl<'a, R: Rng + ?Sized> RandomMinefieldGenerator<'a, R> {
    pub fn new(rng: &'a mut R, mines: CellCount) -> Self {
        Self { rng, mines }
    }
}

impl<R: Rng + ?Sized> MinefieldGenerator for RandomMinefieldGenerator<'_, R> {
    fn generate(self, grid: &mut Grid) -> Result<()> {
        check_mine_count(grid, self.mines)?;
        clear_mines(grid);

        let mut positions: Vec<usize> = (0..usize::from(grid.total_cells())).collect();
        for i in (1..positions.len()).rev() {
            let j = self.rng.random_range(0..=i);
            positions.swap(i, j);
        }

        for &index in &positions[..usize::from(self.mines)] {
            let coords = grid.coords_of(index);
            grid.cell_mut(coords).is_mine = true;
        }
        grid.set_mine_count(self.mines);

        log::debug!(
            "Placed {} mines on a {:?} grid",
            self.mines,
            grid.size()
        );
        Ok(())
    }
}
