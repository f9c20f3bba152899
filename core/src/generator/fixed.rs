use super::*;

/// Places mines at known coordinates, for replays and for tests that need an exact layout.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMinefieldGenerator<'a> {
    mine_coords: &'a [Coord2],
}

impl<'a> FixedMinefieldGenerator<'a> {
    pub fn new(mine_coords: &'a [Coord2]) -> Self {
        Self { mine_coords }
    }
}

impl MinefieldGenerator for FixedMinefieldGenerator<'_> {
    fn generate(self, grid: &mut Grid) -> Result<()> {
        for &coords in self.mine_coords {
            grid.validate_coords(coords)?;
        }

        clear_mines(grid);
        let mut mines: CellCount = 0;
        for &coords in self.mine_coords {
            let cell = grid.cell_mut(coords);
            if !cell.is_mine {
                cell.is_mine = true;
                mines += 1;
            }
        }

        if let Err(err) = check_mine_count(grid, mines) {
            clear_mines(grid);
            return Err(err);
        }
        grid.set_mine_count(mines);
        Ok(())
    }
}
