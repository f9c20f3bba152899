use crate::*;

/// Stores the neighborhood mine count on every cell, [`MINE_SENTINEL`] on mines.
///
/// Must run after mine placement and before the first reveal.
pub fn annotate(grid: &mut Grid) {
    let (width, height) = grid.size();
    for y in 0..height {
        for x in 0..width {
            let coords = (x, y);
            let count = if grid[coords].is_mine {
                MINE_SENTINEL
            } else {
                grid.count_adjacent_mines(coords) as i8
            };
            grid.cell_mut(coords).adjacent_mine_count = count;
        }
    }
}
