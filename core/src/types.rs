/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`, where `x` is the column and `y` the row.
pub type Coord2 = (Coord, Coord);

/// Maps `(x, y)` coordinates onto the row-major `[row, column]` index used by the grid arrays.
pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.1.into(), self.0.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Neighbor offsets in compass order: N, NE, E, SE, S, SW, W, NW.
const DISPLACEMENTS: [(i8, i8); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let (x, y) = coords;
    let (dx, dy) = delta;
    let (max_x, max_y) = bounds;

    let next_x = x.checked_add_signed(dx)?;
    if next_x >= max_x {
        return None;
    }

    let next_y = y.checked_add_signed(dy)?;
    if next_y >= max_y {
        return None;
    }

    Some((next_x, next_y))
}

/// Iterates the in-bounds 8-neighborhood of a cell. Out-of-bounds offsets are skipped.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
