use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board height, width, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`, matching the grid layout.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// The eight compass headings, in clockwise order starting from north.
///
/// Rotating a heading by one step turns it 45 degrees, which is what the win
/// animation uses to prefer smooth turns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// `(row, col)` displacement of a single step in this direction.
    pub const fn delta(self) -> (i8, i8) {
        use Direction::*;
        match self {
            N => (-1, 0),
            NE => (-1, 1),
            E => (0, 1),
            SE => (1, 1),
            S => (1, 0),
            SW => (1, -1),
            W => (0, -1),
            NW => (-1, -1),
        }
    }

    /// Turns clockwise by `steps` eighths of a circle (negative turns counter-clockwise).
    pub const fn rotate(self, steps: i8) -> Direction {
        let index = (self as i8 + steps).rem_euclid(8);
        Self::ALL[index as usize]
    }

    pub const fn reverse(self) -> Direction {
        self.rotate(4)
    }

    /// Number of 45 degree turns between two headings, in `0..=4`.
    pub const fn turns_to(self, other: Direction) -> u8 {
        let diff = (other as i8 - self as i8).rem_euclid(8) as u8;
        if diff > 4 { 8 - diff } else { diff }
    }

    /// Applies this direction to `coords`, returning a value only when it remains inside `bounds`.
    pub fn step(self, coords: Coord2, bounds: Coord2) -> Option<Coord2> {
        apply_delta(coords, self.delta(), bounds)
    }
}

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(d_col)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterates the in-bounds neighbors of a cell; edges and corners yield fewer than eight.
#[derive(Debug)]
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
            let direction = *Direction::ALL.get(usize::from(self.index))?;
            self.index += 1;

            if let Some(next_item) = direction.step(self.center, self.bounds) {
                return Some(next_item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn corner_has_three_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new((0, 0), (3, 3)).collect();
        assert_eq!(neighbors, [(0, 1), (1, 1), (1, 0)]);
    }

    #[test]
    fn center_has_eight_neighbors() {
        assert_eq!(NeighborIter::new((1, 1), (3, 3)).count(), 8);
    }

    #[test]
    fn single_cell_has_no_neighbors() {
        assert_eq!(NeighborIter::new((0, 0), (1, 1)).count(), 0);
    }

    #[test]
    fn rotation_wraps_both_ways() {
        assert_eq!(Direction::N.rotate(-1), Direction::NW);
        assert_eq!(Direction::NW.rotate(1), Direction::N);
        assert_eq!(Direction::E.reverse(), Direction::W);
    }

    #[test]
    fn turns_between_headings() {
        assert_eq!(Direction::N.turns_to(Direction::N), 0);
        assert_eq!(Direction::N.turns_to(Direction::NW), 1);
        assert_eq!(Direction::NE.turns_to(Direction::SW), 4);
        assert_eq!(Direction::W.turns_to(Direction::NE), 3);
    }
}
