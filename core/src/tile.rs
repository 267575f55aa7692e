use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// One grid cell. Only the owning [`Board`] mutates it, so the flags here always agree with the board's
/// aggregate sets and counters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    row: Coord,
    col: Coord,
    pub(crate) is_open: bool,
    pub(crate) is_mine: bool,
    pub(crate) is_flag: bool,
    pub(crate) is_culprit: bool,
    pub(crate) is_glasses: bool,
}

impl Tile {
    pub(crate) const fn new((row, col): Coord2) -> Self {
        Self {
            row,
            col,
            is_open: false,
            is_mine: false,
            is_flag: false,
            is_culprit: false,
            is_glasses: false,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        (self.row, self.col)
    }

    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub const fn is_flag(&self) -> bool {
        self.is_flag
    }

    /// The mine whose opening lost the game.
    pub const fn is_culprit(&self) -> bool {
        self.is_culprit
    }

    /// Head of the win animation's snake.
    pub const fn is_glasses(&self) -> bool {
        self.is_glasses
    }

    /// A flagged mine that was opened when the game was lost.
    pub const fn is_flagged_mine(&self) -> bool {
        self.is_open && self.is_flag && self.is_mine
    }

    /// Stable key for change detection: it changes whenever the open or flag state does.
    pub const fn key(&self) -> TileKey {
        TileKey {
            row: self.row,
            col: self.col,
            is_flag: self.is_flag,
            is_open: self.is_open,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub row: Coord,
    pub col: Coord,
    pub is_flag: bool,
    pub is_open: bool,
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {} {}", self.row, self.col, self.is_flag, self.is_open)
    }
}
