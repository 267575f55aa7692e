#![no_std]

extern crate alloc;

use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use snake::*;
pub use snapshot::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod generator;
mod session;
mod snake;
mod snapshot;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub height: Coord,
    pub width: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(height: Coord, width: Coord, mines: CellCount) -> Self {
        Self {
            height,
            width,
            mines,
        }
    }

    /// Clamps the parameters into a playable board: at least one row and column, and at least one safe tile.
    pub fn new(height: Coord, width: Coord, mines: CellCount) -> Self {
        let height = height.clamp(1, Coord::MAX);
        let width = width.clamp(1, Coord::MAX);
        let mines = mines.min(mult(height, width) - 1);
        Self::new_unchecked(height, width, mines)
    }

    /// Rejects parameters that cannot produce a board instead of clamping them.
    pub fn validate(self) -> Result<Self> {
        if self.height == 0 || self.width == 0 {
            log::warn!("Rejected board size {}x{}", self.height, self.width);
            return Err(GameError::InvalidSize);
        }
        if self.mines >= self.total_cells() {
            log::warn!(
                "Rejected mine count, requested {} but only {} tiles",
                self.mines,
                self.total_cells()
            );
            return Err(GameError::TooManyMines);
        }
        Ok(self)
    }

    pub const fn size(&self) -> Coord2 {
        (self.height, self.width)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.height, self.width)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::Resume.config()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
    /// The small board the site opens with.
    Resume,
    /// The full-page board.
    Wall,
}

impl Difficulty {
    pub const fn config(self) -> GameConfig {
        use Difficulty::*;
        match self {
            Beginner => GameConfig::new_unchecked(9, 9, 10),
            Intermediate => GameConfig::new_unchecked(16, 16, 40),
            Expert => GameConfig::new_unchecked(16, 30, 99),
            Resume => GameConfig::new_unchecked(10, 10, 10),
            Wall => GameConfig::new_unchecked(30, 30, 180),
        }
    }
}

/// Outcome of flagging a tile
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
    Won,
}

impl MarkOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
            Self::Won => true,
        }
    }
}

/// Outcome of opening a tile
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Used to merge outcomes when several tiles open in one move
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            // explode has priority
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_clamps_to_playable_board() {
        assert_eq!(GameConfig::new(0, 0, 5), GameConfig::new_unchecked(1, 1, 0));
        assert_eq!(GameConfig::new(3, 3, 20), GameConfig::new_unchecked(3, 3, 8));
    }

    #[test]
    fn config_validate_rejects_full_board() {
        assert_eq!(
            GameConfig::new_unchecked(2, 2, 4).validate(),
            Err(GameError::TooManyMines)
        );
        assert_eq!(
            GameConfig::new_unchecked(0, 4, 0).validate(),
            Err(GameError::InvalidSize)
        );
        assert!(GameConfig::new_unchecked(2, 2, 3).validate().is_ok());
    }

    #[test]
    fn presets_are_valid() {
        use Difficulty::*;
        for preset in [Beginner, Intermediate, Expert, Resume, Wall] {
            assert!(preset.config().validate().is_ok(), "{preset:?}");
        }
    }

    #[test]
    fn hit_mine_dominates_merge() {
        use RevealOutcome::*;
        assert_eq!(Revealed | HitMine, HitMine);
        assert_eq!(Won | Revealed, Won);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
