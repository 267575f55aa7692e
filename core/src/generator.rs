use alloc::collections::BTreeSet;
use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Where the mines are, before any play happens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Places `config.mines` mines uniformly by rejection sampling: pick a random cell, retry when it already
    /// holds a mine. The config must already be validated, otherwise a full board would never terminate.
    pub fn random(config: GameConfig, rng: &mut SmallRng) -> Self {
        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        let mut mines_placed: CellCount = 0;
        let mut attempts: u32 = 0;

        while mines_placed < config.mines {
            attempts += 1;
            let row = rng.random_range(0..config.height);
            let col = rng.random_range(0..config.width);
            let cell = &mut mine_mask[(row, col).to_nd_index()];
            if !*cell {
                *cell = true;
                mines_placed += 1;
            }
        }

        log::trace!(
            "Placed {} mines on {}x{} in {} attempts",
            mines_placed,
            config.height,
            config.width,
            attempts
        );

        Self {
            mine_mask,
            mine_count: mines_placed,
        }
    }

    /// Builds a layout with exactly the given mines, duplicates are counted once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let unique: BTreeSet<Coord2> = mine_coords.iter().copied().collect();
        let mines = unique.len().try_into().unwrap_or(CellCount::MAX);
        let config = GameConfig::new_unchecked(size.0, size.1, mines).validate()?;

        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        for coords in unique {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self {
            mine_mask,
            mine_count: config.mines,
        })
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.mine_mask.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.mine_mask[coords.to_nd_index()]
    }

    pub fn game_config(&self) -> GameConfig {
        let (height, width) = self.size();
        GameConfig::new_unchecked(height, width, self.mine_count)
    }
}
