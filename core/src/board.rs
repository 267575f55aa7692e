use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashSet;
use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Up to eight in-bounds neighbors of a tile.
pub type Neighbors = SmallVec<[Coord2; 8]>;

/// Valid transitions:
/// - Playing -> Won
/// - Playing -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Playing
    }
}

/// Observer notified after every externally visible change to a [`Board`].
///
/// The notification carries no payload, the listener is expected to re-read whatever board state it renders.
/// It runs while the board is mutably borrowed, so it must not call back into the board.
pub trait ChangeListener {
    fn on_change(&mut self);
}

impl<F: FnMut()> ChangeListener for F {
    fn on_change(&mut self) {
        self()
    }
}

/// A minesweeper game from construction to its end, plus the decorative animation that runs after a win.
pub struct Board {
    config: GameConfig,
    tiles: Array2<Tile>,
    neighbors: Array2<Neighbors>,
    neighbor_mines: Array2<u8>,
    mines: BTreeSet<Coord2>,
    flags: BTreeSet<Coord2>,
    closed: BTreeSet<Coord2>,
    flagged_mines: CellCount,
    status: GameStatus,
    pub(crate) snake: Option<SnakeState>,
    pub(crate) rng: SmallRng,
    listener: Option<Box<dyn ChangeListener>>,
}

impl Board {
    /// Builds a board with randomly placed mines. The same `seed` always yields the same layout and the same
    /// animation.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        let config = config.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let layout = MineLayout::random(config, &mut rng);
        Ok(Self::with_layout(layout, rng))
    }

    /// Builds a board with mines at exactly `mine_coords`.
    pub fn from_mine_coords(height: Coord, width: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let layout = MineLayout::from_mine_coords((height, width), mine_coords)?;
        Ok(Self::from_layout(layout, 0))
    }

    pub fn from_layout(layout: MineLayout, seed: u64) -> Self {
        Self::with_layout(layout, SmallRng::seed_from_u64(seed))
    }

    fn with_layout(layout: MineLayout, rng: SmallRng) -> Self {
        let config = layout.game_config();
        let size = config.size();
        let shape = size.to_nd_index();

        let tiles = Array2::from_shape_fn(shape, |(row, col)| {
            let coords = (row as Coord, col as Coord);
            let mut tile = Tile::new(coords);
            tile.is_mine = layout.contains_mine(coords);
            tile
        });
        let neighbors = Array2::from_shape_fn(shape, |(row, col)| {
            NeighborIter::new((row as Coord, col as Coord), size).collect()
        });
        let mines = tiles.iter().filter(|tile| tile.is_mine).map(Tile::coords).collect();
        let closed = tiles.iter().map(Tile::coords).collect();

        let mut board = Self {
            config,
            tiles,
            neighbors,
            neighbor_mines: Array2::zeros(shape),
            mines,
            flags: BTreeSet::new(),
            closed,
            flagged_mines: 0,
            status: GameStatus::Playing,
            snake: None,
            rng,
            listener: None,
        };
        board.count_neighbor_mines();
        log::debug!(
            "New {}x{} board with {} mines",
            config.height,
            config.width,
            config.mines
        );
        board
    }

    /// Registers the observer, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl ChangeListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn with_listener(mut self, listener: impl ChangeListener + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    fn count_neighbor_mines(&mut self) {
        for (count, neighbors) in self.neighbor_mines.iter_mut().zip(self.neighbors.iter()) {
            *count = neighbors
                .iter()
                .filter(|&&pos| self.tiles[pos.to_nd_index()].is_mine)
                .count() as u8;
        }
    }

    pub(crate) fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_change();
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size()
    }

    pub fn height(&self) -> Coord {
        self.config.height
    }

    pub fn width(&self) -> Coord {
        self.config.width
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// How many mines have not been flagged yet, negative when the player over-flags.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - self.flags.len() as i32
    }

    pub fn flagged_mines(&self) -> CellCount {
        self.flagged_mines
    }

    pub fn mines(&self) -> &BTreeSet<Coord2> {
        &self.mines
    }

    pub fn flags(&self) -> &BTreeSet<Coord2> {
        &self.flags
    }

    pub fn closed(&self) -> &BTreeSet<Coord2> {
        &self.closed
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (height, width) = self.size();
        if coords.0 < height && coords.1 < width {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn tile_at(&self, coords: Coord2) -> Result<&Tile> {
        let coords = self.validate_coords(coords)?;
        Ok(self.tile(coords))
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Tiles of a single row, left to right.
    pub fn row(&self, row: Coord) -> impl Iterator<Item = &Tile> {
        self.tiles.row(row.into()).into_iter()
    }

    pub fn neighbors(&self, coords: Coord2) -> Result<&[Coord2]> {
        let coords = self.validate_coords(coords)?;
        Ok(self.neighbors[coords.to_nd_index()].as_slice())
    }

    pub fn neighbor_mine_count(&self, coords: Coord2) -> Result<u8> {
        let coords = self.validate_coords(coords)?;
        Ok(self.neighbor_mines[coords.to_nd_index()])
    }

    pub fn neighbor_flag_count(&self, coords: Coord2) -> Result<u8> {
        let coords = self.validate_coords(coords)?;
        Ok(self.count_flagged_neighbors(coords))
    }

    /// Whether opening this already open tile would cascade into closed neighbors.
    pub fn is_chordable(&self, coords: Coord2) -> bool {
        let Ok(coords) = self.validate_coords(coords) else {
            return false;
        };
        self.tile(coords).is_open
            && !self.status.is_finished()
            && self.cascades(coords)
            && self.neighbors[coords.to_nd_index()]
                .iter()
                .any(|&pos| self.tile(pos).is_closed_unflagged())
    }

    pub(crate) fn tile(&self, coords: Coord2) -> &Tile {
        &self.tiles[coords.to_nd_index()]
    }

    pub(crate) fn tile_mut(&mut self, coords: Coord2) -> &mut Tile {
        &mut self.tiles[coords.to_nd_index()]
    }

    /// Closes a tile for the win animation. Game rules and counters other than `closed` are not involved.
    pub(crate) fn close_for_animation(&mut self, coords: Coord2) {
        self.tile_mut(coords).is_open = false;
        self.closed.insert(coords);
    }

    pub(crate) fn reopen_for_animation(&mut self, coords: Coord2) {
        self.tile_mut(coords).is_open = true;
        self.closed.remove(&coords);
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.neighbors[coords.to_nd_index()]
            .iter()
            .filter(|&&pos| self.tile(pos).is_flag)
            .count() as u8
    }

    /// A tile cascades when none of its neighbors is a mine, or when every neighboring mine is accounted
    /// for by a flag.
    fn cascades(&self, coords: Coord2) -> bool {
        let mine_count = self.neighbor_mines[coords.to_nd_index()];
        mine_count == 0 || mine_count == self.count_flagged_neighbors(coords)
    }

    /// Toggles the flag on a closed tile. Open tiles and won boards are left untouched.
    pub fn flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.tile(coords).is_open || matches!(self.status, GameStatus::Won) {
            return Ok(MarkOutcome::NoChange);
        }

        let tile = self.tile_mut(coords);
        tile.is_flag = !tile.is_flag;
        let (is_flag, is_mine) = (tile.is_flag, tile.is_mine);

        if is_flag {
            self.flags.insert(coords);
            if is_mine {
                self.flagged_mines += 1;
            }
        } else {
            self.flags.remove(&coords);
            if is_mine {
                self.flagged_mines -= 1;
            }
        }
        log::trace!("Flag at {:?} set to {}", coords, is_flag);

        let won = self.check_win_condition();
        self.notify();

        Ok(if won {
            MarkOutcome::Won
        } else {
            MarkOutcome::Changed
        })
    }

    /// Opens a tile and cascades through every neighborhood whose mines are all accounted for.
    ///
    /// Opening an already open tile re-applies the cascade rule to it, which is how a chord is played.
    /// Flagged tiles are never opened, neither directly nor by the cascade. The listener fires once per
    /// call, and only when something changed.
    pub fn open(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.validate_coords(coords)?;

        if self.tile(coords).is_flag || matches!(self.status, GameStatus::Won) {
            return Ok(NoChange);
        }

        let mut outcome = NoChange;
        let mut visited: HashSet<Coord2> = HashSet::new();
        let mut to_visit: Vec<Coord2> = Vec::from([coords]);

        while let Some(visit_coords) = to_visit.pop() {
            if !visited.insert(visit_coords) {
                continue;
            }

            let tile = *self.tile(visit_coords);
            if tile.is_flag {
                continue;
            }
            if tile.is_open && visit_coords != coords {
                continue;
            }

            if !tile.is_open {
                outcome = outcome | self.open_tile(visit_coords);
            }

            if self.cascades(visit_coords) {
                let neighbors = &self.neighbors[visit_coords.to_nd_index()];
                // reversed so tiles pop in neighbor order
                to_visit.extend(
                    neighbors
                        .iter()
                        .rev()
                        .filter(|&pos| !visited.contains(pos) && !self.tile(*pos).is_open),
                );
            }
        }

        if self.check_win_condition() {
            outcome = Won;
        }
        if outcome.has_update() {
            self.notify();
        }

        Ok(outcome)
    }

    /// Opens a single closed tile without cascading, losing the game if it holds the first mine hit.
    fn open_tile(&mut self, coords: Coord2) -> RevealOutcome {
        let tile = self.tile_mut(coords);
        tile.is_open = true;
        let is_mine = tile.is_mine;
        self.closed.remove(&coords);
        log::trace!("Open tile at {:?}", coords);

        if is_mine && !matches!(self.status, GameStatus::Lost) {
            self.lose_at(Some(coords));
            RevealOutcome::HitMine
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Ends the game as lost, revealing every mine. Does nothing once the game is already decided.
    pub fn lose(&mut self) {
        if self.lose_at(None) {
            self.notify();
        }
    }

    fn lose_at(&mut self, culprit: Option<Coord2>) -> bool {
        if !self.status.is_playing() {
            return false;
        }

        self.status = GameStatus::Lost;
        if let Some(culprit) = culprit {
            self.tile_mut(culprit).is_culprit = true;
        }

        for &coords in &self.mines {
            self.tiles[coords.to_nd_index()].is_open = true;
            self.closed.remove(&coords);
        }
        log::debug!("Game lost, culprit: {:?}", culprit);
        true
    }

    /// Wins the game once every mine is flagged and every safe tile is open. Returns whether the board
    /// just transitioned to won. Callers notify the listener.
    pub(crate) fn check_win_condition(&mut self) -> bool {
        let mines = self.config.mines;
        if self.flagged_mines == mines && self.closed.len() == usize::from(mines) {
            self.win()
        } else {
            false
        }
    }

    fn win(&mut self) -> bool {
        if !self.status.is_playing() {
            return false;
        }

        self.status = GameStatus::Won;
        log::debug!("Game won");
        self.start_snake();
        true
    }

    /// Solves the board in place: flags every mine and opens every safe tile, bypassing the cascade.
    /// Lost and already won boards are left as they are.
    pub fn auto_win(&mut self) -> RevealOutcome {
        if !self.status.is_playing() {
            return RevealOutcome::NoChange;
        }

        for tile in self.tiles.iter_mut() {
            tile.is_flag = tile.is_mine;
            tile.is_open = !tile.is_mine;
        }
        self.flags = self.mines.clone();
        self.closed = self.mines.clone();
        self.flagged_mines = self.config.mines;

        let won = self.check_win_condition();
        self.notify();

        if won {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("config", &self.config)
            .field("status", &self.status)
            .field("flagged_mines", &self.flagged_mines)
            .field("flags", &self.flags.len())
            .field("closed", &self.closed.len())
            .field("snake", &self.snake)
            .finish_non_exhaustive()
    }
}

impl Tile {
    fn is_closed_unflagged(&self) -> bool {
        !self.is_open && !self.is_flag
    }
}
