use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a player may see of a single tile. Mines and counts of closed tiles stay hidden.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileView {
    Closed,
    Flagged,
    Open(u8),
    Mine,
    /// The mine that lost the game.
    Culprit,
    /// A flag that turned out to be on a mine, shown once the game is lost.
    FlaggedMine,
}

impl TileView {
    pub fn of(board: &Board, tile: &Tile) -> Self {
        match (tile.is_open(), tile.is_flag(), tile.is_mine()) {
            (false, true, _) => Self::Flagged,
            (false, false, _) => Self::Closed,
            (true, _, true) if tile.is_culprit() => Self::Culprit,
            (true, true, true) => Self::FlaggedMine,
            (true, false, true) => Self::Mine,
            (true, _, false) => Self::Open(
                board
                    .neighbor_mine_count(tile.coords())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Single character used by text renderers.
    pub const fn glyph(self) -> char {
        match self {
            Self::Closed => '#',
            Self::Flagged => 'F',
            Self::Open(0) => '.',
            Self::Open(count) => (b'0' + count) as char,
            Self::Mine => '*',
            Self::Culprit => 'X',
            Self::FlaggedMine => '+',
        }
    }
}

/// Serializable copy of everything a presentation layer reads from a [`Board`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub height: Coord,
    pub width: Coord,
    pub status: GameStatus,
    pub mines: CellCount,
    pub flags: CellCount,
    pub closed: CellCount,
    pub mines_left: i32,
    pub snake_head: Option<Coord2>,
    /// Row-major tile views.
    pub tiles: Vec<TileView>,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board) -> Self {
        let count = |len: usize| CellCount::try_from(len).unwrap_or(CellCount::MAX);
        Self {
            height: board.height(),
            width: board.width(),
            status: board.status(),
            mines: board.total_mines(),
            flags: count(board.flags().len()),
            closed: count(board.closed().len()),
            mines_left: board.mines_left(),
            snake_head: board
                .tiles()
                .find(|tile| tile.is_glasses())
                .map(Tile::coords),
            tiles: board.tiles().map(|tile| TileView::of(board, tile)).collect(),
        }
    }

    pub fn tile(&self, (row, col): Coord2) -> Option<TileView> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let index = usize::from(row) * usize::from(self.width) + usize::from(col);
        self.tiles.get(index).copied()
    }
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_board(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_tiles_hide_mines() {
        let board = Board::from_mine_coords(2, 2, &[(0, 0)]).unwrap();
        let snapshot = board.snapshot();

        assert!(snapshot.tiles.iter().all(|&view| view == TileView::Closed));
        assert_eq!(snapshot.closed, 4);
        assert_eq!(snapshot.mines_left, 1);
    }

    #[test]
    fn lost_board_views() {
        let mut board = Board::from_mine_coords(2, 3, &[(0, 0), (0, 2)]).unwrap();
        board.flag((0, 2)).unwrap();
        board.open((0, 0)).unwrap();

        let snapshot = board.snapshot();

        assert_eq!(snapshot.status, GameStatus::Lost);
        assert_eq!(snapshot.tile((0, 0)), Some(TileView::Culprit));
        assert_eq!(snapshot.tile((0, 2)), Some(TileView::FlaggedMine));
        // the culprit has no mined neighbors, so its neighborhood cascades open
        assert_eq!(snapshot.tile((1, 1)), Some(TileView::Open(2)));
        assert_eq!(snapshot.tile((1, 2)), Some(TileView::Closed));
        assert_eq!(snapshot.tile((2, 0)), None);
    }

    #[test]
    fn snapshot_json_shape() {
        let mut board = Board::from_mine_coords(1, 2, &[(0, 1)]).unwrap();
        board.open((0, 0)).unwrap();

        let json = serde_json::to_value(board.snapshot()).unwrap();

        assert_eq!(json["status"], "Playing");
        assert_eq!(json["tiles"][0]["Open"], 1);
        assert_eq!(json["tiles"][1], "Closed");
        assert_eq!(json["snake_head"], serde_json::Value::Null);
    }

    #[test]
    fn glyphs() {
        assert_eq!(TileView::Open(3).glyph(), '3');
        assert_eq!(TileView::Open(0).glyph(), '.');
        assert_eq!(TileView::Closed.glyph(), '#');
    }
}
