use sweeper_core::{Board, TileView};

/// Marks the snake's head during the win animation.
const GLASSES: char = '@';

pub fn render(board: &Board) -> String {
    let mut out = format!(
        "{:?}, mines left: {}\n",
        board.status(),
        board.mines_left()
    );
    for row in 0..board.height() {
        out.extend(board.row(row).map(|tile| {
            if tile.is_glasses() {
                GLASSES
            } else {
                TileView::of(board, tile).glyph()
            }
        }));
        out.push('\n');
    }
    out
}
