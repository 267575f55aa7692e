use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use sweeper_core::*;

fn board(height: Coord, width: Coord, mines: &[Coord2]) -> Board {
    Board::from_mine_coords(height, width, mines).unwrap()
}

fn open_tiles(board: &Board) -> BTreeSet<Coord2> {
    board
        .tiles()
        .filter(|tile| tile.is_open())
        .map(Tile::coords)
        .collect()
}

#[test]
fn mine_count_matches_config_for_many_seeds() {
    let config = Difficulty::Expert.config();
    for seed in 0..20 {
        let board = Board::new(config, seed).unwrap();
        assert_eq!(board.mines().len(), usize::from(config.mines));
        assert_eq!(
            board.tiles().filter(|tile| tile.is_mine()).count(),
            usize::from(config.mines)
        );
    }
}

#[test]
fn neighbor_lists_are_symmetric() {
    let board = Board::new(GameConfig::new_unchecked(7, 5, 6), 1).unwrap();
    for tile in board.tiles() {
        let neighbors = board.neighbors(tile.coords()).unwrap();
        assert!(neighbors.len() <= 8);
        for &other in neighbors {
            assert!(
                board.neighbors(other).unwrap().contains(&tile.coords()),
                "{:?} lists {:?} but not the other way around",
                tile.coords(),
                other
            );
        }
    }
}

#[test]
fn cascade_from_corner_stops_at_mine_border() {
    let mut board = board(3, 3, &[(2, 2)]);

    assert_eq!(board.open((0, 0)).unwrap(), RevealOutcome::Revealed);

    let expected: BTreeSet<Coord2> = board
        .tiles()
        .map(Tile::coords)
        .filter(|&coords| coords != (2, 2))
        .collect();
    assert_eq!(open_tiles(&board), expected);
    assert_eq!(board.neighbor_mine_count((1, 1)), Ok(1));
    assert_eq!(board.closed().iter().copied().collect::<Vec<_>>(), [(2, 2)]);
    assert_eq!(board.status(), GameStatus::Playing);
}

#[test]
fn cascade_opens_region_and_its_border_only() {
    // a wall of mines splits the board, the right side must stay closed
    let mut board = board(4, 5, &[(0, 2), (1, 2), (2, 2), (3, 2)]);

    board.open((0, 0)).unwrap();

    let left: BTreeSet<Coord2> = (0..4).flat_map(|row| [(row, 0), (row, 1)]).collect();
    assert_eq!(open_tiles(&board), left);
}

#[test]
fn cascade_never_opens_flags() {
    let mut board = board(5, 5, &[(4, 4)]);
    board.flag((1, 1)).unwrap();
    board.flag((0, 4)).unwrap();

    assert_eq!(board.open((0, 0)).unwrap(), RevealOutcome::Revealed);

    assert!(!board.tile_at((1, 1)).unwrap().is_open());
    assert!(!board.tile_at((0, 4)).unwrap().is_open());
    assert!(board.tile_at((4, 0)).unwrap().is_open());
}

#[test]
fn flood_fill_terminates_on_degenerate_boards() {
    let mut empty = board(1, 200, &[]);
    assert_eq!(empty.open((0, 100)).unwrap(), RevealOutcome::Won);

    let mut column = board(200, 1, &[(0, 0)]);
    column.flag((0, 0)).unwrap();
    assert_eq!(column.open((199, 0)).unwrap(), RevealOutcome::Won);

    let mut large = Board::new(GameConfig::new_unchecked(255, 255, 0), 0).unwrap();
    assert_eq!(large.open((128, 128)).unwrap(), RevealOutcome::Won);
    assert!(large.closed().is_empty());
}

#[test]
fn loss_is_terminal() {
    let mut board = board(3, 3, &[(0, 0), (2, 2)]);
    let notified = Rc::new(Cell::new(0));
    let counter = notified.clone();
    board.set_listener(move || counter.set(counter.get() + 1));

    assert_eq!(board.open((0, 0)).unwrap(), RevealOutcome::HitMine);
    assert_eq!(notified.get(), 1);

    assert!(board.mines().iter().all(|&mine| board.tile_at(mine).unwrap().is_open()));
    let culprits: Vec<_> = board
        .tiles()
        .filter(|tile| tile.is_culprit())
        .map(Tile::coords)
        .collect();
    assert_eq!(culprits, [(0, 0)]);

    // nothing afterwards can move the status or mark a second culprit
    board.open((2, 2)).unwrap();
    board.flag((1, 2)).unwrap();
    board.open((1, 1)).unwrap();
    board.lose();
    assert_eq!(board.status(), GameStatus::Lost);
    assert_eq!(board.tiles().filter(|tile| tile.is_culprit()).count(), 1);
}

#[test]
fn win_condition_ignored_after_loss() {
    let mut board = board(2, 2, &[(0, 0)]);
    board.flag((0, 0)).unwrap();
    board.flag((1, 1)).unwrap();
    board.lose();

    // the wrong flag keeps both opens from cascading
    board.open((0, 1)).unwrap();
    assert_eq!(board.open((1, 0)).unwrap(), RevealOutcome::Revealed);

    assert_eq!(board.closed().len(), 1);
    assert_eq!(board.flagged_mines(), 1);
    assert_eq!(board.status(), GameStatus::Lost);
}

#[test]
fn open_driven_and_flag_driven_wins_agree() {
    let mines = [(0, 0), (3, 3)];

    let mut flag_last = board(4, 4, &mines);
    assert_eq!(flag_last.open((0, 3)).unwrap(), RevealOutcome::Revealed);
    assert_eq!(flag_last.flag((0, 0)).unwrap(), MarkOutcome::Changed);
    assert_eq!(flag_last.flag((3, 3)).unwrap(), MarkOutcome::Won);

    let mut open_last = board(4, 4, &mines);
    open_last.flag((0, 0)).unwrap();
    open_last.flag((3, 3)).unwrap();
    assert_eq!(open_last.status(), GameStatus::Playing);
    assert_eq!(open_last.open((0, 3)).unwrap(), RevealOutcome::Won);

    for board in [&flag_last, &open_last] {
        assert_eq!(board.status(), GameStatus::Won);
        assert_eq!(board.flags(), board.mines());
        assert_eq!(board.closed(), board.mines());
    }
    assert_eq!(open_tiles(&flag_last), open_tiles(&open_last));
}

#[test]
fn flags_frozen_after_win() {
    let mut board = board(2, 1, &[(0, 0)]);
    board.open((1, 0)).unwrap();
    board.flag((0, 0)).unwrap();
    assert_eq!(board.status(), GameStatus::Won);

    assert_eq!(board.flag((0, 0)).unwrap(), MarkOutcome::NoChange);
    assert!(board.tile_at((0, 0)).unwrap().is_flag());
}

#[test]
fn auto_win_on_random_boards() {
    for seed in 0..10 {
        let mut board = Board::new(Difficulty::Intermediate.config(), seed).unwrap();
        assert_eq!(board.auto_win(), RevealOutcome::Won);

        for tile in board.tiles() {
            if tile.is_mine() {
                assert!(tile.is_flag() && !tile.is_open());
            } else {
                assert!(tile.is_open() && !tile.is_flag());
            }
        }
        assert_eq!(board.mines_left(), 0);
    }
}

#[test]
fn session_animation_survives_only_its_board() {
    let scheduler = Rc::new(ManualScheduler::new());
    let renders = Rc::new(Cell::new(0));
    let counter = renders.clone();
    let board = board(6, 6, &[(0, 0)]).with_listener(move || counter.set(counter.get() + 1));
    let mut session = GameSession::new(board, scheduler.clone());

    session.flag((0, 0)).unwrap();
    assert_eq!(session.open((5, 5)).unwrap(), RevealOutcome::Won);
    let renders_at_win = renders.get();

    for _ in 0..SNAKE_FRAME_SKIP * 10 {
        scheduler.run_frame();
    }
    assert_eq!(session.board().status(), GameStatus::Won);
    assert!(renders.get() > renders_at_win);

    session.new_game(Board::new(Difficulty::Resume.config(), 4).unwrap());
    scheduler.run_frame();
    assert_eq!(scheduler.pending(), 0);
    assert_eq!(session.board().status(), GameStatus::Playing);
}
