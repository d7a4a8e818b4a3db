//! Board tests - grid addressing and chip ownership through the public API

use match3_engine::core::{Board, BoardError, ChipSpawner};
use match3_engine::types::{ChipType, GridPos, DEFAULT_HEIGHT, DEFAULT_WIDTH};

#[test]
fn test_default_sized_board() {
    let board = Board::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    assert_eq!(board.width(), DEFAULT_WIDTH);
    assert_eq!(board.height(), DEFAULT_HEIGHT);
    assert_eq!(board.chip_count(), 0);
    assert!(board.positions().all(|p| board.is_empty(p)));
}

#[test]
fn test_out_of_range_is_raised_never_clamped() {
    let board = Board::new(4, 4);
    for pos in [
        GridPos::new(-1, 0),
        GridPos::new(0, -1),
        GridPos::new(4, 0),
        GridPos::new(0, 4),
        GridPos::new(127, 127),
    ] {
        assert!(matches!(
            board.chip_at(pos),
            Err(BoardError::OutOfRange { .. })
        ));
        assert!(!board.contains(pos));
        // kind_at is the non-raising probe used by run scanning
        assert_eq!(board.kind_at(pos), None);
    }
}

#[test]
fn test_ownership_holds_through_mixed_operations() {
    let mut board = Board::new(5, 5);
    let mut spawner = ChipSpawner::new(99);
    spawner.fill(&mut board).unwrap();
    board.validate_ownership().unwrap();

    // Swap two neighbors
    board
        .swap_chips(GridPos::new(1, 1), GridPos::new(2, 1))
        .unwrap();
    board.validate_ownership().unwrap();

    // Destroy a few cells, settle, refill
    for pos in [GridPos::new(0, 2), GridPos::new(1, 2), GridPos::new(2, 2)] {
        board.destroy_chip(pos).unwrap();
    }
    board.validate_ownership().unwrap();
    assert_eq!(board.chip_count(), 22);

    let falls = board.settle_columns();
    assert!(!falls.is_empty());
    board.validate_ownership().unwrap();

    spawner.refill(&mut board).unwrap();
    assert_eq!(board.chip_count(), 25);
    board.validate_ownership().unwrap();
}

#[test]
fn test_settle_reports_fall_distances() {
    let mut board = Board::new(2, 4);
    let a = board
        .place_new_chip(GridPos::new(0, 3), ChipType::Blue)
        .unwrap();
    board
        .place_new_chip(GridPos::new(1, 0), ChipType::Red)
        .unwrap();

    let falls = board.settle_columns();
    assert_eq!(falls.len(), 1);
    assert_eq!(falls[0].chip, a);
    assert_eq!(falls[0].from, GridPos::new(0, 3));
    assert_eq!(falls[0].to, GridPos::new(0, 0));
    assert_eq!(falls[0].distance, 3);
}

#[test]
fn test_refill_lands_chips_at_column_tops() {
    let mut board = Board::new(3, 3);
    let mut spawner = ChipSpawner::new(5);
    spawner.fill(&mut board).unwrap();

    board.destroy_chip(GridPos::new(1, 0)).unwrap();
    board.settle_columns();
    let spawns = spawner.refill(&mut board).unwrap();

    // The gap bubbled to the top of its column before refilling
    assert_eq!(spawns.len(), 1);
    assert_eq!(spawns[0].pos, GridPos::new(1, 2));
    assert_eq!(spawns[0].distance, 1);
    assert_eq!(board.chip_count(), 9);
}

#[test]
fn test_clear_then_refill_restores_full_board() {
    let mut board = Board::new(4, 4);
    let mut spawner = ChipSpawner::new(8);
    spawner.fill(&mut board).unwrap();
    board.clear();
    assert_eq!(board.chip_count(), 0);
    spawner.fill(&mut board).unwrap();
    assert_eq!(board.chip_count(), 16);
    board.validate_ownership().unwrap();
}
