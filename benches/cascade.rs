use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokio::runtime::Runtime;

use match3_engine::core::matching::{can_swap, scan_board};
use match3_engine::core::{Board, ChipSpawner};
use match3_engine::engine::{CascadeEngine, NoopAnimator};
use match3_engine::types::ChipType;

fn stable_board(seed: u32) -> Board {
    let mut board = Board::new(8, 8);
    ChipSpawner::new(seed).fill(&mut board).unwrap();
    board
}

fn bench_fill(c: &mut Criterion) {
    c.bench_function("fill_8x8", |b| {
        b.iter(|| {
            let mut board = Board::new(8, 8);
            ChipSpawner::new(black_box(12345)).fill(&mut board).unwrap();
            board
        })
    });
}

fn bench_scan_board(c: &mut Criterion) {
    // A stable board is the worst case: every cell is scanned, nothing merges
    let board = stable_board(12345);
    c.bench_function("scan_board_8x8_stable", |b| {
        b.iter(|| scan_board(black_box(&board)))
    });
}

fn bench_scan_board_matched(c: &mut Criterion) {
    let mut board = Board::new(8, 8);
    for pos in board.positions().collect::<Vec<_>>() {
        board.place_new_chip(pos, ChipType::Blue).unwrap();
    }
    c.bench_function("scan_board_8x8_single_color", |b| {
        b.iter(|| scan_board(black_box(&board)))
    });
}

fn bench_swap_probe(c: &mut Criterion) {
    let mut board = stable_board(777);
    c.bench_function("probe_all_swaps_8x8", |b| {
        b.iter(|| {
            let mut valid = 0;
            for pos in board.positions().collect::<Vec<_>>() {
                for other in [pos.offset(1, 0), pos.offset(0, 1)] {
                    if board.contains(other) && can_swap(&mut board, pos, other) {
                        valid += 1;
                    }
                }
            }
            valid
        })
    });
}

fn bench_swap_and_settle(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let board = stable_board(4);
    let (a, b) = {
        let mut probe = board.clone();
        let mut found = None;
        for pos in probe.positions().collect::<Vec<_>>() {
            for other in [pos.offset(1, 0), pos.offset(0, 1)] {
                if probe.contains(other) && can_swap(&mut probe, pos, other) {
                    found = Some((pos, other));
                    break;
                }
            }
            if found.is_some() {
                break;
            }
        }
        found.expect("seeded board has a valid move")
    };

    c.bench_function("swap_and_settle_8x8", |bench| {
        bench.iter(|| {
            let mut engine = CascadeEngine::with_board(board.clone(), 4, NoopAnimator);
            rt.block_on(engine.request_swap(black_box(a), black_box(b)))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_fill,
    bench_scan_board,
    bench_scan_board_matched,
    bench_swap_probe,
    bench_swap_and_settle
);
criterion_main!(benches);
