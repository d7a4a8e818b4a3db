//! Demo binary - scripted auto-play of one crafting round
//!
//! Spawns the engine with a time-scaled animator, probes the board for valid
//! moves, and plays until the round's turns are spent, printing the board
//! and running score after every settled cascade.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use match3_engine::core::matching::can_swap;
use match3_engine::core::Board;
use match3_engine::engine::{BoardHandle, CascadeEngine, DelayAnimator, SwapOutcome};
use match3_engine::session::{CraftConfig, CraftSession};
use match3_engine::term::BoardView;
use match3_engine::types::{GridPos, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Probe a board clone for an adjacent pair whose exchange makes a match
fn find_valid_swap(board: &Board) -> Option<(GridPos, GridPos)> {
    let mut probe = board.clone();
    for pos in probe.positions().collect::<Vec<_>>() {
        for other in [pos.offset(1, 0), pos.offset(0, 1)] {
            if probe.contains(other) && can_swap(&mut probe, pos, other) {
                return Some((pos, other));
            }
        }
    }
    None
}

fn print_board(view: &BoardView, board: &Board) {
    for line in view.render_styled(board) {
        println!("  {line}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u32>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(1)
        });

    let engine = CascadeEngine::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, seed, DelayAnimator::new(20))
        .context("initial board fill")?;
    let handle = BoardHandle::spawn(engine);
    let mut events = handle.subscribe().await?;
    let mut session = CraftSession::new(CraftConfig::default());
    let view = BoardView;

    println!("match3-demo (seed {seed})");
    print_board(&view, &handle.board().await?);

    while !session.finished() {
        let board = handle.board().await?;
        let Some((a, b)) = find_valid_swap(&board) else {
            println!("no valid moves left, reshuffling");
            handle.reinitialize().await?;
            continue;
        };

        let outcome = handle.request_swap(a, b).await?;
        session.drain(&mut events);

        if outcome != SwapOutcome::Committed {
            // A probed move should always commit; bail out rather than spin
            anyhow::bail!("probed swap {a:?} <-> {b:?} was rejected: {outcome:?}");
        }

        println!(
            "turn {}: swapped ({}, {}) <-> ({}, {}), score {}",
            session.turns_made(),
            a.x,
            a.y,
            b.x,
            b.y,
            session.total_score()
        );
        print_board(&view, &handle.board().await?);
    }

    println!(
        "round over after {} turns, final score {}",
        session.turns_made(),
        session.total_score()
    );
    Ok(())
}
