//! Animate module - visual intents and phase join points
//!
//! The engine mutates the board at the instant a phase starts and then emits
//! a batch of visual ops describing what a presentation layer should play.
//! A phase only advances once its whole batch has completed: `play` resolves
//! when every op in the batch is done (await-all, never first-of).

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

use crate::core::board::ChipId;
use crate::types::{ChipType, GridPos, CASCADE_PAUSE_MS, DESTROY_MS, MOVE_MS_PER_CELL};

/// One visual intent within a phase batch. Ops within a batch are
/// order-independent and may be played concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualOp {
    /// Slide a chip between cells (swap moves and gravity drops)
    Move {
        chip: ChipId,
        from: GridPos,
        to: GridPos,
        /// Cells traveled; animation time scales with this
        distance: u8,
    },
    /// Shrink-and-remove a destroyed chip
    Destroy { chip: ChipId, at: GridPos },
    /// Drop a freshly created chip in from above the top edge
    Spawn {
        chip: ChipId,
        at: GridPos,
        distance: u8,
    },
    /// Recolor a chip in place (skill transform)
    Transform {
        chip: ChipId,
        at: GridPos,
        kind: ChipType,
    },
}

impl VisualOp {
    /// Wall-clock envelope of this op when played in real time
    pub fn duration(&self) -> Duration {
        match self {
            VisualOp::Move { distance, .. } | VisualOp::Spawn { distance, .. } => {
                Duration::from_millis(MOVE_MS_PER_CELL * u64::from(*distance))
            }
            VisualOp::Destroy { .. } | VisualOp::Transform { .. } => {
                Duration::from_millis(DESTROY_MS)
            }
        }
    }
}

/// Plays phase batches. Implementations decide what "playing" means: the
/// demo sleeps through real time, tests complete instantly or hold the
/// engine suspended on purpose.
pub trait Animator: Send + 'static {
    /// Resolves once every op in the batch has completed
    fn play(&mut self, batch: Vec<VisualOp>) -> impl Future<Output = ()> + Send;
}

/// Completes every batch immediately (headless resolution)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnimator;

impl Animator for NoopAnimator {
    fn play(&mut self, _batch: Vec<VisualOp>) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// Sleeps for the longest op in the batch - the awaited envelope of ops
/// playing concurrently. `speedup` divides all durations for fast demos.
#[derive(Debug, Clone, Copy)]
pub struct DelayAnimator {
    speedup: u32,
}

impl DelayAnimator {
    pub fn new(speedup: u32) -> Self {
        Self {
            speedup: speedup.max(1),
        }
    }
}

impl Default for DelayAnimator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Animator for DelayAnimator {
    fn play(&mut self, batch: Vec<VisualOp>) -> impl Future<Output = ()> + Send {
        let mut longest = batch
            .iter()
            .map(VisualOp::duration)
            .max()
            .unwrap_or(Duration::ZERO);
        if !longest.is_zero() {
            // Short beat after each batch so cascade steps read as distinct
            longest += Duration::from_millis(CASCADE_PAUSE_MS);
        }
        let envelope = longest / self.speedup;
        async move {
            if !envelope.is_zero() {
                sleep(envelope).await;
            }
        }
    }
}

/// Holds each batch until the paired [`BatchGate`] releases it. Lets tests
/// keep the engine suspended mid-phase to exercise the interaction lock.
#[derive(Debug, Clone)]
pub struct ManualAnimator {
    permits: Arc<Semaphore>,
}

/// Release handle for a [`ManualAnimator`]
#[derive(Debug, Clone)]
pub struct BatchGate {
    permits: Arc<Semaphore>,
}

impl BatchGate {
    /// Let the next `batches` suspended or future batches complete
    pub fn release(&self, batches: usize) {
        self.permits.add_permits(batches);
    }

    /// Let every batch through from now on
    pub fn open(&self) {
        self.permits.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

impl ManualAnimator {
    pub fn new() -> (Self, BatchGate) {
        let permits = Arc::new(Semaphore::new(0));
        (
            Self {
                permits: Arc::clone(&permits),
            },
            BatchGate { permits },
        )
    }
}

impl Animator for ManualAnimator {
    fn play(&mut self, _batch: Vec<VisualOp>) -> impl Future<Output = ()> + Send {
        let permits = Arc::clone(&self.permits);
        async move {
            if let Ok(permit) = permits.acquire().await {
                permit.forget();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_duration_scales_with_distance() {
        let op = VisualOp::Spawn {
            chip: dummy_chip(),
            at: GridPos::new(0, 3),
            distance: 4,
        };
        assert_eq!(op.duration(), Duration::from_millis(MOVE_MS_PER_CELL * 4));
    }

    #[tokio::test]
    async fn noop_animator_completes_immediately() {
        let mut animator = NoopAnimator;
        animator
            .play(vec![VisualOp::Destroy {
                chip: dummy_chip(),
                at: GridPos::new(0, 0),
            }])
            .await;
    }

    #[test]
    fn manual_animator_blocks_until_released() {
        let (mut animator, gate) = ManualAnimator::new();
        let mut batch = tokio_test::task::spawn(animator.play(vec![]));

        // Not released yet: the batch must still be pending
        tokio_test::assert_pending!(batch.poll());
        gate.release(1);
        assert!(batch.is_woken());
        tokio_test::assert_ready!(batch.poll());
    }

    #[test]
    fn gate_open_releases_all_future_batches() {
        let (mut animator, gate) = ManualAnimator::new();
        gate.open();
        for _ in 0..3 {
            let mut batch = tokio_test::task::spawn(animator.play(vec![]));
            tokio_test::assert_ready!(batch.poll());
        }
    }

    fn dummy_chip() -> ChipId {
        use crate::core::Board;
        let mut board = Board::new(1, 1);
        board
            .place_new_chip(GridPos::new(0, 0), ChipType::Blue)
            .unwrap()
    }
}
