//! Handle module - channel front door to a running engine
//!
//! The engine is single-owner: one task drives all board mutation. The
//! handle bridges callers to that task over an mpsc command channel with
//! oneshot replies, and checks the shared interaction lock *before*
//! dispatching so requests arriving mid-cascade are rejected rather than
//! queued behind the running cascade. The engine re-checks the lock itself,
//! so the early check is the no-queuing policy, not a correctness
//! requirement.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::core::board::{Board, BoardError};
use crate::engine::animate::Animator;
use crate::engine::cascade::{
    CascadeEngine, InteractionLock, RejectReason, SkillOutcome, SwapOutcome,
};
use crate::skills::{SkillEffect, SkillPattern};
use crate::types::{BoardEvent, Direction, GridPos};

enum Command {
    Swap {
        a: GridPos,
        b: GridPos,
        reply: oneshot::Sender<Result<SwapOutcome, BoardError>>,
    },
    Swipe {
        origin: GridPos,
        direction: Direction,
        reply: oneshot::Sender<Result<SwapOutcome, BoardError>>,
    },
    DestroyAt {
        pos: GridPos,
        reply: oneshot::Sender<Result<SkillOutcome, BoardError>>,
    },
    Skill {
        origin: GridPos,
        pattern: SkillPattern,
        effect: SkillEffect,
        reply: oneshot::Sender<Result<SkillOutcome, BoardError>>,
    },
    Reinitialize {
        reply: oneshot::Sender<Result<(), BoardError>>,
    },
    SetTargeting {
        pattern: Option<SkillPattern>,
    },
    TargetingCells {
        hover: GridPos,
        reply: oneshot::Sender<Vec<GridPos>>,
    },
    Inspect {
        reply: oneshot::Sender<Board>,
    },
    Subscribe {
        reply: oneshot::Sender<mpsc::UnboundedReceiver<BoardEvent>>,
    },
}

/// The engine task went away (runtime shutdown); surfaced as a contract
/// error since it cannot happen while the handle is used normally
const ENGINE_GONE: BoardError = BoardError::StructuralViolation("engine task stopped");

/// Front door to an engine running in its own task
pub struct BoardHandle {
    tx: mpsc::Sender<Command>,
    lock: InteractionLock,
    _task: JoinHandle<()>,
}

impl BoardHandle {
    /// Move the engine into a task and return its handle
    pub fn spawn<A: Animator>(mut engine: CascadeEngine<A>) -> Self {
        let lock = engine.interaction_lock();
        let (tx, mut rx) = mpsc::channel::<Command>(16);

        let task = tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    Command::Swap { a, b, reply } => {
                        let _ = reply.send(engine.request_swap(a, b).await);
                    }
                    Command::Swipe {
                        origin,
                        direction,
                        reply,
                    } => {
                        let _ = reply.send(engine.request_swipe(origin, direction).await);
                    }
                    Command::DestroyAt { pos, reply } => {
                        let _ = reply.send(engine.destroy_chip_at(pos).await);
                    }
                    Command::Skill {
                        origin,
                        pattern,
                        effect,
                        reply,
                    } => {
                        let _ = reply.send(engine.apply_skill(origin, pattern, &effect).await);
                    }
                    Command::Reinitialize { reply } => {
                        let _ = reply.send(engine.reinitialize());
                    }
                    Command::SetTargeting { pattern } => {
                        engine.set_targeting_pattern(pattern);
                    }
                    Command::TargetingCells { hover, reply } => {
                        let _ = reply.send(engine.targeting_cells(hover));
                    }
                    Command::Inspect { reply } => {
                        let _ = reply.send(engine.board().clone());
                    }
                    Command::Subscribe { reply } => {
                        let _ = reply.send(engine.subscribe());
                    }
                }
            }
        });

        Self {
            tx,
            lock,
            _task: task,
        }
    }

    /// Whether the board currently accepts swap/skill requests
    pub fn can_interact(&self) -> bool {
        self.lock.can_interact()
    }

    async fn dispatch(&self, cmd: Command) -> Result<(), BoardError> {
        self.tx.send(cmd).await.map_err(|_| ENGINE_GONE)
    }

    pub async fn request_swap(&self, a: GridPos, b: GridPos) -> Result<SwapOutcome, BoardError> {
        if !self.lock.can_interact() {
            return Ok(SwapOutcome::Rejected(RejectReason::Locked));
        }
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Swap { a, b, reply }).await?;
        rx.await.map_err(|_| ENGINE_GONE)?
    }

    pub async fn request_swipe(
        &self,
        origin: GridPos,
        direction: Direction,
    ) -> Result<SwapOutcome, BoardError> {
        if !self.lock.can_interact() {
            return Ok(SwapOutcome::Rejected(RejectReason::Locked));
        }
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Swipe {
            origin,
            direction,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ENGINE_GONE)?
    }

    pub async fn destroy_chip_at(&self, pos: GridPos) -> Result<SkillOutcome, BoardError> {
        if !self.lock.can_interact() {
            return Ok(SkillOutcome::RejectedBusy);
        }
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::DestroyAt { pos, reply }).await?;
        rx.await.map_err(|_| ENGINE_GONE)?
    }

    pub async fn apply_skill(
        &self,
        origin: GridPos,
        pattern: SkillPattern,
        effect: SkillEffect,
    ) -> Result<SkillOutcome, BoardError> {
        if !self.lock.can_interact() {
            return Ok(SkillOutcome::RejectedBusy);
        }
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Skill {
            origin,
            pattern,
            effect,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ENGINE_GONE)?
    }

    pub async fn reinitialize(&self) -> Result<(), BoardError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Reinitialize { reply }).await?;
        rx.await.map_err(|_| ENGINE_GONE)?
    }

    /// Arm or disarm the hover-highlight pattern (fire and forget)
    pub async fn set_targeting_pattern(
        &self,
        pattern: Option<SkillPattern>,
    ) -> Result<(), BoardError> {
        self.dispatch(Command::SetTargeting { pattern }).await
    }

    pub async fn targeting_cells(&self, hover: GridPos) -> Result<Vec<GridPos>, BoardError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::TargetingCells { hover, reply }).await?;
        rx.await.map_err(|_| ENGINE_GONE)
    }

    /// Clone of the current board state (for rendering and probing)
    pub async fn board(&self) -> Result<Board, BoardError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Inspect { reply }).await?;
        rx.await.map_err(|_| ENGINE_GONE)
    }

    /// Register an event observer on the running engine
    pub async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<BoardEvent>, BoardError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(Command::Subscribe { reply }).await?;
        rx.await.map_err(|_| ENGINE_GONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::animate::{ManualAnimator, NoopAnimator};
    use crate::types::ChipType;

    fn spawn_engine(seed: u32) -> BoardHandle {
        let engine = CascadeEngine::new(6, 6, seed, NoopAnimator).unwrap();
        BoardHandle::spawn(engine)
    }

    #[tokio::test]
    async fn handle_round_trips_board_state() {
        let handle = spawn_engine(11);
        let board = handle.board().await.unwrap();
        assert_eq!(board.chip_count(), 36);
        assert!(handle.can_interact());
    }

    #[tokio::test]
    async fn handle_rejects_while_cascade_in_flight() {
        // Scenario E: requests arriving mid-cascade are rejected, not queued
        let (animator, gate) = ManualAnimator::new();
        let engine = CascadeEngine::new(6, 6, 1, animator).unwrap();
        let handle = BoardHandle::spawn(engine);

        let board = handle.board().await.unwrap();
        let (a, b) = {
            let mut probe = board.clone();
            let mut found = None;
            for pos in probe.positions().collect::<Vec<_>>() {
                for other in [pos.offset(1, 0), pos.offset(0, 1)] {
                    if probe.contains(other)
                        && crate::core::matching::can_swap(&mut probe, pos, other)
                    {
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

        // First request holds on the unreleased swap animation batch
        let first = {
            let (reply, rx) = oneshot::channel();
            handle
                .dispatch(Command::Swap { a, b, reply })
                .await
                .unwrap();
            rx
        };
        // Give the engine task a chance to start the cascade
        for _ in 0..100 {
            if !handle.can_interact() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!handle.can_interact());

        let second = handle.request_swap(a, b).await.unwrap();
        assert_eq!(second, SwapOutcome::Rejected(RejectReason::Locked));

        // Release all animation batches and let the first request finish
        gate.open();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome, SwapOutcome::Committed);
        assert!(handle.can_interact());

        // Board is stable again and a new request is accepted or cleanly
        // rejected on its own merits, not because of the lock
        let board = handle.board().await.unwrap();
        assert_eq!(board.chip_count(), 36);
        let retry = handle.request_swap(a, b).await.unwrap();
        assert_ne!(retry, SwapOutcome::Rejected(RejectReason::Locked));
    }

    #[tokio::test]
    async fn whole_field_destroy_through_handle() {
        // Scenario D shape: destroy every chip of one type across the board
        let handle = spawn_engine(17);
        let board = handle.board().await.unwrap();
        let target = ChipType::Blue;
        let expected = board
            .positions()
            .filter(|&p| board.kind_at(p) == Some(target))
            .count();

        let outcome = handle
            .apply_skill(
                GridPos::new(0, 0),
                SkillPattern::WholeField,
                SkillEffect::Destroy {
                    kinds: vec![target],
                },
            )
            .await
            .unwrap();

        let SkillOutcome::Applied { destroyed, .. } = outcome else {
            panic!("skill rejected on an idle board");
        };
        assert_eq!(destroyed, expected);

        let board = handle.board().await.unwrap();
        assert_eq!(board.chip_count(), 36);
        assert!(!crate::core::matching::has_triple_run(&board));
    }
}
