//! Cascade module - the board's phase state machine
//!
//! `Idle -> Swapping -> Resolving -> Falling -> Refilling -> (Resolving...)
//! -> Idle`. Board state is mutated at the start of each phase; the phase
//! then awaits its whole animation batch before the next one begins. The
//! interaction lock is closed for the entire span and reopens only once a
//! resolving pass finds no further matches.
//!
//! Skill effects enter the same machine through [`CascadeEngine::apply_skill`],
//! bypassing swap validation but reusing the destroy/fall/refill loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::board::{Board, BoardError};
use crate::core::matching::{scan_board, swap_creates_match};
use crate::core::spawn::ChipSpawner;
use crate::engine::animate::{Animator, VisualOp};
use crate::skills::{SkillEffect, SkillPattern};
use crate::types::{BoardEvent, Direction, GridPos};

/// Cascade engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Swapping,
    Resolving,
    Falling,
    Refilling,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Swapping => "swapping",
            Phase::Resolving => "resolving",
            Phase::Falling => "falling",
            Phase::Refilling => "refilling",
        }
    }
}

/// The per-board interaction gate. Cloned handles share one flag, so a
/// front-end can check interactability without reaching into the engine.
#[derive(Debug, Clone)]
pub struct InteractionLock {
    unlocked: Arc<AtomicBool>,
}

impl InteractionLock {
    fn new() -> Self {
        Self {
            unlocked: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn can_interact(&self) -> bool {
        self.unlocked.load(Ordering::Acquire)
    }

    /// Close the gate if it is open; false when a cascade already holds it
    fn try_acquire(&self) -> bool {
        self.unlocked
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.unlocked.store(true, Ordering::Release);
    }
}

/// Result of a swap or swipe request. Rejections are ordinary values, not
/// errors: the UI simply does not animate anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The swap was committed and the cascade ran to a stable board
    Committed,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A cascade is in flight; requests are dropped, never queued
    Locked,
    NotAdjacent,
    EmptyCell,
    SameType,
    /// The exchange would not create any match
    NoMatch,
    /// Swipe target is off the board
    OffBoard,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Locked => "locked",
            RejectReason::NotAdjacent => "not_adjacent",
            RejectReason::EmptyCell => "empty_cell",
            RejectReason::SameType => "same_type",
            RejectReason::NoMatch => "no_match",
            RejectReason::OffBoard => "off_board",
        }
    }
}

/// Result of a skill application or administrative destroy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillOutcome {
    Applied { destroyed: usize, transformed: usize },
    /// A cascade is in flight
    RejectedBusy,
}

/// The board engine: owns the grid, the spawner, and the animator, and
/// sequences every mutation through the cascade phases.
pub struct CascadeEngine<A: Animator> {
    board: Board,
    spawner: ChipSpawner,
    animator: A,
    lock: InteractionLock,
    phase: Phase,
    targeting: Option<SkillPattern>,
    observers: Vec<mpsc::UnboundedSender<BoardEvent>>,
}

impl<A: Animator> CascadeEngine<A> {
    /// Create an engine over a freshly populated board. The initial fill
    /// satisfies the no-immediate-match constraint.
    pub fn new(width: u8, height: u8, seed: u32, animator: A) -> Result<Self, BoardError> {
        let mut board = Board::new(width, height);
        let mut spawner = ChipSpawner::new(seed);
        spawner.fill(&mut board)?;
        Ok(Self {
            board,
            spawner,
            animator,
            lock: InteractionLock::new(),
            phase: Phase::Idle,
            targeting: None,
            observers: Vec::new(),
        })
    }

    /// Wrap an already-populated board (saved layouts, crafted test grids).
    /// The caller is responsible for the board being stable; a board with
    /// live runs resolves them on the first request.
    pub fn with_board(board: Board, seed: u32, animator: A) -> Self {
        Self {
            board,
            spawner: ChipSpawner::new(seed),
            animator,
            lock: InteractionLock::new(),
            phase: Phase::Idle,
            targeting: None,
            observers: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn can_interact(&self) -> bool {
        self.lock.can_interact()
    }

    /// Shared handle to the interaction gate (for front-ends that must check
    /// interactability without going through the engine)
    pub fn interaction_lock(&self) -> InteractionLock {
        self.lock.clone()
    }

    /// Register an observer for engine notifications. Channels whose
    /// receivers are dropped are pruned on the next emit.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<BoardEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    fn emit(&mut self, event: BoardEvent) {
        self.observers.retain(|tx| tx.send(event).is_ok());
    }

    /// Tear the board down and repopulate it (scene entry / restart).
    /// Keeps dimensions, advances the spawner RNG.
    pub fn reinitialize(&mut self) -> Result<(), BoardError> {
        self.board.clear();
        self.spawner.fill(&mut self.board)?;
        self.phase = Phase::Idle;
        self.lock.release();
        Ok(())
    }

    /// Arm or disarm a skill targeting pattern for hover highlights
    pub fn set_targeting_pattern(&mut self, pattern: Option<SkillPattern>) {
        self.targeting = pattern;
    }

    /// Cells the armed pattern would affect around `hover`. Pure query; an
    /// unarmed engine highlights nothing.
    pub fn targeting_cells(&self, hover: GridPos) -> Vec<GridPos> {
        match self.targeting {
            Some(pattern) => {
                pattern.affected_cells(hover, self.board.width(), self.board.height())
            }
            None => Vec::new(),
        }
    }

    /// Attempt to exchange the chips of two cells. Validation failures are
    /// rejected no-ops; out-of-range coordinates raise. On success the full
    /// cascade runs to a stable board before this resolves.
    pub async fn request_swap(
        &mut self,
        a: GridPos,
        b: GridPos,
    ) -> Result<SwapOutcome, BoardError> {
        // Bounds are checked before the lock: addressing a cell that does
        // not exist is a contract error even while a cascade is in flight.
        let chip_a = self.board.chip_at(a)?;
        let chip_b = self.board.chip_at(b)?;

        if !self.lock.try_acquire() {
            return Ok(SwapOutcome::Rejected(RejectReason::Locked));
        }

        let validated = (|| {
            if !a.is_adjacent_to(b) {
                return Err(RejectReason::NotAdjacent);
            }
            let (Some(ca), Some(cb)) = (chip_a, chip_b) else {
                return Err(RejectReason::EmptyCell);
            };
            let same_type = self.board.chip(ca).map(|c| c.kind())
                == self.board.chip(cb).map(|c| c.kind());
            if same_type {
                return Err(RejectReason::SameType);
            }
            if !swap_creates_match(&mut self.board, a, b) {
                return Err(RejectReason::NoMatch);
            }
            Ok(())
        })();

        let outcome = match validated {
            Err(reason) => Ok(SwapOutcome::Rejected(reason)),
            Ok(()) => self.commit_swap(a, b).await.map(|()| SwapOutcome::Committed),
        };

        self.phase = Phase::Idle;
        self.lock.release();
        outcome
    }

    /// Resolve a swipe to a swap with the neighbor in that direction
    pub async fn request_swipe(
        &mut self,
        origin: GridPos,
        direction: Direction,
    ) -> Result<SwapOutcome, BoardError> {
        self.board.chip_at(origin)?;
        let target = origin.neighbor(direction);
        if !self.board.contains(target) {
            return Ok(SwapOutcome::Rejected(RejectReason::OffBoard));
        }
        self.request_swap(origin, target).await
    }

    /// Permanently exchange the chips, await both move animations (an
    /// explicit join of the pair), then run the cascade loop.
    async fn commit_swap(&mut self, a: GridPos, b: GridPos) -> Result<(), BoardError> {
        self.phase = Phase::Swapping;
        self.board.swap_chips(a, b)?;

        let moved_to_a = self
            .board
            .chip_at(a)?
            .ok_or(BoardError::StructuralViolation("swap left a cell empty"))?;
        let moved_to_b = self
            .board
            .chip_at(b)?
            .ok_or(BoardError::StructuralViolation("swap left a cell empty"))?;
        self.animator
            .play(vec![
                VisualOp::Move {
                    chip: moved_to_a,
                    from: b,
                    to: a,
                    distance: 1,
                },
                VisualOp::Move {
                    chip: moved_to_b,
                    from: a,
                    to: b,
                    distance: 1,
                },
            ])
            .await;

        self.emit(BoardEvent::MoveCommitted);
        self.resolve_cascade().await
    }

    /// The fall -> refill -> re-scan -> destroy loop. Direct destruction
    /// (skills, `destroy_chip_at`) enters with holes already on the board,
    /// so gravity and refill run ahead of every scan; the loop ends when a
    /// scan of the full board finds no matches.
    async fn resolve_cascade(&mut self) -> Result<(), BoardError> {
        loop {
            if !self.board.is_full() {
                self.phase = Phase::Falling;
                let mut move_batch: Vec<VisualOp> = self
                    .board
                    .settle_columns()
                    .into_iter()
                    .map(|fall| VisualOp::Move {
                        chip: fall.chip,
                        from: fall.from,
                        to: fall.to,
                        distance: fall.distance,
                    })
                    .collect();

                self.phase = Phase::Refilling;
                let spawns = self.spawner.refill(&mut self.board)?;
                move_batch.extend(spawns.into_iter().map(|spawn| VisualOp::Spawn {
                    chip: spawn.chip,
                    at: spawn.pos,
                    distance: spawn.distance,
                }));
                // Falls and drop-ins play as one awaited batch
                self.animator.play(move_batch).await;
            }

            self.phase = Phase::Resolving;
            let groups = scan_board(&self.board);
            if groups.is_empty() {
                break;
            }

            let mut destroy_batch = Vec::new();
            for group in &groups {
                for chip in group.chips() {
                    let at = self.board.position_of(chip)?;
                    self.board.take_chip(at)?;
                    self.board.release_chip(chip)?;
                    destroy_batch.push(VisualOp::Destroy { chip, at });
                }
                self.emit(BoardEvent::MatchResolved {
                    kind: group.kind(),
                    size: group.len(),
                });
            }
            self.animator.play(destroy_batch).await;
        }

        self.emit(BoardEvent::CascadeSettled);
        Ok(())
    }

    /// Administrative / skill-driven removal of a single chip, re-entering
    /// the cascade loop. Out-of-range coordinates raise; destroying an empty
    /// cell is a contract violation.
    pub async fn destroy_chip_at(&mut self, pos: GridPos) -> Result<SkillOutcome, BoardError> {
        let occupant = self.board.chip_at(pos)?;
        if !self.lock.try_acquire() {
            return Ok(SkillOutcome::RejectedBusy);
        }
        let result = async {
            let chip = occupant.ok_or(BoardError::StructuralViolation(
                "destroying an empty cell",
            ))?;
            self.board.take_chip(pos)?;
            self.board.release_chip(chip)?;
            self.animator
                .play(vec![VisualOp::Destroy { chip, at: pos }])
                .await;
            self.resolve_cascade().await?;
            Ok(SkillOutcome::Applied {
                destroyed: 1,
                transformed: 0,
            })
        }
        .await;

        self.phase = Phase::Idle;
        self.lock.release();
        result
    }

    /// Apply a skill: clip the pattern around the origin, filter affected
    /// cells by the effect's type predicate, mutate, then hand control to the
    /// resolving phase exactly as if the cells had emptied from a match.
    pub async fn apply_skill(
        &mut self,
        origin: GridPos,
        pattern: SkillPattern,
        effect: &SkillEffect,
    ) -> Result<SkillOutcome, BoardError> {
        self.board.chip_at(origin)?;
        if !self.lock.try_acquire() {
            return Ok(SkillOutcome::RejectedBusy);
        }
        let result = self.apply_skill_inner(origin, pattern, effect).await;
        self.phase = Phase::Idle;
        self.lock.release();
        result
    }

    async fn apply_skill_inner(
        &mut self,
        origin: GridPos,
        pattern: SkillPattern,
        effect: &SkillEffect,
    ) -> Result<SkillOutcome, BoardError> {
        let cells =
            pattern.affected_cells(origin, self.board.width(), self.board.height());

        let mut batch = Vec::new();
        let mut destroyed = 0;
        let mut transformed = 0;
        for pos in cells {
            let Some(kind) = self.board.kind_at(pos) else {
                continue;
            };
            if !effect.applies_to(kind) {
                continue;
            }
            match effect {
                SkillEffect::Destroy { .. } => {
                    let chip = self.board.take_chip(pos)?;
                    self.board.release_chip(chip)?;
                    batch.push(VisualOp::Destroy { chip, at: pos });
                    destroyed += 1;
                }
                SkillEffect::Transform { into, .. } => {
                    let old = self.board.take_chip(pos)?;
                    self.board.release_chip(old)?;
                    let chip = self.board.place_new_chip(pos, *into)?;
                    batch.push(VisualOp::Transform {
                        chip,
                        at: pos,
                        kind: *into,
                    });
                    transformed += 1;
                }
            }
        }

        if !batch.is_empty() {
            self.animator.play(batch).await;
            // Transforms can complete runs just like emptied cells
            self.resolve_cascade().await?;
        }

        Ok(SkillOutcome::Applied {
            destroyed,
            transformed,
        })
    }
}
