//! Engine module - asynchronous cascade orchestration
//!
//! Sequences the board through its phases with await-all join points per
//! animation batch, and exposes the channel front door used by UIs and the
//! demo binary.

pub mod animate;
pub mod cascade;
pub mod handle;

pub use animate::{Animator, BatchGate, DelayAnimator, ManualAnimator, NoopAnimator, VisualOp};
pub use cascade::{CascadeEngine, InteractionLock, Phase, RejectReason, SkillOutcome, SwapOutcome};
pub use handle::BoardHandle;
