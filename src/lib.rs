//! Match-3 board engine.
//!
//! A tile-matching board core for a crafting game: swap validation, match
//! detection and merging, chip destruction, gravity-cascade refill under a
//! no-immediate-match constraint, and the async phase machine sequencing it
//! all, plus the gateway for area-effect skills that mutate the board out of
//! band.

pub mod core;
pub mod engine;
pub mod protocol;
pub mod session;
pub mod skills;
pub mod term;
pub mod types;
