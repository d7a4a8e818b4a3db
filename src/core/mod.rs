//! Core module - pure board logic
//!
//! This module contains the grid, chip ownership, match detection, and chip
//! generation rules. Nothing here touches async, rendering, or I/O.

pub mod board;
pub mod matching;
pub mod spawn;

// Re-export commonly used types
pub use board::{Board, BoardError, Chip, ChipFall, ChipId};
pub use matching::{can_swap, scan_board, scan_cell, swap_creates_match, MatchGroup};
pub use spawn::{ChipSpawn, ChipSpawner, SimpleRng};
