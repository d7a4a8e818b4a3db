//! Board module - manages the game grid and chip ownership
//!
//! The board is a `width x height` grid where each cell holds at most one chip.
//! Cells are stored as a flat array of chip ids (row-major, `y * width + x`)
//! with a side registry mapping ids to chip data. Coordinates: (x, y) where
//! x ranges left to right and y ranges bottom to top; gravity pulls chips
//! toward y = 0 and refills enter from the top edge.
//!
//! Ownership invariant: a chip is referenced by at most one cell, and its
//! back-reference always agrees with that cell. Every transfer goes through
//! [`Board::set_chip`], which detaches from the old cell, attaches to the new
//! one, and clears the old slot in a single call.

use std::collections::HashMap;
use std::fmt;

use crate::types::{ChipType, GridPos};

/// Contract errors for directly addressed board operations.
///
/// Rejected swaps are not errors (see `SwapOutcome`); these cover coordinates
/// outside the grid and ownership-contract violations such as double-destroy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    OutOfRange { x: i8, y: i8 },
    StructuralViolation(&'static str),
}

impl BoardError {
    pub fn code(self) -> &'static str {
        match self {
            BoardError::OutOfRange { .. } => "out_of_range",
            BoardError::StructuralViolation(_) => "structural_violation",
        }
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::OutOfRange { x, y } => {
                write!(f, "position ({x}, {y}) is out of grid bounds")
            }
            BoardError::StructuralViolation(context) => {
                write!(f, "board ownership contract violated: {context}")
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// Opaque chip identity. Identity (not type) is what match groups collect,
/// so two adjacent chips of the same color are still distinct members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChipId(u32);

/// A typed game piece occupying at most one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chip {
    kind: ChipType,
    cell: Option<GridPos>,
}

impl Chip {
    pub fn kind(&self) -> ChipType {
        self.kind
    }

    /// The owning cell, or None while detached (mid-destruction)
    pub fn cell(&self) -> Option<GridPos> {
        self.cell
    }

    /// Chips of identical type cannot swap meaningfully
    pub fn can_swap_with(&self, other: &Chip) -> bool {
        self.kind != other.kind
    }
}

/// One unit gravity move recorded during column settling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipFall {
    pub chip: ChipId,
    pub from: GridPos,
    pub to: GridPos,
    /// Vertical cells traveled (animation duration scales with this)
    pub distance: u8,
}

/// The game board: fixed-size grid plus chip registry
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: u8,
    height: u8,
    cells: Vec<Option<ChipId>>,
    chips: HashMap<ChipId, Chip>,
    next_id: u32,
}

impl Board {
    /// Create an empty board. Dimensions are immutable after construction.
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            chips: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Calculate flat index, failing with OutOfRange instead of clamping
    fn index(&self, pos: GridPos) -> Result<usize, BoardError> {
        if pos.x < 0 || pos.x >= self.width as i8 || pos.y < 0 || pos.y >= self.height as i8 {
            return Err(BoardError::OutOfRange { x: pos.x, y: pos.y });
        }
        Ok(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.index(pos).is_ok()
    }

    /// Iterate every in-bounds position, bottom row first
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let (w, h) = (self.width as i8, self.height as i8);
        (0..h).flat_map(move |y| (0..w).map(move |x| GridPos::new(x, y)))
    }

    /// Chip occupying the cell, if any
    pub fn chip_at(&self, pos: GridPos) -> Result<Option<ChipId>, BoardError> {
        let idx = self.index(pos)?;
        Ok(self.cells[idx])
    }

    /// Chip type at the cell; None when empty or out of bounds.
    /// Run scanning walks off the grid edge, so this one does not raise.
    pub fn kind_at(&self, pos: GridPos) -> Option<ChipType> {
        let idx = self.index(pos).ok()?;
        let id = self.cells[idx]?;
        self.chips.get(&id).map(|chip| chip.kind)
    }

    pub fn chip(&self, id: ChipId) -> Option<&Chip> {
        self.chips.get(&id)
    }

    /// Owning cell of a live chip
    pub fn position_of(&self, id: ChipId) -> Result<GridPos, BoardError> {
        self.chips
            .get(&id)
            .ok_or(BoardError::StructuralViolation("unknown chip id"))?
            .cell
            .ok_or(BoardError::StructuralViolation("chip is detached"))
    }

    pub fn is_empty(&self, pos: GridPos) -> bool {
        matches!(self.chip_at(pos), Ok(None))
    }

    /// Number of live chips on the board
    pub fn chip_count(&self) -> usize {
        self.chips.len()
    }

    /// True when every cell holds a chip
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// Assign a chip (or nothing) to a cell in one logical step: the chip is
    /// detached from its previous cell, attached to the target, and the
    /// previous slot is cleared. The target must be empty when assigning a
    /// chip; overwriting a live chip would leave it ambiguously owned.
    pub fn set_chip(&mut self, pos: GridPos, chip: Option<ChipId>) -> Result<(), BoardError> {
        let idx = self.index(pos)?;
        match chip {
            Some(id) => {
                if !self.chips.contains_key(&id) {
                    return Err(BoardError::StructuralViolation("unknown chip id"));
                }
                if self.cells[idx].is_some_and(|occupant| occupant != id) {
                    return Err(BoardError::StructuralViolation(
                        "assigning a chip over an occupied cell",
                    ));
                }
                if let Some(old) = self.chips.get(&id).and_then(|c| c.cell) {
                    let old_idx = self.index(old)?;
                    self.cells[old_idx] = None;
                }
                self.cells[idx] = Some(id);
                if let Some(c) = self.chips.get_mut(&id) {
                    c.cell = Some(pos);
                }
            }
            None => {
                if let Some(id) = self.cells[idx].take() {
                    if let Some(c) = self.chips.get_mut(&id) {
                        c.cell = None;
                    }
                }
            }
        }
        Ok(())
    }

    /// Create a new chip of the given type on an empty cell
    pub fn place_new_chip(&mut self, pos: GridPos, kind: ChipType) -> Result<ChipId, BoardError> {
        let idx = self.index(pos)?;
        if self.cells[idx].is_some() {
            return Err(BoardError::StructuralViolation(
                "spawning a chip on an occupied cell",
            ));
        }
        let id = ChipId(self.next_id);
        self.next_id += 1;
        self.chips.insert(
            id,
            Chip {
                kind,
                cell: Some(pos),
            },
        );
        self.cells[idx] = Some(id);
        Ok(id)
    }

    /// Detach the chip from the cell without destroying it.
    /// The cell becomes empty; the chip stays in the registry until released.
    pub fn take_chip(&mut self, pos: GridPos) -> Result<ChipId, BoardError> {
        let idx = self.index(pos)?;
        let id = self.cells[idx]
            .take()
            .ok_or(BoardError::StructuralViolation("taking from an empty cell"))?;
        if let Some(chip) = self.chips.get_mut(&id) {
            chip.cell = None;
        }
        Ok(id)
    }

    /// Destroy a detached chip. Releasing an unknown id (double-destroy) or a
    /// chip still attached to a cell is a contract violation.
    pub fn release_chip(&mut self, id: ChipId) -> Result<Chip, BoardError> {
        let Some(chip) = self.chips.get(&id).copied() else {
            debug_assert!(false, "double destroy of chip {id:?}");
            return Err(BoardError::StructuralViolation("double destroy"));
        };
        if chip.cell.is_some() {
            debug_assert!(false, "releasing chip {id:?} while attached");
            return Err(BoardError::StructuralViolation(
                "releasing a chip still attached to a cell",
            ));
        }
        self.chips.remove(&id);
        Ok(chip)
    }

    /// Detach and destroy the chip at the cell in one step
    pub fn destroy_chip(&mut self, pos: GridPos) -> Result<Chip, BoardError> {
        let id = self.take_chip(pos)?;
        self.release_chip(id)
    }

    /// Exchange the chips of two occupied cells, keeping back-references
    /// consistent. Both cells must hold chips.
    pub fn swap_chips(&mut self, a: GridPos, b: GridPos) -> Result<(), BoardError> {
        let ia = self.index(a)?;
        let ib = self.index(b)?;
        let (Some(ca), Some(cb)) = (self.cells[ia], self.cells[ib]) else {
            return Err(BoardError::StructuralViolation("swapping with an empty cell"));
        };
        self.cells[ia] = Some(cb);
        self.cells[ib] = Some(ca);
        if let Some(chip) = self.chips.get_mut(&ca) {
            chip.cell = Some(b);
        }
        if let Some(chip) = self.chips.get_mut(&cb) {
            chip.cell = Some(a);
        }
        Ok(())
    }

    /// Compact every column: each empty cell pulls down the nearest occupied
    /// cell above it, scanning bottom to top, until no chip sits above a gap.
    /// Returns the moves performed for animation (distance in cells).
    pub fn settle_columns(&mut self) -> Vec<ChipFall> {
        let mut falls = Vec::new();
        for x in 0..self.width as i8 {
            for y in 0..self.height as i8 {
                let dst = GridPos::new(x, y);
                if !self.is_empty(dst) {
                    continue;
                }
                for above in (y + 1)..self.height as i8 {
                    let src = GridPos::new(x, above);
                    let Ok(Some(id)) = self.chip_at(src) else {
                        continue;
                    };
                    // set_chip detaches from src and clears that slot
                    self.set_chip(dst, Some(id))
                        .expect("settle move within bounds onto an empty cell");
                    falls.push(ChipFall {
                        chip: id,
                        from: src,
                        to: dst,
                        distance: (above - y) as u8,
                    });
                    break;
                }
            }
        }
        falls
    }

    /// Every empty position, bottom row first (after settling these are all
    /// at the top of their columns)
    pub fn empty_positions(&self) -> Vec<GridPos> {
        self.positions().filter(|&p| self.is_empty(p)).collect()
    }

    /// Remove every chip and clear all cells (board teardown before a
    /// reinitialize; dimensions are kept)
    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.chips.clear();
    }

    /// Verify the ownership invariant: every occupied cell's chip
    /// back-references that cell, and no chip is referenced twice.
    /// Cheap enough to run after every public operation in tests.
    pub fn validate_ownership(&self) -> Result<(), BoardError> {
        let mut seen = HashMap::new();
        for pos in self.positions() {
            let Ok(Some(id)) = self.chip_at(pos) else {
                continue;
            };
            if seen.insert(id, pos).is_some() {
                return Err(BoardError::StructuralViolation(
                    "chip referenced by two cells",
                ));
            }
            match self.chips.get(&id) {
                Some(chip) if chip.cell == Some(pos) => {}
                Some(_) => {
                    return Err(BoardError::StructuralViolation(
                        "chip back-reference disagrees with cell",
                    ))
                }
                None => {
                    return Err(BoardError::StructuralViolation(
                        "cell references an unregistered chip",
                    ))
                }
            }
        }
        for (id, chip) in &self.chips {
            if let Some(pos) = chip.cell {
                if self.chip_at(pos)? != Some(*id) {
                    return Err(BoardError::StructuralViolation(
                        "attached chip not present in its cell",
                    ));
                }
            }
        }
        Ok(())
    }
}
