//! Spawn module - deterministic chip generation
//!
//! Chip types are drawn from a simple LCG so boards are reproducible from a
//! seed. Type selection excludes any type that would complete a 3-run with
//! the two already-populated cells preceding the target in its row or column
//! (checked independently per axis). With six base types at most two types
//! are ever excluded, but if an exclusion list somehow emptied the candidates
//! the spawner falls back to the full list rather than deadlocking.

use crate::core::board::{Board, BoardError, ChipId};
use crate::types::{ChipType, GridPos};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// A chip created during refill, with the drop distance for its arrival
/// animation (from above the top edge down to its cell)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSpawn {
    pub chip: ChipId,
    pub pos: GridPos,
    pub distance: u8,
}

/// Creates chips under the no-immediate-match constraint
#[derive(Debug, Clone)]
pub struct ChipSpawner {
    rng: SimpleRng,
}

impl ChipSpawner {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Current RNG state (for reproducing a board)
    pub fn state(&self) -> u32 {
        self.rng.state()
    }

    /// Pick a type outside the excluded set, falling back to the full
    /// alphabet if the exclusions would leave nothing to pick
    fn choose_kind(&mut self, excluded: &[ChipType]) -> ChipType {
        let candidates: Vec<ChipType> = ChipType::ALL
            .into_iter()
            .filter(|kind| !excluded.contains(kind))
            .collect();
        if candidates.is_empty() {
            let idx = self.rng.next_range(ChipType::ALL.len() as u32) as usize;
            return ChipType::ALL[idx];
        }
        let idx = self.rng.next_range(candidates.len() as u32) as usize;
        candidates[idx]
    }

    /// A type for `pos` that cannot complete a 3-run with the two cells
    /// preceding it in the same row or column
    pub fn valid_kind_for(&mut self, board: &Board, pos: GridPos) -> ChipType {
        let mut excluded = Vec::with_capacity(2);
        let row_pair = (
            board.kind_at(pos.offset(-1, 0)),
            board.kind_at(pos.offset(-2, 0)),
        );
        if let (Some(a), Some(b)) = row_pair {
            if a == b {
                excluded.push(a);
            }
        }
        let col_pair = (
            board.kind_at(pos.offset(0, -1)),
            board.kind_at(pos.offset(0, -2)),
        );
        if let (Some(a), Some(b)) = col_pair {
            if a == b {
                excluded.push(a);
            }
        }
        self.choose_kind(&excluded)
    }

    /// Populate every empty cell, bottom row first, so each placement only
    /// needs to look at already-filled predecessors
    pub fn fill(&mut self, board: &mut Board) -> Result<(), BoardError> {
        for pos in board.positions().collect::<Vec<_>>() {
            if !board.is_empty(pos) {
                continue;
            }
            let kind = self.valid_kind_for(board, pos);
            board.place_new_chip(pos, kind)?;
        }
        Ok(())
    }

    /// Fill the gaps left after settling (necessarily at the top of their
    /// columns) and record each spawn with its drop-in distance
    pub fn refill(&mut self, board: &mut Board) -> Result<Vec<ChipSpawn>, BoardError> {
        let mut spawns = Vec::new();
        for pos in board.empty_positions() {
            let kind = self.valid_kind_for(board, pos);
            let chip = board.place_new_chip(pos, kind)?;
            spawns.push(ChipSpawn {
                chip,
                pos,
                distance: (board.height() as i8 - pos.y) as u8,
            });
        }
        Ok(spawns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matching::has_triple_run;

    #[test]
    fn rng_is_deterministic() {
        let mut a = SimpleRng::new(12345);
        let mut b = SimpleRng::new(12345);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn rng_zero_seed_is_remapped() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn fill_produces_no_immediate_matches() {
        for seed in 1..=20 {
            let mut board = Board::new(8, 8);
            let mut spawner = ChipSpawner::new(seed);
            spawner.fill(&mut board).unwrap();
            assert_eq!(board.chip_count(), 64);
            assert!(board.is_full());
            assert!(!has_triple_run(&board), "seed {seed} produced a match");
            board.validate_ownership().unwrap();
        }
    }

    #[test]
    fn fill_is_reproducible_from_seed() {
        let mut a = Board::new(6, 6);
        let mut b = Board::new(6, 6);
        ChipSpawner::new(7).fill(&mut a).unwrap();
        ChipSpawner::new(7).fill(&mut b).unwrap();
        for pos in a.positions() {
            assert_eq!(a.kind_at(pos), b.kind_at(pos));
        }
    }

    #[test]
    fn refill_targets_only_empty_cells() {
        let mut board = Board::new(4, 4);
        let mut spawner = ChipSpawner::new(3);
        spawner.fill(&mut board).unwrap();

        // Empty out the top row
        for x in 0..4 {
            board.destroy_chip(GridPos::new(x, 3)).unwrap();
        }
        let spawns = spawner.refill(&mut board).unwrap();

        assert_eq!(spawns.len(), 4);
        assert_eq!(board.chip_count(), 16);
        assert!(spawns.iter().all(|s| s.pos.y == 3 && s.distance == 1));
        board.validate_ownership().unwrap();
    }

    #[test]
    fn exhausted_exclusions_fall_back_to_full_alphabet() {
        let mut spawner = ChipSpawner::new(1);
        // Excluding every type must still yield a chip, never a deadlock
        let kind = spawner.choose_kind(&ChipType::ALL);
        assert!(ChipType::ALL.contains(&kind));
    }
}
