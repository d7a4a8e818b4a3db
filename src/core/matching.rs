//! Matching module - run detection and match-group aggregation
//!
//! A match is a horizontal or vertical run of 3+ same-type chips. Detection
//! is seeded per cell: walk both axis directions accumulating the horizontal
//! and vertical runs through the seed. When both runs qualify (an L/T/plus
//! intersection) the scan returns both groups; the board-wide aggregation
//! then merges groups that share chips into a minimal disjoint set.

use std::collections::HashSet;

use arrayvec::ArrayVec;

use crate::core::board::{Board, ChipId};
use crate::types::{ChipType, GridPos, MIN_MATCH_LEN};

/// A merged set of same-type chips forming one logical match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    kind: ChipType,
    chips: HashSet<ChipId>,
}

impl MatchGroup {
    fn new(kind: ChipType) -> Self {
        Self {
            kind,
            chips: HashSet::new(),
        }
    }

    pub fn kind(&self) -> ChipType {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    pub fn contains(&self, id: ChipId) -> bool {
        self.chips.contains(&id)
    }

    pub fn chips(&self) -> impl Iterator<Item = ChipId> + '_ {
        self.chips.iter().copied()
    }

    fn insert(&mut self, id: ChipId) {
        self.chips.insert(id);
    }

    /// True when the two groups share at least one chip
    pub fn intersects(&self, other: &MatchGroup) -> bool {
        let (small, large) = if self.chips.len() <= other.chips.len() {
            (&self.chips, &other.chips)
        } else {
            (&other.chips, &self.chips)
        };
        small.iter().any(|id| large.contains(id))
    }

    /// Union the other group's chips into this one. Chips are single-typed,
    /// so intersecting groups always share a type.
    fn merge(&mut self, other: MatchGroup) {
        debug_assert_eq!(self.kind, other.kind, "merging groups of different types");
        self.chips.extend(other.chips);
    }
}

/// Scan the runs through one cell. Returns zero, one, or two qualifying
/// groups: the horizontal and vertical runs are accumulated independently
/// (each including the seed chip) and reported whenever their length reaches
/// [`MIN_MATCH_LEN`]. An empty cell yields no groups.
pub fn scan_cell(board: &Board, pos: GridPos) -> ArrayVec<MatchGroup, 2> {
    let mut found = ArrayVec::new();
    let Ok(Some(seed)) = board.chip_at(pos) else {
        return found;
    };
    let kind = board
        .chip(seed)
        .map(|chip| chip.kind())
        .expect("cell references a registered chip");

    let mut horizontal = MatchGroup::new(kind);
    let mut vertical = MatchGroup::new(kind);
    horizontal.insert(seed);
    vertical.insert(seed);

    let walk = |group: &mut MatchGroup, dx: i8, dy: i8| {
        let mut cursor = pos.offset(dx, dy);
        while board.kind_at(cursor) == Some(kind) {
            if let Ok(Some(id)) = board.chip_at(cursor) {
                group.insert(id);
            }
            cursor = cursor.offset(dx, dy);
        }
    };
    walk(&mut horizontal, 1, 0);
    walk(&mut horizontal, -1, 0);
    walk(&mut vertical, 0, 1);
    walk(&mut vertical, 0, -1);

    if horizontal.len() >= MIN_MATCH_LEN {
        found.push(horizontal);
    }
    if vertical.len() >= MIN_MATCH_LEN {
        found.push(vertical);
    }
    found
}

/// Merge a new group into the running collection: every existing group of the
/// same type sharing at least one chip is unioned into it, then the combined
/// group replaces them. Groups of different types never merge.
pub fn add_match(groups: &mut Vec<MatchGroup>, mut new_group: MatchGroup) {
    let mut i = 0;
    while i < groups.len() {
        if groups[i].kind() == new_group.kind() && groups[i].intersects(&new_group) {
            let existing = groups.swap_remove(i);
            new_group.merge(existing);
        } else {
            i += 1;
        }
    }
    groups.push(new_group);
}

/// Scan the whole board and return the minimal set of disjoint match groups
pub fn scan_board(board: &Board) -> Vec<MatchGroup> {
    let mut groups = Vec::new();
    for pos in board.positions() {
        for group in scan_cell(board, pos) {
            add_match(&mut groups, group);
        }
    }
    groups
}

/// Hypothetical check: would exchanging the chips of `a` and `b` create at
/// least one match? Provisionally swaps, scans both resulting cells, and
/// unconditionally swaps back; the board is never left mutated.
pub fn swap_creates_match(board: &mut Board, a: GridPos, b: GridPos) -> bool {
    if board.swap_chips(a, b).is_err() {
        return false;
    }
    let has_match = !scan_cell(board, a).is_empty() || !scan_cell(board, b).is_empty();
    board
        .swap_chips(a, b)
        .expect("rollback of a provisional swap");
    has_match
}

/// Full swap validation: axis adjacency, both cells occupied by chips of
/// differing types, and the exchange produces a match
pub fn can_swap(board: &mut Board, a: GridPos, b: GridPos) -> bool {
    if !a.is_adjacent_to(b) {
        return false;
    }
    let (Ok(Some(ca)), Ok(Some(cb))) = (board.chip_at(a), board.chip_at(b)) else {
        return false;
    };
    let (Some(chip_a), Some(chip_b)) = (board.chip(ca), board.chip(cb)) else {
        return false;
    };
    if !chip_a.can_swap_with(chip_b) {
        return false;
    }
    swap_creates_match(board, a, b)
}

/// True when any 3+ run exists anywhere on the board. A settled cascade must
/// leave this false.
pub fn has_triple_run(board: &Board) -> bool {
    board.positions().any(|pos| !scan_cell(board, pos).is_empty())
}
