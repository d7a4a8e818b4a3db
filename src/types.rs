//! Core types shared across the engine
//! This module contains pure data types with no external dependencies

/// Default board dimensions (columns x rows)
pub const DEFAULT_WIDTH: u8 = 8;
pub const DEFAULT_HEIGHT: u8 = 8;

/// Minimum run length that qualifies as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Animation timing constants (in milliseconds)
pub const MOVE_MS_PER_CELL: u64 = 100;
pub const DESTROY_MS: u64 = 300;
pub const CASCADE_PAUSE_MS: u64 = 50;

/// Chip colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipType {
    Blue,
    Red,
    Green,
    Purple,
    Yellow,
    Orange,
}

impl ChipType {
    /// All spawnable chip types, in spawn-candidate order
    pub const ALL: [ChipType; 6] = [
        ChipType::Blue,
        ChipType::Red,
        ChipType::Green,
        ChipType::Purple,
        ChipType::Yellow,
        ChipType::Orange,
    ];

    /// Parse chip type from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" => Some(ChipType::Blue),
            "red" => Some(ChipType::Red),
            "green" => Some(ChipType::Green),
            "purple" => Some(ChipType::Purple),
            "yellow" => Some(ChipType::Yellow),
            "orange" => Some(ChipType::Orange),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            ChipType::Blue => "blue",
            ChipType::Red => "red",
            ChipType::Green => "green",
            ChipType::Purple => "purple",
            ChipType::Yellow => "yellow",
            ChipType::Orange => "orange",
        }
    }

    /// Numeric code for grid snapshots (0 is reserved for empty cells)
    pub fn code(&self) -> u8 {
        match self {
            ChipType::Blue => 1,
            ChipType::Red => 2,
            ChipType::Green => 3,
            ChipType::Purple => 4,
            ChipType::Yellow => 5,
            ChipType::Orange => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ChipType::Blue),
            2 => Some(ChipType::Red),
            3 => Some(ChipType::Green),
            4 => Some(ChipType::Purple),
            5 => Some(ChipType::Yellow),
            6 => Some(ChipType::Orange),
            _ => None,
        }
    }
}

/// Board coordinate. `x` runs left to right, `y` runs bottom to top:
/// `y = 0` is the bottom row, gravity pulls chips toward it and refills
/// enter from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: i8,
    pub y: i8,
}

impl GridPos {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Position shifted by the given deltas (may be out of bounds)
    pub fn offset(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(&self, other: GridPos) -> u8 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Axis-adjacent (no diagonals)
    pub fn is_adjacent_to(&self, other: GridPos) -> bool {
        self.manhattan(other) == 1
    }

    pub fn neighbor(&self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }
}

/// Swipe / neighbor directions on the board axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Parse direction from string (for the demo/protocol layer)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Notification emitted by the cascade engine to registered observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    /// A validated swap was committed to the board
    MoveCommitted,
    /// One match group was resolved (destroyed) this pass
    MatchResolved { kind: ChipType, size: usize },
    /// The cascade reached a stable board and the interaction lock reopened
    CascadeSettled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_type_str_roundtrip() {
        for kind in ChipType::ALL {
            assert_eq!(ChipType::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ChipType::from_str("magenta"), None);
    }

    #[test]
    fn chip_type_codes_are_nonzero_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in ChipType::ALL {
            assert_ne!(kind.code(), 0);
            assert!(seen.insert(kind.code()));
            assert_eq!(ChipType::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn adjacency_is_axis_only() {
        let origin = GridPos::new(3, 3);
        assert!(origin.is_adjacent_to(GridPos::new(4, 3)));
        assert!(origin.is_adjacent_to(GridPos::new(3, 2)));
        assert!(!origin.is_adjacent_to(GridPos::new(4, 4)));
        assert!(!origin.is_adjacent_to(origin));
        assert!(!origin.is_adjacent_to(GridPos::new(5, 3)));
    }

    #[test]
    fn direction_neighbors() {
        let p = GridPos::new(2, 2);
        assert_eq!(p.neighbor(Direction::Up), GridPos::new(2, 3));
        assert_eq!(p.neighbor(Direction::Down), GridPos::new(2, 1));
        assert_eq!(p.neighbor(Direction::Left), GridPos::new(1, 2));
        assert_eq!(p.neighbor(Direction::Right), GridPos::new(3, 2));
    }
}
