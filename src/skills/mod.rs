//! Skills module - area targeting patterns and board effects
//!
//! The pattern and effect sets are small and fixed, so both are closed enums
//! dispatched by match rather than trait objects behind a registry. A pattern
//! maps an origin cell to an affected-cell set clipped to board bounds; an
//! effect says what happens to the chips in that set. Application itself
//! lives in the cascade engine, which re-enters its resolving phase after the
//! mutation.

use crate::types::{ChipType, GridPos};

/// Strategy mapping an origin cell + board dimensions to an affected-cell set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillPattern {
    SingleCell,
    Square3x3,
    Cross,
    WholeField,
}

impl SkillPattern {
    /// Affected cells for the given origin, clipped to `[0,width) x [0,height)`
    pub fn affected_cells(&self, origin: GridPos, width: u8, height: u8) -> Vec<GridPos> {
        let in_bounds =
            |p: &GridPos| p.x >= 0 && p.x < width as i8 && p.y >= 0 && p.y < height as i8;
        match self {
            SkillPattern::SingleCell => {
                let mut cells = vec![origin];
                cells.retain(in_bounds);
                cells
            }
            SkillPattern::Cross => {
                let mut cells = vec![
                    origin,
                    origin.offset(-1, 0),
                    origin.offset(1, 0),
                    origin.offset(0, -1),
                    origin.offset(0, 1),
                ];
                cells.retain(in_bounds);
                cells
            }
            SkillPattern::Square3x3 => {
                let mut cells = Vec::with_capacity(9);
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        let cell = origin.offset(dx, dy);
                        if in_bounds(&cell) {
                            cells.push(cell);
                        }
                    }
                }
                cells
            }
            SkillPattern::WholeField => {
                let mut cells = Vec::with_capacity(width as usize * height as usize);
                for x in 0..width as i8 {
                    for y in 0..height as i8 {
                        cells.push(GridPos::new(x, y));
                    }
                }
                cells
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillPattern::SingleCell => "single_cell",
            SkillPattern::Square3x3 => "square_3x3",
            SkillPattern::Cross => "cross",
            SkillPattern::WholeField => "whole_field",
        }
    }
}

/// What a skill does to the chips inside its affected-cell set. Both effects
/// filter by chip type before touching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillEffect {
    /// Destroy every affected chip whose type is listed
    Destroy { kinds: Vec<ChipType> },
    /// Recolor every affected chip whose type is listed
    Transform { kinds: Vec<ChipType>, into: ChipType },
}

impl SkillEffect {
    /// Does the effect touch chips of this type?
    pub fn applies_to(&self, kind: ChipType) -> bool {
        match self {
            SkillEffect::Destroy { kinds } => kinds.contains(&kind),
            // Recoloring a chip to its own type is a no-op
            SkillEffect::Transform { kinds, into } => *into != kind && kinds.contains(&kind),
        }
    }
}
