//! BoardView: maps a `core::Board` into styled terminal lines.
//!
//! This module is pure (no I/O). It can be unit-tested on the plain glyph
//! grid; color is applied at the edge via crossterm styling.

use crossterm::style::{Color, Stylize};

use crate::core::Board;
use crate::types::{ChipType, GridPos};

const EMPTY_GLYPH: char = '·';

fn glyph(kind: ChipType) -> char {
    // First letter of the color name
    kind.as_str()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?')
}

fn color(kind: ChipType) -> Color {
    match kind {
        ChipType::Blue => Color::Blue,
        ChipType::Red => Color::Red,
        ChipType::Green => Color::Green,
        ChipType::Purple => Color::Magenta,
        ChipType::Yellow => Color::Yellow,
        ChipType::Orange => Color::DarkYellow,
    }
}

/// Renders a board as one text row per grid row, top row first
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardView;

impl BoardView {
    /// Plain glyph grid without styling (testable, also used for logs)
    pub fn render_plain(&self, board: &Board) -> Vec<String> {
        let mut lines = Vec::with_capacity(board.height() as usize);
        for y in (0..board.height() as i8).rev() {
            let mut line = String::with_capacity(board.width() as usize * 2);
            for x in 0..board.width() as i8 {
                let ch = board
                    .kind_at(GridPos::new(x, y))
                    .map_or(EMPTY_GLYPH, glyph);
                line.push(ch);
                line.push(' ');
            }
            lines.push(line.trim_end().to_string());
        }
        lines
    }

    /// ANSI-styled grid for interactive terminals
    pub fn render_styled(&self, board: &Board) -> Vec<String> {
        let mut lines = Vec::with_capacity(board.height() as usize);
        for y in (0..board.height() as i8).rev() {
            let mut line = String::new();
            for x in 0..board.width() as i8 {
                match board.kind_at(GridPos::new(x, y)) {
                    Some(kind) => {
                        line.push_str(&format!("{} ", glyph(kind).with(color(kind)).bold()));
                    }
                    None => {
                        line.push_str(&format!("{EMPTY_GLYPH} "));
                    }
                }
            }
            lines.push(line.trim_end().to_string());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_render_lists_top_row_first() {
        let mut board = Board::new(3, 2);
        board
            .place_new_chip(GridPos::new(0, 0), ChipType::Blue)
            .unwrap();
        board
            .place_new_chip(GridPos::new(2, 1), ChipType::Red)
            .unwrap();

        let lines = BoardView.render_plain(&board);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "· · R");
        assert_eq!(lines[1], "B · ·");
    }

    #[test]
    fn every_chip_type_has_a_distinct_glyph() {
        let mut seen = std::collections::HashSet::new();
        for kind in ChipType::ALL {
            assert!(seen.insert(glyph(kind)), "duplicate glyph for {kind:?}");
        }
    }
}
