//! Session module - turn and score bookkeeping for one crafting round
//!
//! The engine only reports match outcomes; what they are worth belongs here.
//! A session consumes [`BoardEvent`]s: committed moves spend turns, resolved
//! groups accrue score per chip, and the round finishes once the last turn's
//! cascade settles. Configuration is an injected value, not ambient state.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::types::{BoardEvent, ChipType};

/// Round parameters handed in by the surrounding game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftConfig {
    pub turns_per_craft: u32,
    pub scores_per_match: u32,
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self {
            turns_per_craft: 10,
            scores_per_match: 10,
        }
    }
}

/// Scoring state for one crafting round
#[derive(Debug, Clone)]
pub struct CraftSession {
    config: CraftConfig,
    turns_made: u32,
    turns_left: u32,
    total_score: u32,
    /// Accrued score per chip type, indexed by `ChipType::code() - 1`
    type_scores: [u32; ChipType::ALL.len()],
    finished: bool,
}

impl CraftSession {
    pub fn new(config: CraftConfig) -> Self {
        Self {
            config,
            turns_made: 0,
            turns_left: config.turns_per_craft,
            total_score: 0,
            type_scores: [0; ChipType::ALL.len()],
            finished: false,
        }
    }

    pub fn turns_made(&self) -> u32 {
        self.turns_made
    }

    pub fn turns_left(&self) -> u32 {
        self.turns_left
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn score_for(&self, kind: ChipType) -> u32 {
        self.type_scores[kind.code() as usize - 1]
    }

    /// True once the final turn's cascade has settled
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Fold one engine notification into the round state
    pub fn on_event(&mut self, event: &BoardEvent) {
        match event {
            BoardEvent::MoveCommitted => {
                self.turns_made += 1;
                self.turns_left = self.turns_left.saturating_sub(1);
            }
            BoardEvent::MatchResolved { kind, size } => {
                let scores = self.config.scores_per_match * *size as u32;
                self.total_score += scores;
                self.type_scores[kind.code() as usize - 1] += scores;
            }
            BoardEvent::CascadeSettled => {
                if self.turns_left == 0 {
                    self.finished = true;
                }
            }
        }
    }

    /// Consume every event currently buffered on the receiver
    pub fn drain(&mut self, events: &mut UnboundedReceiver<BoardEvent>) {
        while let Ok(event) = events.try_recv() {
            self.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(turns: u32) -> CraftSession {
        CraftSession::new(CraftConfig {
            turns_per_craft: turns,
            scores_per_match: 10,
        })
    }

    #[test]
    fn moves_spend_turns() {
        let mut s = session(2);
        s.on_event(&BoardEvent::MoveCommitted);
        assert_eq!(s.turns_made(), 1);
        assert_eq!(s.turns_left(), 1);
        assert!(!s.finished());
    }

    #[test]
    fn matches_accrue_score_per_chip() {
        let mut s = session(5);
        s.on_event(&BoardEvent::MatchResolved {
            kind: ChipType::Red,
            size: 4,
        });
        s.on_event(&BoardEvent::MatchResolved {
            kind: ChipType::Blue,
            size: 3,
        });
        assert_eq!(s.total_score(), 70);
        assert_eq!(s.score_for(ChipType::Red), 40);
        assert_eq!(s.score_for(ChipType::Blue), 30);
        assert_eq!(s.score_for(ChipType::Green), 0);
    }

    #[test]
    fn round_finishes_when_last_cascade_settles() {
        let mut s = session(1);
        // Settling mid-round does not finish anything
        s.on_event(&BoardEvent::CascadeSettled);
        assert!(!s.finished());

        s.on_event(&BoardEvent::MoveCommitted);
        assert!(!s.finished());
        s.on_event(&BoardEvent::CascadeSettled);
        assert!(s.finished());
    }
}
