//! Protocol module - JSON message types for external observers
//!
//! Line-delimited JSON describing board state and engine notifications, for
//! tooling that watches a game from outside the process. Encoding only; the
//! transport (socket, pipe, log file) is up to the embedder.

use serde::{Deserialize, Serialize};

use crate::core::Board;
use crate::engine::Phase;
use crate::types::{BoardEvent, GridPos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

impl Default for ObservationType {
    fn default() -> Self {
        Self::Observation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

impl Default for EventType {
    fn default() -> Self {
        Self::Event
    }
}

/// Full board snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ObservationType,
    pub width: u8,
    pub height: u8,
    /// Rows listed top row first; 0 is empty, 1..=6 are chip type codes
    pub board: Vec<Vec<u8>>,
    pub phase: String,
    pub can_interact: bool,
    pub chip_count: usize,
}

/// One engine notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: EventType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

/// Snapshot the board into an observation message
pub fn build_observation(board: &Board, phase: Phase, can_interact: bool) -> Observation {
    let mut rows = Vec::with_capacity(board.height() as usize);
    for y in (0..board.height() as i8).rev() {
        let mut row = Vec::with_capacity(board.width() as usize);
        for x in 0..board.width() as i8 {
            let code = board
                .kind_at(GridPos::new(x, y))
                .map_or(0, |kind| kind.code());
            row.push(code);
        }
        rows.push(row);
    }
    Observation {
        msg_type: ObservationType::Observation,
        width: board.width(),
        height: board.height(),
        board: rows,
        phase: phase.as_str().to_string(),
        can_interact,
        chip_count: board.chip_count(),
    }
}

pub fn event_record(event: &BoardEvent) -> EventRecord {
    match event {
        BoardEvent::MoveCommitted => EventRecord {
            msg_type: EventType::Event,
            name: "move_committed".to_string(),
            kind: None,
            size: None,
        },
        BoardEvent::MatchResolved { kind, size } => EventRecord {
            msg_type: EventType::Event,
            name: "match_resolved".to_string(),
            kind: Some(kind.as_str().to_string()),
            size: Some(*size),
        },
        BoardEvent::CascadeSettled => EventRecord {
            msg_type: EventType::Event,
            name: "cascade_settled".to_string(),
            kind: None,
            size: None,
        },
    }
}

/// Encode a message as one protocol line (no trailing newline)
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChipType;

    #[test]
    fn observation_lists_rows_top_first() {
        let mut board = Board::new(2, 2);
        board
            .place_new_chip(GridPos::new(0, 0), ChipType::Blue)
            .unwrap();
        board
            .place_new_chip(GridPos::new(1, 1), ChipType::Red)
            .unwrap();

        let obs = build_observation(&board, Phase::Idle, true);
        assert_eq!(obs.board, vec![vec![0, ChipType::Red.code()], vec![ChipType::Blue.code(), 0]]);
        assert_eq!(obs.phase, "idle");
        assert_eq!(obs.chip_count, 2);
    }

    #[test]
    fn event_lines_round_trip() {
        let record = event_record(&BoardEvent::MatchResolved {
            kind: ChipType::Green,
            size: 5,
        });
        let line = encode_line(&record).unwrap();
        let parsed: EventRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.name, "match_resolved");
        assert_eq!(parsed.kind.as_deref(), Some("green"));
        assert_eq!(parsed.size, Some(5));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "event");
    }

    #[test]
    fn plain_events_omit_match_fields() {
        let line = encode_line(&event_record(&BoardEvent::CascadeSettled)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["name"], "cascade_settled");
        assert!(value.get("kind").is_none());
        assert!(value.get("size").is_none());
    }
}
