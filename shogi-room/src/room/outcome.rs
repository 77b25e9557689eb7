//! Terminal outcomes (spec 4.D, spec 6 `game_finished`).

use serde::{Deserialize, Serialize};
use shogi_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Resign,
    Timeout,
    Sennichite,
    IllegalSennichite,
    Checkmate,
}

/// `winner = None` represents spec's `winner = none` (a draw, reachable
/// only via `Sennichite`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Option<Color>,
    pub reason: FinishReason,
}
