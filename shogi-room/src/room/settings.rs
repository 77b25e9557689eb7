//! Per-room game settings (spec 3, `Room.settings`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub initial_seconds: u32,
    pub byoyomi_seconds: u32,
    pub random_turn: bool,
    pub fix_turn: bool,
}

impl Settings {
    pub fn new(initial_seconds: u32, byoyomi_seconds: u32) -> Self {
        Settings {
            initial_seconds,
            byoyomi_seconds,
            random_turn: false,
            fix_turn: false,
        }
    }
}
