//! Wire event payloads (spec 6). The transport itself — the bidirectional
//! socket-style channel that actually carries these — is an external
//! collaborator; this module only fixes the shape of what crosses it.

use crate::ids::UserId;
use crate::room::{FinishReason, Outcome, Room, RoomStatus, Settings};
use serde::{Deserialize, Serialize};
use shogi_types::{Color, HistoryMove, Move};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum Inbound {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        mode: Option<String>,
        user_id: UserId,
        user_name: String,
    },
    #[serde(rename_all = "camelCase")]
    SendMessage {
        room_id: String,
        text: String,
        role: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateSettings {
        room_id: String,
        settings: Settings,
    },
    #[serde(rename_all = "camelCase")]
    ToggleReady {
        room_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Move {
        room_id: String,
        #[serde(flatten)]
        mv: Move,
        branch_index: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    GameResign {
        room_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Undo {
        room_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Reset {
        room_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Rematch {
        room_id: String,
    },
    /// A client-side latency probe. Accepted and routed, never mutates
    /// state or broadcasts anything (spec 9's Open Question, resolved).
    PingLatency,
    Disconnect,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum Outbound {
    #[serde(rename_all = "camelCase")]
    Sync {
        history: Vec<HistoryMove>,
        status: RoomStatus,
        winner: Option<Color>,
        your_role: YourRole,
        ready: crate::room::PerSeat<bool>,
        settings: Settings,
        times: crate::room::PerSeat<u32>,
        rematch_requests: crate::room::PerSeat<bool>,
        player_names: crate::room::PerSeat<Option<String>>,
    },
    #[serde(rename_all = "camelCase")]
    Move {
        #[serde(flatten)]
        mv: HistoryMove,
    },
    #[serde(rename_all = "camelCase")]
    TimeUpdate {
        times: crate::room::PerSeat<u32>,
        current_byoyomi: crate::room::PerSeat<i32>,
    },
    GameStarted,
    #[serde(rename_all = "camelCase")]
    GameFinished {
        winner: Option<Color>,
        reason: FinishReason,
    },
    #[serde(rename_all = "camelCase")]
    SettingsUpdated {
        settings: Settings,
    },
    #[serde(rename_all = "camelCase")]
    ReadyStatus {
        ready: crate::room::PerSeat<bool>,
    },
    #[serde(rename_all = "camelCase")]
    RematchStatus {
        rematch_requests: crate::room::PerSeat<bool>,
    },
    #[serde(rename_all = "camelCase")]
    PlayerNamesUpdated {
        player_names: crate::room::PerSeat<Option<String>>,
    },
    #[serde(rename_all = "camelCase")]
    ConnectionStatusUpdate {
        sente: bool,
        gote: bool,
    },
    UpdateGlobalCount(usize),
    UpdateRoomCount(usize),
    #[serde(rename_all = "camelCase")]
    ReceiveMessage {
        id: String,
        text: String,
        role: String,
        user_name: String,
        user_id: UserId,
        timestamp: i64,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YourRole {
    Sente,
    Gote,
    Spectator,
}

impl Outbound {
    pub fn finished(outcome: Outcome) -> Self {
        Outbound::GameFinished {
            winner: outcome.winner,
            reason: outcome.reason,
        }
    }

    pub fn sync(room: &Room, your_role: YourRole) -> Self {
        Outbound::Sync {
            history: room.history.clone(),
            status: room.status,
            winner: room.outcome.and_then(|o| o.winner),
            your_role,
            ready: room.ready,
            settings: room.settings,
            times: room.times,
            rematch_requests: room.rematch_requests,
            player_names: room.player_names.clone(),
        }
    }

    pub fn time_update(room: &Room) -> Self {
        Outbound::TimeUpdate {
            times: room.times,
            current_byoyomi: room.current_byoyomi,
        }
    }
}
