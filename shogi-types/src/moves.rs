//! Moves, as received from clients and as recorded in history.

use crate::{Kind, Square};

/// A move as sent by a client: either sliding/stepping a piece already on
/// the board, or dropping one from hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Move {
    Board {
        from: Square,
        to: Square,
        promote: bool,
    },
    Drop {
        to: Square,
        piece: Kind,
    },
}

impl Move {
    pub const fn to(self) -> Square {
        match self {
            Move::Board { to, .. } => to,
            Move::Drop { to, .. } => to,
        }
    }
}

/// Time spent on one move and the cumulative total, in whole seconds, as
/// attached to a history entry for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveTime {
    pub now: u64,
    pub total: u64,
}

/// A move plus the annotations the server records alongside it in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct HistoryMove {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub mv: Move,
    pub is_check: bool,
    pub time: MoveTime,
}
