//! The two sides of a Shogi game.

use core::fmt;

/// Sente (black, moves first) or Gote (white, moves second).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Color {
    Sente,
    Gote,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Sente, Color::Gote];

    /// The opposing side.
    #[inline(always)]
    pub const fn opponent(self) -> Color {
        match self {
            Color::Sente => Color::Gote,
            Color::Gote => Color::Sente,
        }
    }

    /// The row delta a pawn of this color moves in: -1 for Sente (toward y=0),
    /// +1 for Gote (toward y=8).
    #[inline(always)]
    pub const fn forward(self) -> i8 {
        match self {
            Color::Sente => -1,
            Color::Gote => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::Sente => "sente",
            Color::Gote => "gote",
        })
    }
}
