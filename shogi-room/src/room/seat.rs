//! Seats and the per-seat storage shape used throughout `Room`.

use serde::{Deserialize, Serialize};
use shogi_types::Color;

/// A seat at the board, or the role assigned to someone who can't take one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAssignment {
    Seat(Color),
    Spectator,
}

/// A value held per seat. `Color::Sente`/`Color::Gote` double as the seat
/// index throughout the room module, since a seat and the side it plays
/// are the same thing once a game is underway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerSeat<T> {
    pub sente: T,
    pub gote: T,
}

impl<T> PerSeat<T> {
    pub fn new(sente: T, gote: T) -> Self {
        PerSeat { sente, gote }
    }

    pub fn get(&self, seat: Color) -> &T {
        match seat {
            Color::Sente => &self.sente,
            Color::Gote => &self.gote,
        }
    }

    pub fn get_mut(&mut self, seat: Color) -> &mut T {
        match seat {
            Color::Sente => &mut self.sente,
            Color::Gote => &mut self.gote,
        }
    }

    pub fn set(&mut self, seat: Color, value: T) {
        *self.get_mut(seat) = value;
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.sente, &mut self.gote);
    }
}

impl<T: Copy> PerSeat<T> {
    pub fn both(value: T) -> Self {
        PerSeat {
            sente: value,
            gote: value,
        }
    }
}
