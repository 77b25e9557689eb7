//! The SFEN-like canonical position fingerprint used for repetition
//! detection. Two positions are game-equivalent iff their fingerprints
//! match exactly (spec 3, "Position fingerprint").

use crate::{Board, Color, Hands, Kind, Square};
use std::fmt::Write as _;

/// Render the canonical fingerprint string for `(board, side_to_move,
/// hands)`. A function of those three values only — permuting hand
/// insertion order cannot change it, since hands are scanned in the fixed
/// `Kind::HAND_KINDS` order (spec 8, "Fingerprint canonicity").
pub fn fingerprint(board: &Board, side_to_move: Color, hands: &Hands) -> String {
    let mut s = String::with_capacity(96);

    for y in 0..9 {
        let mut empties = 0u8;
        for x in 0..9 {
            match board.at(Square::new(x, y)) {
                None => empties += 1,
                Some(piece) => {
                    if empties > 0 {
                        write!(s, "{empties}").unwrap();
                        empties = 0;
                    }
                    if piece.is_promoted() {
                        s.push('+');
                    }
                    let letter = piece.kind().letter();
                    let letter = if piece.owner() == Color::Sente {
                        letter.to_ascii_uppercase()
                    } else {
                        letter
                    };
                    s.push(letter);
                }
            }
        }
        if empties > 0 {
            write!(s, "{empties}").unwrap();
        }
        if y < 8 {
            s.push('/');
        }
    }

    s.push(' ');
    s.push(match side_to_move {
        Color::Sente => 'b',
        Color::Gote => 'w',
    });
    s.push(' ');

    write_hand(&mut s, hands.of(Color::Sente), true);
    write_hand(&mut s, hands.of(Color::Gote), false);

    s
}

fn write_hand(s: &mut String, hand: &crate::Hand, uppercase: bool) {
    for (kind, count) in hand.iter() {
        let letter = if uppercase {
            kind.letter().to_ascii_uppercase()
        } else {
            kind.letter()
        };
        write!(s, "{letter}:{count}").unwrap();
    }
}
