//! Terminal-state detection (spec 4.D): checkmate, then — if the game
//! isn't already over — fourfold repetition, classified as an ordinary
//! draw or an illegal-perpetual-check win.

use crate::room::{FinishReason, Outcome, Room};
use shogi_types::is_checkmate;

/// Run after every move successfully applied by `Room::try_move`. Returns
/// `Some(outcome)` if the game just ended.
pub fn check(room: &mut Room, mover: shogi_types::Color) -> Option<Outcome> {
    let last = room.history.last()?;
    let opponent = mover.opponent();

    if last.is_check && is_checkmate(&room.board, &room.hands, opponent) {
        return Some(Outcome {
            winner: Some(mover),
            reason: FinishReason::Checkmate,
        });
    }

    let count = room.bump_fingerprint_count();
    if count < 4 {
        return None;
    }

    classify_repetition(room)
}

/// Classify a fourfold repetition as sennichite or an illegal perpetual
/// check, per spec 4.D / 9's indexing rules.
fn classify_repetition(room: &Room) -> Option<Outcome> {
    let prev_idx = room.previous_fingerprint_occurrence()?;
    let block = room.repetition_block(prev_idx);

    let mut has_sente_move = false;
    let mut all_sente_checks = true;
    let mut has_gote_move = false;
    let mut all_gote_checks = true;

    for (offset, mv) in block.iter().enumerate() {
        let idx = prev_idx + offset;
        if idx % 2 == 0 {
            has_sente_move = true;
            all_sente_checks &= mv.is_check;
        } else {
            has_gote_move = true;
            all_gote_checks &= mv.is_check;
        }
    }

    if has_sente_move && all_sente_checks {
        Some(Outcome {
            winner: Some(shogi_types::Color::Gote),
            reason: FinishReason::IllegalSennichite,
        })
    } else if has_gote_move && all_gote_checks {
        Some(Outcome {
            winner: Some(shogi_types::Color::Sente),
            reason: FinishReason::IllegalSennichite,
        })
    } else {
        Some(Outcome {
            winner: None,
            reason: FinishReason::Sennichite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Settings;
    use chrono::Utc;
    use shogi_types::{Color, Move, Square};

    #[test]
    fn mutual_shuffling_reaches_sennichite_on_fourth_repeat() {
        let mut room = Room::new("r".into(), Settings::new(600, 30), Utc::now());
        room.status = crate::room::RoomStatus::Playing;

        // Sente and Gote each shuffle a gold back and forth, returning to
        // the initial position every 4 plies, with no checks involved.
        let sente_out = Move::Board {
            from: Square::new(3, 8),
            to: Square::new(3, 7),
            promote: false,
        };
        let sente_back = Move::Board {
            from: Square::new(3, 7),
            to: Square::new(3, 8),
            promote: false,
        };
        let gote_out = Move::Board {
            from: Square::new(3, 0),
            to: Square::new(3, 1),
            promote: false,
        };
        let gote_back = Move::Board {
            from: Square::new(3, 1),
            to: Square::new(3, 0),
            promote: false,
        };

        let mut outcome = None;
        for _ in 0..4 {
            room.try_move(sente_out, Utc::now()).unwrap();
            outcome = check(&mut room, Color::Sente);
            if outcome.is_some() {
                break;
            }
            room.try_move(gote_out, Utc::now()).unwrap();
            outcome = check(&mut room, Color::Gote);
            if outcome.is_some() {
                break;
            }
            room.try_move(sente_back, Utc::now()).unwrap();
            outcome = check(&mut room, Color::Sente);
            if outcome.is_some() {
                break;
            }
            room.try_move(gote_back, Utc::now()).unwrap();
            outcome = check(&mut room, Color::Gote);
            if outcome.is_some() {
                break;
            }
        }

        assert_eq!(
            outcome,
            Some(Outcome {
                winner: None,
                reason: FinishReason::Sennichite,
            })
        );
    }
}
