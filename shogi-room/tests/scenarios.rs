//! End-to-end scenarios spanning the room state machine, the rule
//! validator, the clock, and the terminal detector together, as opposed to
//! the narrower unit tests living alongside each module.

use chrono::{Duration, Utc};
use shogi_room::clock;
use shogi_room::room::{FinishReason, Room, RoomStatus, Settings};
use shogi_room::terminal;
use shogi_types::{Board, Color, Hands, Kind, Move, Piece, Square};

/// A corner-mate position: Gote's king at (4,0) is boxed in by its own
/// knights and silvers, with only (4,1) free — and that square is covered
/// by a defended Sente piece, so capturing into it stays in check. Sente
/// has a Lance in hand to drop straight into the box.
fn boxed_in_king_position() -> (Board, Hands) {
    let mut board = Board::empty();
    board.set(Square::new(4, 0), Some(Piece::new(Kind::King, Color::Gote)));
    board.set(Square::new(3, 0), Some(Piece::new(Kind::Knight, Color::Gote)));
    board.set(Square::new(5, 0), Some(Piece::new(Kind::Knight, Color::Gote)));
    board.set(Square::new(3, 1), Some(Piece::new(Kind::Silver, Color::Gote)));
    board.set(Square::new(5, 1), Some(Piece::new(Kind::Silver, Color::Gote)));
    board.set(Square::new(4, 2), Some(Piece::new(Kind::Gold, Color::Sente)));
    board.set(Square::new(4, 8), Some(Piece::new(Kind::King, Color::Sente)));
    (board, Hands::empty())
}

fn playing_room(board: Board, hands: Hands) -> Room {
    let mut room = Room::new("r1".into(), Settings::new(600, 30), Utc::now());
    room.board = board;
    room.hands = hands;
    room.status = RoomStatus::Playing;
    room
}

#[test]
fn mate_in_one_via_lance_drop() {
    let (board, mut hands) = boxed_in_king_position();
    hands.sente.add(Kind::Lance);
    let mut room = playing_room(board, hands);

    let drop = Move::Drop {
        to: Square::new(4, 1),
        piece: Kind::Lance,
    };
    let applied = room.try_move(drop, Utc::now()).expect("lance drop should be legal");
    assert!(applied.is_check);

    let outcome = terminal::check(&mut room, Color::Sente).expect("this should be checkmate");
    assert_eq!(outcome.winner, Some(Color::Sente));
    assert_eq!(outcome.reason, FinishReason::Checkmate);
}

#[test]
fn drop_pawn_mate_is_rejected() {
    let (board, mut hands) = boxed_in_king_position();
    hands.sente.add(Kind::Pawn);
    let mut room = playing_room(board, hands);

    // The same mating net, but by pawn drop — uchi-fu-zume forbids it
    // outright, so `try_move` must refuse and leave the room untouched.
    let drop = Move::Drop {
        to: Square::new(4, 1),
        piece: Kind::Pawn,
    };
    assert!(room.try_move(drop, Utc::now()).is_none());
    assert_eq!(room.status, RoomStatus::Playing);
    assert_eq!(room.hands.sente.count(Kind::Pawn), 1);
}

#[test]
fn byoyomi_exhaustion_ends_the_game_on_time() {
    let mut room = Room::new("r1".into(), Settings::new(1, 1), Utc::now());
    room.status = RoomStatus::Playing;
    room.timer_running = true;

    // 1s main time + 1s byoyomi; wait past both.
    let now = room.last_move_timestamp + Duration::seconds(3);
    let (_display, timed_out) = clock::tick(&room, now);
    assert!(timed_out);

    let loser = room.to_move();
    room.finish(shogi_room::room::Outcome {
        winner: Some(loser.opponent()),
        reason: FinishReason::Timeout,
    });
    assert_eq!(room.status, RoomStatus::Finished);
    assert_eq!(room.outcome.unwrap().reason, FinishReason::Timeout);
    assert_eq!(room.outcome.unwrap().winner, Some(loser.opponent()));
}

#[test]
fn perpetual_check_is_an_illegal_sennichite_loss_for_the_checking_side() {
    let mut room = Room::new("r1".into(), Settings::new(600, 30), Utc::now());
    room.status = RoomStatus::Playing;

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
    'cycles: for _ in 0..4 {
        for mv in [sente_out, gote_out, sente_back, gote_back] {
            let mover = room.to_move();
            room.try_move(mv, Utc::now()).unwrap();
            // Simulate Sente giving check on every one of its moves, which
            // this shuffle's real geometry does not — the classifier only
            // looks at the `is_check` flags already recorded in history, so
            // annotating them here exercises perpetual-check classification
            // without needing a fully checking-capable mating net.
            if mover == Color::Sente {
                room.history.last_mut().unwrap().is_check = true;
            }
            outcome = terminal::check(&mut room, mover);
            if outcome.is_some() {
                break 'cycles;
            }
        }
    }

    let outcome = outcome.expect("fourfold repetition should have been detected");
    assert_eq!(outcome.reason, FinishReason::IllegalSennichite);
    assert_eq!(outcome.winner, Some(Color::Gote));
}

#[test]
fn reconnect_resumes_the_clock_from_where_it_was_committed() {
    let mut room = Room::new("r1".into(), Settings::new(600, 30), Utc::now());
    room.status = RoomStatus::Playing;
    room.timer_running = true;

    let disconnect_at = room.last_move_timestamp + Duration::seconds(10);
    clock::pause(&mut room, disconnect_at);
    assert!(!room.timer_running);
    let committed = *room.times.get(Color::Sente);
    assert_eq!(committed, 590);

    // Time passes while disconnected; it must not count against the clock.
    let reconnect_at = disconnect_at + Duration::seconds(120);
    clock::resume(&mut room, reconnect_at);
    assert!(room.timer_running);
    assert_eq!(room.last_move_timestamp, reconnect_at);

    let just_after = reconnect_at + Duration::seconds(1);
    let display = clock::display(&room, just_after);
    assert_eq!(display.main_remaining, committed - 1);
}
