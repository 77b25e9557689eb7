//! Drives the room actor's own mailbox (spec 5: "all mutation ... goes
//! through a single serialized entry point per room"), rather than calling
//! `Room`/`clock` functions directly the way `scenarios.rs` does. These
//! tests exist to exercise the ordering guarantees that only the actor's
//! mailbox, not `Room` alone, is responsible for.

use shogi_room::events::Outbound;
use shogi_room::ids::{RoomId, SessionId};
use shogi_room::persistence::MemoryStore;
use shogi_room::room::actor::{self, Command};
use shogi_room::room::{PerSeat, Room, RoomStatus, Settings};
use shogi_room::transport::Transport;
use shogi_room::Config;
use shogi_types::{Board, Color, Hands, Kind, Move, Piece, Square};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every outbound event in the order the actor emitted it. Seated
/// `send_to` traffic and room-wide `broadcast_room` traffic land in the
/// same timeline, which is exactly what the ordering guarantees below need
/// to check.
#[derive(Default)]
struct RecordingTransport {
    events: Mutex<Vec<Outbound>>,
}

impl Transport for RecordingTransport {
    fn send_to(&self, _session: SessionId, event: Outbound) {
        self.events.lock().unwrap().push(event);
    }

    fn broadcast_room(&self, _room_id: &RoomId, event: Outbound) {
        self.events.lock().unwrap().push(event);
    }

    fn broadcast_global(&self, event: Outbound) {
        self.events.lock().unwrap().push(event);
    }
}

/// The same corner-mate position `scenarios.rs` uses, seated with real
/// session ids so the actor can route a `Command::Move` to it.
fn boxed_in_king_room() -> (Room, SessionId, SessionId) {
    let mut board = Board::empty();
    board.set(Square::new(4, 0), Some(Piece::new(Kind::King, Color::Gote)));
    board.set(Square::new(3, 0), Some(Piece::new(Kind::Knight, Color::Gote)));
    board.set(Square::new(5, 0), Some(Piece::new(Kind::Knight, Color::Gote)));
    board.set(Square::new(3, 1), Some(Piece::new(Kind::Silver, Color::Gote)));
    board.set(Square::new(5, 1), Some(Piece::new(Kind::Silver, Color::Gote)));
    board.set(Square::new(4, 2), Some(Piece::new(Kind::Gold, Color::Sente)));
    board.set(Square::new(4, 8), Some(Piece::new(Kind::King, Color::Sente)));
    let mut hands = Hands::empty();
    hands.sente.add(Kind::Lance);

    let mut room = Room::new("r1".into(), Settings::new(600, 30), chrono::Utc::now());
    room.board = board;
    room.hands = hands;
    room.status = RoomStatus::Playing;

    let sente = SessionId::new();
    let gote = SessionId::new();
    room.players = PerSeat::new(Some(sente), Some(gote));
    (room, sente, gote)
}

async fn settle() {
    // Yields the runtime back to the actor's task long enough for it to
    // drain whatever is already queued in its mailbox.
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn a_mating_move_is_broadcast_before_the_game_finished_it_causes() {
    let (room, sente, _gote) = boxed_in_king_room();
    let transport = Arc::new(RecordingTransport::default());
    let store = Arc::new(MemoryStore::default());
    let handle = actor::spawn(room, transport.clone(), store, Config::default());

    handle
        .send(Command::Move {
            session: sente,
            mv: Move::Drop {
                to: Square::new(4, 1),
                piece: Kind::Lance,
            },
            branch_index: None,
        })
        .await;
    settle().await;

    let events = transport.events.lock().unwrap();
    let move_idx = events
        .iter()
        .position(|e| matches!(e, Outbound::Move { .. }))
        .expect("a Move event should have been broadcast");
    let finished_idx = events
        .iter()
        .position(|e| matches!(e, Outbound::GameFinished { .. }))
        .expect("a GameFinished event should have been broadcast");
    assert!(
        move_idx < finished_idx,
        "the move that causes checkmate must be broadcast before the terminal event it triggers"
    );
}

#[tokio::test]
async fn an_illegal_move_through_the_actor_mutates_nothing_and_broadcasts_nothing() {
    let (room, sente, _gote) = boxed_in_king_room();
    let transport = Arc::new(RecordingTransport::default());
    let store = Arc::new(MemoryStore::default());
    let handle = actor::spawn(room, transport.clone(), store, Config::default());

    // Sente holds a Lance, not a Pawn, in this position; the drop is not legal.
    handle
        .send(Command::Move {
            session: sente,
            mv: Move::Drop {
                to: Square::new(0, 4),
                piece: Kind::Pawn,
            },
            branch_index: None,
        })
        .await;
    settle().await;

    assert!(transport.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn commands_sent_back_to_back_are_handled_in_submission_order() {
    let mut room = Room::new("r2".into(), Settings::new(600, 30), chrono::Utc::now());
    room.status = RoomStatus::Waiting;
    let sente = SessionId::new();
    let gote = SessionId::new();
    room.players = PerSeat::new(Some(sente), Some(gote));

    let transport = Arc::new(RecordingTransport::default());
    let store = Arc::new(MemoryStore::default());
    let handle = actor::spawn(room, transport.clone(), store, Config::default());

    // Both seats ready up back to back, with no `.await` gap between the
    // sends; the single-writer mailbox must still process Sente's toggle
    // before Gote's, so the game only starts once, on the second command.
    handle.send(Command::ToggleReady { session: sente }).await;
    handle.send(Command::ToggleReady { session: gote }).await;
    settle().await;

    let events = transport.events.lock().unwrap();
    let started = events.iter().filter(|e| matches!(e, Outbound::GameStarted)).count();
    assert_eq!(started, 1, "both-ready should start the game exactly once");
}
