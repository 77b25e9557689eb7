//! The room state machine (spec 4.C) — seating, readiness, play, rematch.

pub mod actor;
mod outcome;
mod seat;
mod settings;

pub use outcome::{FinishReason, Outcome};
pub use seat::{PerSeat, SeatAssignment};
pub use settings::Settings;

use crate::ids::{SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shogi_types::{apply_move, fingerprint, is_king_in_check, is_legal, Board, Color, Hands, HistoryMove, Move, MoveTime};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
    Analysis,
}

/// The authoritative state of one room. Mirrors spec 3's `Room` record
/// field for field; `timer_running` is the one runtime-only flag excluded
/// from persistence (spec 3: "runtime-only `timerHandle` (not persisted)").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub status: RoomStatus,

    pub board: Board,
    pub hands: Hands,
    pub history: Vec<HistoryMove>,
    pub sfen_history: HashMap<String, u32>,
    /// Fingerprints indexed `0..=history.len()`; index 0 is the initial
    /// position ("index -1" in spec 4.D/9's prose — stored at 0 here since
    /// Rust indices aren't negative). Internal bookkeeping used only by the
    /// repetition classifier; not itself a spec 3 field.
    fingerprints: Vec<String>,

    pub players: PerSeat<Option<SessionId>>,
    pub user_ids: PerSeat<Option<UserId>>,
    pub player_names: PerSeat<Option<String>>,

    pub ready: PerSeat<bool>,
    pub rematch_requests: PerSeat<bool>,
    /// Whether each seat currently has a live session attached. Distinct
    /// from `players` (which stays sticky across a disconnect so a
    /// reconnecting user id can reclaim its seat) — spec 6
    /// `connection_status_update`.
    #[serde(skip, default = "PerSeat::default")]
    pub online: PerSeat<bool>,

    pub settings: Settings,

    pub times: PerSeat<u32>,
    pub current_byoyomi: PerSeat<i32>,
    pub total_consumed_times_ms: PerSeat<u64>,
    pub last_move_timestamp: DateTime<Utc>,

    pub game_start_time: Option<DateTime<Utc>>,
    pub game_count: u32,

    pub outcome: Option<Outcome>,

    #[serde(skip)]
    pub timer_running: bool,
}

impl Room {
    pub fn new(id: String, settings: Settings, now: DateTime<Utc>) -> Self {
        let board = Board::initial();
        let hands = Hands::empty();
        Room {
            id,
            status: RoomStatus::Waiting,
            fingerprints: vec![fingerprint(&board, Color::Sente, &hands)],
            board,
            hands,
            history: Vec::new(),
            sfen_history: HashMap::new(),
            players: PerSeat::default(),
            user_ids: PerSeat::default(),
            player_names: PerSeat::default(),
            ready: PerSeat::both(false),
            rematch_requests: PerSeat::both(false),
            online: PerSeat::both(false),
            times: PerSeat::both(settings.initial_seconds),
            current_byoyomi: PerSeat::both(settings.byoyomi_seconds as i32),
            settings,
            total_consumed_times_ms: PerSeat::both(0),
            last_move_timestamp: now,
            game_start_time: None,
            game_count: 0,
            outcome: None,
            timer_running: false,
        }
    }

    /// Whose move it is, derived from history parity (spec 3 invariant 1).
    pub fn to_move(&self) -> Color {
        if self.history.len() % 2 == 0 {
            Color::Sente
        } else {
            Color::Gote
        }
    }

    /// Seating rule (spec 4.C): sticky by user id, else first empty seat
    /// preferring Sente, else spectator.
    pub fn assign_seat(&mut self, session: SessionId, user_id: &str) -> SeatAssignment {
        if self.user_ids.sente.as_deref() == Some(user_id) {
            self.players.sente = Some(session);
            return SeatAssignment::Seat(Color::Sente);
        }
        if self.user_ids.gote.as_deref() == Some(user_id) {
            self.players.gote = Some(session);
            return SeatAssignment::Seat(Color::Gote);
        }
        if self.user_ids.sente.is_none() {
            self.user_ids.sente = Some(user_id.to_owned());
            self.players.sente = Some(session);
            return SeatAssignment::Seat(Color::Sente);
        }
        if self.user_ids.gote.is_none() {
            self.user_ids.gote = Some(user_id.to_owned());
            self.players.gote = Some(session);
            return SeatAssignment::Seat(Color::Gote);
        }
        SeatAssignment::Spectator
    }

    pub fn seat_of_session(&self, session: SessionId) -> Option<Color> {
        if self.players.sente == Some(session) {
            Some(Color::Sente)
        } else if self.players.gote == Some(session) {
            Some(Color::Gote)
        } else {
            None
        }
    }

    /// `toggle_ready`: flips a seat's readiness; returns `true` if both
    /// seats are now ready (caller should then call `start_game`).
    pub fn toggle_ready(&mut self, seat: Color) -> bool {
        let cur = *self.ready.get(seat);
        self.ready.set(seat, !cur);
        *self.ready.get(Color::Sente) && *self.ready.get(Color::Gote)
    }

    /// waiting -> playing (spec 4.C). Applies the side-swap policy, resets
    /// position/history/clocks, and starts the Clock. Returns whether the
    /// seating was actually swapped, so callers can notify seated sessions
    /// of their new role.
    pub fn start_game(&mut self, now: DateTime<Utc>, swap_coin: bool) -> bool {
        let swapped = self.settings.random_turn && !(self.game_count > 0 && self.settings.fix_turn) && swap_coin;
        if swapped {
            self.players.swap();
            self.user_ids.swap();
            self.player_names.swap();
        }

        self.reset_position_and_clocks();

        self.game_count += 1;
        self.game_start_time = Some(now);
        self.last_move_timestamp = now;
        self.status = RoomStatus::Playing;
        self.timer_running = true;
        swapped
    }

    /// Board/hands/history/fingerprints/clocks reset shared by `start_game`
    /// and `accept_rematch` — everything a fresh game needs except the
    /// seating swap, `status`, and the clock-running bookkeeping, which
    /// differ between the two transitions.
    fn reset_position_and_clocks(&mut self) {
        self.board = Board::initial();
        self.hands = Hands::empty();
        self.history.clear();
        self.sfen_history.clear();
        self.fingerprints = vec![fingerprint(&self.board, Color::Sente, &self.hands)];
        self.times = PerSeat::both(self.settings.initial_seconds);
        self.current_byoyomi = PerSeat::both(self.settings.byoyomi_seconds as i32);
        self.outcome = None;
    }

    /// Validate and, if legal, apply a move from the side to move. Returns
    /// the applied move's annotations on success; the room is unchanged on
    /// rejection (spec 7: rule violations are silently ignored).
    pub fn try_move(&mut self, mv: Move, now: DateTime<Utc>) -> Option<HistoryMove> {
        if self.status != RoomStatus::Playing {
            return None;
        }
        let side = self.to_move();
        if !is_legal(&self.board, &self.hands, side, mv, true) {
            return None;
        }

        let elapsed_ms = (now - self.last_move_timestamp).num_milliseconds().max(0) as u64;
        crate::clock::commit(self, side, elapsed_ms);

        let (board, hands) = apply_move(&self.board, &self.hands, side, mv);
        self.board = board;
        self.hands = hands;

        let is_check = is_king_in_check(&self.board, side.opponent());
        let total_ms = *self.total_consumed_times_ms.get(side);
        let annotated = HistoryMove {
            mv,
            is_check,
            time: MoveTime {
                now: elapsed_ms / 1000,
                total: total_ms / 1000,
            },
        };
        self.history.push(annotated);
        self.current_byoyomi.set(side, self.settings.byoyomi_seconds as i32);
        self.fingerprints.push(fingerprint(&self.board, side.opponent(), &self.hands));

        // Clock.start for the opponent's turn: the tick derives remaining
        // time from `now - last_move_timestamp`, never from accumulation.
        self.last_move_timestamp = now;
        self.timer_running = true;

        Some(annotated)
    }

    /// Record the fingerprint reached by the last move and return its
    /// running multiplicity (spec 3 invariant 3, spec 4.D).
    pub fn bump_fingerprint_count(&mut self) -> u32 {
        let fp = self.fingerprints.last().cloned().unwrap_or_default();
        let count = self.sfen_history.entry(fp).or_insert(0);
        *count += 1;
        *count
    }

    pub fn current_fingerprint(&self) -> &str {
        self.fingerprints.last().map(String::as_str).unwrap_or_default()
    }

    /// The index (into `self.fingerprints`/implicitly `self.history`) of
    /// the most recent *earlier* occurrence of the current fingerprint, if
    /// any. `None` means this is the first time the position is reached.
    pub fn previous_fingerprint_occurrence(&self) -> Option<usize> {
        let current = self.fingerprints.last()?;
        let last_idx = self.fingerprints.len() - 1;
        self.fingerprints[..last_idx]
            .iter()
            .rposition(|fp| fp == current)
    }

    /// The block of moves (0-based `history` indices) between the previous
    /// occurrence (exclusive of its own causing move) and the current one
    /// (inclusive) — spec 4.D / 9.
    pub fn repetition_block(&self, prev_occurrence_idx: usize) -> &[HistoryMove] {
        &self.history[prev_occurrence_idx..]
    }

    pub fn finish(&mut self, outcome: Outcome) {
        self.status = RoomStatus::Finished;
        self.outcome = Some(outcome);
        self.timer_running = false;
    }

    pub fn resign(&mut self, seat: Color) {
        self.finish(Outcome {
            winner: Some(seat.opponent()),
            reason: FinishReason::Resign,
        });
    }

    /// `undo`: only outside `playing` (spec 9). Pops one move and replays
    /// from the initial position to rebuild board/hands/fingerprint
    /// counts.
    pub fn undo(&mut self) -> bool {
        if self.status == RoomStatus::Playing || self.history.is_empty() {
            return false;
        }
        self.history.pop();
        self.replay_from_scratch();
        true
    }

    /// `reset`: only outside `playing` (spec 9's resolved ambiguity).
    /// Clears history and returns to the starting position without
    /// changing `status`.
    pub fn reset_position(&mut self) -> bool {
        if self.status == RoomStatus::Playing {
            return false;
        }
        self.history.clear();
        self.replay_from_scratch();
        true
    }

    /// Analysis-mode move: optionally branch from an earlier point in
    /// history, then append. Only valid in `status = Analysis`.
    pub fn analysis_move(&mut self, mv: Move, branch_index: Option<usize>) -> bool {
        if self.status != RoomStatus::Analysis {
            return false;
        }
        if let Some(idx) = branch_index {
            if idx > self.history.len() {
                return false;
            }
            self.history.truncate(idx);
            self.replay_from_scratch();
        }
        let side = self.to_move();
        if !is_legal(&self.board, &self.hands, side, mv, true) {
            return false;
        }
        let (board, hands) = apply_move(&self.board, &self.hands, side, mv);
        self.board = board;
        self.hands = hands;
        let is_check = is_king_in_check(&self.board, side.opponent());
        self.history.push(HistoryMove {
            mv,
            is_check,
            time: MoveTime::default(),
        });
        self.fingerprints.push(fingerprint(&self.board, side.opponent(), &self.hands));
        true
    }

    pub fn request_rematch(&mut self, seat: Color) -> bool {
        self.rematch_requests.set(seat, true);
        self.rematch_requests.sente && self.rematch_requests.gote
    }

    /// finished -> waiting once both seats request rematch. Resets the
    /// board/hands/history/clocks the same way `start_game` does, minus the
    /// seating swap and `status = Playing`, so a client syncing during the
    /// waiting window sees a fresh position rather than the finished game.
    pub fn accept_rematch(&mut self) {
        self.status = RoomStatus::Waiting;
        self.ready = PerSeat::both(false);
        self.rematch_requests = PerSeat::both(false);
        self.reset_position_and_clocks();
    }

    fn replay_from_scratch(&mut self) {
        let mut board = Board::initial();
        let mut hands = Hands::empty();
        let mut fingerprints = vec![fingerprint(&board, Color::Sente, &hands)];
        let mut sfen_history: HashMap<String, u32> = HashMap::new();
        *sfen_history.entry(fingerprints[0].clone()).or_insert(0) += 1;

        for (i, entry) in self.history.iter().enumerate() {
            let side = if i % 2 == 0 { Color::Sente } else { Color::Gote };
            let (new_board, new_hands) = apply_move(&board, &hands, side, entry.mv);
            board = new_board;
            hands = new_hands;
            let fp = fingerprint(&board, side.opponent(), &hands);
            *sfen_history.entry(fp.clone()).or_insert(0) += 1;
            fingerprints.push(fp);
        }

        self.board = board;
        self.hands = hands;
        self.fingerprints = fingerprints;
        self.sfen_history = sfen_history;
    }
}
