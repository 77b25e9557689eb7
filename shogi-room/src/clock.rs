//! The per-room countdown clock (spec 4.B).
//!
//! These are plain functions over `Room`'s clock fields rather than a
//! stateful object of their own — the actual "schedule a periodic tick"
//! part lives in the room actor (`room::actor`), which owns the
//! `tokio::time::interval` and calls `tick` once a second. Keeping the
//! arithmetic here free of any async runtime makes it exercisable from a
//! plain unit test with a hand-picked `now`.

use crate::room::Room;
use chrono::{DateTime, Utc};
use shogi_types::Color;

/// What a tick or a move-commit just established about the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    pub main_remaining: u32,
    pub byoyomi_remaining: i32,
}

/// `start(room)`: mark the clock as running from `now`. The room's
/// `last_move_timestamp` must already reflect the turn's start (set by
/// `Room::start_game`/`Room::try_move`); this just flips the flag the room
/// actor uses to decide whether to keep ticking.
pub fn start(room: &mut Room) {
    room.timer_running = true;
}

/// Elapsed whole seconds since the clock was last reset, clamped to >= 0.
fn elapsed_seconds(room: &Room, now: DateTime<Utc>) -> u32 {
    let ms = (now - room.last_move_timestamp).num_milliseconds().max(0);
    (ms / 1000) as u32
}

/// What the clock would currently display for the side to move, without
/// mutating anything — used both by the 1-second tick and by tests.
pub fn display(room: &Room, now: DateTime<Utc>) -> Display {
    let side = room.to_move();
    let main = *room.times.get(side);
    let elapsed = elapsed_seconds(room, now);

    if elapsed < main {
        Display {
            main_remaining: main - elapsed,
            byoyomi_remaining: *room.current_byoyomi.get(side),
        }
    } else {
        let over_elapsed = (elapsed - main) as i32;
        Display {
            main_remaining: 0,
            byoyomi_remaining: room.settings.byoyomi_seconds as i32 - over_elapsed,
        }
    }
}

/// One 1-second tick against wall-clock `now`. Returns `true` if the
/// active side has run out of byoyomi — the caller (room actor) then ends
/// the game with `reason = timeout`.
pub fn tick(room: &Room, now: DateTime<Utc>) -> (Display, bool) {
    let d = display(room, now);
    (d, d.byoyomi_remaining < 0)
}

/// `stop(room, commit)`: fold the elapsed time for `side` into its
/// committed counters. Called on every move (implicitly "stop with
/// commit") and on disconnect-driven pause.
pub fn commit(room: &mut Room, side: Color, elapsed_ms: u64) {
    room.total_consumed_times_ms
        .set(side, *room.total_consumed_times_ms.get(side) + elapsed_ms);

    let elapsed_s = (elapsed_ms / 1000) as u32;
    let main = *room.times.get(side);
    if elapsed_s < main {
        room.times.set(side, main - elapsed_s);
    } else {
        let over_elapsed = (elapsed_s - main) as i32;
        room.times.set(side, 0);
        room.current_byoyomi
            .set(side, room.settings.byoyomi_seconds as i32 - over_elapsed);
    }
    room.timer_running = false;
}

/// Pause on disconnect: commit whatever has elapsed so far, same as a move
/// commit, but without advancing `last_move_timestamp` — resuming later
/// restarts the clock from exactly this committed state (spec 4.B "Pause
/// semantics").
pub fn pause(room: &mut Room, now: DateTime<Utc>) {
    if !room.timer_running {
        return;
    }
    let side = room.to_move();
    let elapsed_ms = (now - room.last_move_timestamp).num_milliseconds().max(0) as u64;
    commit(room, side, elapsed_ms);
}

/// Resume after both seats are observed online again: restart the clock
/// from the committed state, i.e. just reset the reference instant.
pub fn resume(room: &mut Room, now: DateTime<Utc>) {
    room.last_move_timestamp = now;
    room.timer_running = true;
}
