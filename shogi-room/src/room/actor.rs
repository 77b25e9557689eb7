//! The per-room actor (spec 5: "all mutation ... goes through a single
//! serialized entry point per room"). Commands arrive over an mpsc mailbox
//! and are handled one at a time, so two concurrent moves from the same
//! room can never race each other or the 1-second clock tick.

use crate::clock;
use crate::config::Config;
use crate::events::{Outbound, YourRole};
use crate::ids::{SessionId, UserId};
use crate::persistence::PersistenceStore;
use crate::room::{FinishReason, Outcome, Room, SeatAssignment, Settings};
use crate::transport::Transport;
use chrono::Utc;
use shogi_types::{Color, Move};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;

#[derive(Debug)]
pub enum Command {
    Join {
        session: SessionId,
        user_id: UserId,
        user_name: String,
    },
    ToggleReady {
        session: SessionId,
    },
    UpdateSettings {
        session: SessionId,
        settings: Settings,
    },
    Move {
        session: SessionId,
        mv: Move,
        branch_index: Option<usize>,
    },
    Resign {
        session: SessionId,
    },
    Undo {
        session: SessionId,
    },
    Reset {
        session: SessionId,
    },
    Rematch {
        session: SessionId,
    },
    SendMessage {
        session: SessionId,
        user_id: UserId,
        user_name: String,
        text: String,
        role: String,
    },
    Disconnect {
        session: SessionId,
    },
}

/// A cheap handle callers use to talk to a room actor running on its own
/// task. Cloning shares the same mailbox.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<Command>,
}

impl RoomHandle {
    pub async fn send(&self, cmd: Command) {
        // The actor only stops when its task is dropped; a full mailbox
        // backpressures the caller rather than dropping commands.
        let _ = self.sender.send(cmd).await;
    }
}

/// Spawn a room actor owning `room`, wired to `transport` for outbound
/// broadcast and `store` for snapshot persistence. Returns a handle callers
/// use to submit commands; the task runs until the handle (and every
/// clone) is dropped.
pub fn spawn(
    room: Room,
    transport: Arc<dyn Transport>,
    store: Arc<dyn PersistenceStore>,
    config: Config,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(run(room, rx, transport, store, config));
    RoomHandle { sender: tx }
}

async fn run(
    mut room: Room,
    mut rx: mpsc::Receiver<Command>,
    transport: Arc<dyn Transport>,
    store: Arc<dyn PersistenceStore>,
    _config: Config,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            maybe_cmd = rx.recv() => {
                match maybe_cmd {
                    Some(cmd) => {
                        handle(&mut room, cmd, &transport);
                        if let Err(err) = store.save(&room) {
                            log::warn!("room {}: failed to persist snapshot: {}", room.id, err);
                        }
                    }
                    None => break,
                }
            }
            _ = ticker.tick() => {
                tick(&mut room, &transport);
            }
        }
    }
}

fn tick(room: &mut Room, transport: &Arc<dyn Transport>) {
    if room.status != crate::room::RoomStatus::Playing || !room.timer_running {
        return;
    }
    let now = Utc::now();
    let (_display, timed_out) = clock::tick(room, now);
    transport.broadcast_room(&room.id, Outbound::time_update(room));

    if timed_out {
        let loser = room.to_move();
        room.finish(Outcome {
            winner: Some(loser.opponent()),
            reason: FinishReason::Timeout,
        });
        transport.broadcast_room(&room.id, Outbound::finished(room.outcome.unwrap()));
    }
}

/// Send every connected session its own role-aware `sync`, the way `Join`
/// already does for the session that just joined. The room only tracks
/// session ids for seated players, not spectators, so spectators still get
/// the room-wide broadcast (with a `Spectator` role, which is correct for
/// them); it's sent first so the corrective per-seat messages that follow
/// are what seated sessions end up holding.
fn sync_all(room: &Room, transport: &Arc<dyn Transport>) {
    transport.broadcast_room(&room.id, Outbound::sync(room, YourRole::Spectator));
    if let Some(session) = room.players.sente {
        transport.send_to(session, Outbound::sync(room, YourRole::Sente));
    }
    if let Some(session) = room.players.gote {
        transport.send_to(session, Outbound::sync(room, YourRole::Gote));
    }
}

fn handle(room: &mut Room, cmd: Command, transport: &Arc<dyn Transport>) {
    match cmd {
        Command::Join {
            session,
            user_id,
            user_name,
        } => {
            let seat = room.assign_seat(session, &user_id);
            if let SeatAssignment::Seat(color) = seat {
                room.player_names.set(color, Some(user_name));
                room.online.set(color, true);
                transport.broadcast_room(
                    &room.id,
                    Outbound::PlayerNamesUpdated {
                        player_names: room.player_names.clone(),
                    },
                );
            }
            let your_role = match seat {
                SeatAssignment::Seat(Color::Sente) => YourRole::Sente,
                SeatAssignment::Seat(Color::Gote) => YourRole::Gote,
                SeatAssignment::Spectator => YourRole::Spectator,
            };
            transport.send_to(session, Outbound::sync(room, your_role));
            transport.broadcast_room(
                &room.id,
                Outbound::ConnectionStatusUpdate {
                    sente: room.online.sente,
                    gote: room.online.gote,
                },
            );
            if room.status == crate::room::RoomStatus::Playing && room.online.sente && room.online.gote {
                clock::resume(room, Utc::now());
            }
        }

        Command::ToggleReady { session } => {
            let Some(seat) = room.seat_of_session(session) else {
                return;
            };
            let both_ready = room.toggle_ready(seat);
            transport.broadcast_room(&room.id, Outbound::ReadyStatus { ready: room.ready });
            if both_ready {
                let swap_coin = rand::random::<bool>();
                let swapped = room.start_game(Utc::now(), swap_coin);
                transport.broadcast_room(&room.id, Outbound::GameStarted);
                if swapped {
                    sync_all(room, transport);
                }
            }
        }

        Command::UpdateSettings { session, settings } => {
            if room.seat_of_session(session).is_none() || room.status != crate::room::RoomStatus::Waiting {
                return;
            }
            room.settings = settings;
            room.times = crate::room::PerSeat::both(settings.initial_seconds);
            room.current_byoyomi = crate::room::PerSeat::both(settings.byoyomi_seconds as i32);
            transport.broadcast_room(&room.id, Outbound::SettingsUpdated { settings });
        }

        Command::Move {
            session,
            mv,
            branch_index,
        } => {
            if room.status == crate::room::RoomStatus::Analysis {
                if room.analysis_move(mv, branch_index) {
                    transport.broadcast_room(
                        &room.id,
                        Outbound::Move {
                            mv: *room.history.last().unwrap(),
                        },
                    );
                }
                return;
            }
            let Some(seat) = room.seat_of_session(session) else {
                return;
            };
            if room.to_move() != seat {
                return;
            }
            let Some(applied) = room.try_move(mv, Utc::now()) else {
                return;
            };
            transport.broadcast_room(&room.id, Outbound::Move { mv: applied });
            transport.broadcast_room(&room.id, Outbound::time_update(room));

            if let Some(outcome) = crate::terminal::check(room, seat) {
                room.finish(outcome);
                transport.broadcast_room(&room.id, Outbound::finished(outcome));
            }
        }

        Command::Resign { session } => {
            let Some(seat) = room.seat_of_session(session) else {
                return;
            };
            if room.status != crate::room::RoomStatus::Playing {
                return;
            }
            room.resign(seat);
            transport.broadcast_room(&room.id, Outbound::finished(room.outcome.unwrap()));
        }

        Command::Undo { session } => {
            if room.seat_of_session(session).is_none() {
                return;
            }
            if room.undo() {
                sync_all(room, transport);
            }
        }

        Command::Reset { session } => {
            if room.seat_of_session(session).is_none() {
                return;
            }
            if room.reset_position() {
                sync_all(room, transport);
            }
        }

        Command::Rematch { session } => {
            let Some(seat) = room.seat_of_session(session) else {
                return;
            };
            if room.status != crate::room::RoomStatus::Finished {
                return;
            }
            let both = room.request_rematch(seat);
            transport.broadcast_room(
                &room.id,
                Outbound::RematchStatus {
                    rematch_requests: room.rematch_requests,
                },
            );
            if both {
                room.accept_rematch();
                transport.broadcast_room(&room.id, Outbound::ReadyStatus { ready: room.ready });
            }
        }

        Command::SendMessage {
            session,
            user_id,
            user_name,
            text,
            role,
        } => {
            if room.seat_of_session(session).is_none() && role == "player" {
                return;
            }
            transport.broadcast_room(
                &room.id,
                Outbound::ReceiveMessage {
                    id: uuid::Uuid::new_v4().to_string(),
                    text,
                    role,
                    user_name,
                    user_id,
                    timestamp: Utc::now().timestamp_millis(),
                },
            );
        }

        Command::Disconnect { session } => {
            let Some(seat) = room.seat_of_session(session) else {
                return;
            };
            room.online.set(seat, false);
            clock::pause(room, Utc::now());
            transport.broadcast_room(
                &room.id,
                Outbound::ConnectionStatusUpdate {
                    sente: room.online.sente,
                    gote: room.online.gote,
                },
            );
        }
    }
}
