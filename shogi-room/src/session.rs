//! Session Router (spec 4.E): maps opaque transport sessions to
//! `{room, user}` and dispatches inbound events to the right room actor,
//! creating rooms on first join and tearing down empty ones is left to the
//! GC sweep in `main`, not to the router itself.

use crate::config::Config;
use crate::events::{Inbound, Outbound};
use crate::ids::{RoomId, SessionId, UserId};
use crate::persistence::PersistenceStore;
use crate::room::actor::{Command, RoomHandle};
use crate::room::{Room, Settings};
use crate::transport::Transport;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct SessionInfo {
    room_id: RoomId,
    user_id: UserId,
    user_name: String,
}

/// Shared across every connection. Cheap to clone (everything behind
/// `Arc`/`DashMap`), matching the pattern used for `dashmap`-backed
/// registries elsewhere in the pack.
#[derive(Clone)]
pub struct SessionRouter {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    sessions: Arc<DashMap<SessionId, SessionInfo>>,
    store: Arc<dyn PersistenceStore>,
    transport: Arc<dyn Transport>,
    config: Config,
    global_connections: Arc<AtomicUsize>,
}

impl SessionRouter {
    pub fn new(store: Arc<dyn PersistenceStore>, transport: Arc<dyn Transport>, config: Config) -> Self {
        SessionRouter {
            rooms: Arc::new(DashMap::new()),
            sessions: Arc::new(DashMap::new()),
            store,
            transport,
            config,
            global_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle one inbound event from `session`, routing it to the right
    /// room actor. `ping_latency`/`disconnect` carry no `room_id` of their
    /// own; `disconnect` looks the session's room up from `self.sessions`.
    pub async fn dispatch(&self, session: SessionId, event: Inbound) {
        match event {
            Inbound::JoinRoom {
                room_id,
                mode,
                user_id,
                user_name,
            } => {
                self.join_room(session, room_id, mode, user_id, user_name).await;
            }
            Inbound::SendMessage { room_id, text, role } => {
                if let Some(info) = self.sessions.get(&session) {
                    let user_id = info.user_id.clone();
                    let user_name = info.user_name.clone();
                    drop(info);
                    if let Some(handle) = self.handle_for(&room_id) {
                        handle
                            .send(Command::SendMessage {
                                session,
                                user_id,
                                user_name,
                                text,
                                role,
                            })
                            .await;
                    }
                }
            }
            Inbound::UpdateSettings { room_id, settings } => {
                if let Some(handle) = self.handle_for(&room_id) {
                    handle.send(Command::UpdateSettings { session, settings }).await;
                }
            }
            Inbound::ToggleReady { room_id } => {
                if let Some(handle) = self.handle_for(&room_id) {
                    handle.send(Command::ToggleReady { session }).await;
                }
            }
            Inbound::Move {
                room_id,
                mv,
                branch_index,
            } => {
                if let Some(handle) = self.handle_for(&room_id) {
                    handle
                        .send(Command::Move {
                            session,
                            mv,
                            branch_index,
                        })
                        .await;
                }
            }
            Inbound::GameResign { room_id } => {
                if let Some(handle) = self.handle_for(&room_id) {
                    handle.send(Command::Resign { session }).await;
                }
            }
            Inbound::Undo { room_id } => {
                if let Some(handle) = self.handle_for(&room_id) {
                    handle.send(Command::Undo { session }).await;
                }
            }
            Inbound::Reset { room_id } => {
                if let Some(handle) = self.handle_for(&room_id) {
                    handle.send(Command::Reset { session }).await;
                }
            }
            Inbound::Rematch { room_id } => {
                if let Some(handle) = self.handle_for(&room_id) {
                    handle.send(Command::Rematch { session }).await;
                }
            }
            Inbound::PingLatency => {
                // Accepted and otherwise ignored — no state change, no
                // broadcast (spec 9's resolved Open Question).
            }
            Inbound::Disconnect => {
                self.disconnect(session).await;
            }
        }
    }

    async fn join_room(
        &self,
        session: SessionId,
        room_id: RoomId,
        mode: Option<String>,
        user_id: UserId,
        user_name: String,
    ) {
        if !self.rooms.contains_key(&room_id) {
            let room = self.store.load(&room_id).ok().flatten().unwrap_or_else(|| {
                let mut room = Room::new(
                    room_id.clone(),
                    Settings::new(self.config.initial_seconds, self.config.byoyomi_seconds),
                    chrono::Utc::now(),
                );
                // A brand-new room joined in "analysis" mode starts life as a
                // non-authoritative free-move board rather than a waiting
                // two-player match (spec 3's `status` enum, spec 4.C).
                if mode.as_deref() == Some("analysis") {
                    room.status = crate::room::RoomStatus::Analysis;
                }
                room
            });
            let handle = crate::room::actor::spawn(room, self.transport.clone(), self.store.clone(), self.config);
            self.rooms.insert(room_id.clone(), handle);
        }

        self.sessions.insert(
            session,
            SessionInfo {
                room_id: room_id.clone(),
                user_id: user_id.clone(),
                user_name: user_name.clone(),
            },
        );
        self.global_connections.fetch_add(1, Ordering::SeqCst);

        if let Some(handle) = self.handle_for(&room_id) {
            handle
                .send(Command::Join {
                    session,
                    user_id,
                    user_name,
                })
                .await;
        }

        self.transport
            .broadcast_global(Outbound::UpdateGlobalCount(self.global_connections.load(Ordering::SeqCst)));
        self.transport.broadcast_room(
            &room_id,
            Outbound::UpdateRoomCount(self.sessions.iter().filter(|s| s.room_id == room_id).count()),
        );
    }

    async fn disconnect(&self, session: SessionId) {
        if let Some((_, info)) = self.sessions.remove(&session) {
            if let Some(handle) = self.handle_for(&info.room_id) {
                handle.send(Command::Disconnect { session }).await;
            }
            self.global_connections.fetch_sub(1, Ordering::SeqCst);
            self.transport
                .broadcast_global(Outbound::UpdateGlobalCount(self.global_connections.load(Ordering::SeqCst)));
            self.transport.broadcast_room(
                &info.room_id,
                Outbound::UpdateRoomCount(self.sessions.iter().filter(|s| s.room_id == info.room_id).count()),
            );
        }
    }

    fn handle_for(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    fn has_live_sessions(&self, room_id: &RoomId) -> bool {
        self.sessions.iter().any(|s| &s.room_id == room_id)
    }

    /// Startup sweep (spec 4.F): "read all snapshots and repopulate the
    /// in-memory room map with timers unset". Deserialized rooms already
    /// come back with `timer_running = false` (it's excluded from
    /// persistence), so this only needs to spawn an actor per snapshot and
    /// register its handle before any session can reach the room.
    pub fn restore_from_store(&self) {
        let rooms = match self.store.load_all() {
            Ok(rooms) => rooms,
            Err(err) => {
                log::warn!("startup: failed to load persisted rooms: {err}");
                return;
            }
        };
        for room in rooms {
            let id = room.id.clone();
            let handle = crate::room::actor::spawn(room, self.transport.clone(), self.store.clone(), self.config);
            self.rooms.insert(id, handle);
        }
    }

    /// Hourly GC sweep (spec 4.F): delete persisted snapshots older than
    /// `older_than_ms` and evict their in-memory room actors, but only for
    /// rooms with no live sessions attached — a room someone is still
    /// connected to is never collected, no matter how stale its last save.
    pub fn gc_sweep(&self, older_than_ms: i64) {
        let stale = match self.store.stale_ids(older_than_ms) {
            Ok(ids) => ids,
            Err(err) => {
                log::warn!("gc: failed to list stale rooms: {err}");
                return;
            }
        };
        for id in stale {
            if self.has_live_sessions(&id) {
                continue;
            }
            log::info!("gc: evicting stale room {id}");
            self.rooms.remove(&id);
            if let Err(err) = self.store.delete(&id) {
                log::warn!("gc: failed to delete room {id}: {err}");
            }
        }
    }
}
