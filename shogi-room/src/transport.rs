//! The boundary between room logic and whatever actually carries bytes to
//! a client (WebSocket, in-process channel, test harness). Spec 9 resolves
//! the wire layer itself as out of scope; this trait is the interface the
//! core needs from it, matching the shape of `haitaka`'s own separation
//! between move generation and the not-its-concern UI/engine glue.

use crate::events::Outbound;
use crate::ids::{RoomId, SessionId};

pub trait Transport: Send + Sync {
    fn send_to(&self, session: SessionId, event: Outbound);
    fn broadcast_room(&self, room_id: &RoomId, event: Outbound);
    fn broadcast_global(&self, event: Outbound);
}

/// A transport that only logs, for local smoke-testing and as the default
/// before a real socket layer is wired in.
pub struct LoggingTransport;

impl Transport for LoggingTransport {
    fn send_to(&self, session: SessionId, event: Outbound) {
        log::debug!("-> {session}: {event:?}");
    }

    fn broadcast_room(&self, room_id: &RoomId, event: Outbound) {
        log::debug!("-> room {room_id}: {event:?}");
    }

    fn broadcast_global(&self, event: Outbound) {
        log::debug!("-> *: {event:?}");
    }
}
