//! Identifiers. Session ids are server-generated and opaque to clients;
//! user ids are client-supplied opaque strings, stable across reconnects
//! (spec 3, "Room... userIds"; spec "Authentication is not a concern").

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        SessionId::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque, client-supplied user identifier. No authentication is
/// performed on it; it exists only to re-seat a reconnecting player.
pub type UserId = String;

pub type RoomId = String;
