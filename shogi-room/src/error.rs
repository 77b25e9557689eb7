//! Error taxonomy (spec 7). Rule violations and malformed client payloads
//! are never represented as `Err` — spec 7 is explicit that those are
//! silently ignored. These types cover what's left: persistence failures
//! and internal bugs, which are logged rather than surfaced to clients.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("serializing room snapshot failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store write failed: {0}")]
    Store(#[from] sled::Error),
}

#[derive(Error, Debug)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(String),

    #[error("seat is already taken")]
    SeatTaken,
}
