//! Client commands: the closed set of requests a client may send.
//!
//! `#[serde(tag = "type")]` with SCREAMING_SNAKE_CASE tags keeps the wire
//! shape identical to the browser client's socket events:
//!
//! ```json
//! { "type": "JOIN_ROOM", "username": "kai", "code": "A1B2C3" }
//! ```
//!
//! Anything that doesn't parse into one of these variants is rejected at
//! the transport boundary — there is no open-ended payload.

use serde::{Deserialize, Serialize};

use crate::{CardId, PlayerId};

/// All commands a client can issue.
///
/// `JOIN_ROOM` carries the code as a raw string; the gateway validates it
/// with [`crate::RoomCode::parse`] so a malformed code produces a
/// validation error rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCommand {
    /// Announce or change the username for this connection.
    SetIdentity { username: String },

    /// Create a room and become its host.
    #[serde(rename_all = "camelCase")]
    CreateRoom { username: String, max_players: usize },

    /// Join an existing room by code.
    JoinRoom { username: String, code: String },

    /// Leave the current room.
    LeaveRoom,

    /// Toggle readiness while the room is waiting.
    SetReady { ready: bool },

    /// Start the match (host only).
    StartGame,

    /// Play a card from hand on the current turn.
    #[serde(rename_all = "camelCase")]
    PlayCard { card_id: CardId },

    /// Remove a player from the room (host only).
    #[serde(rename_all = "camelCase")]
    KickPlayer { target_id: PlayerId },

    /// Request the lobby's room list.
    ListRooms,

    /// Return a finished room to the lobby (host only).
    ResetToLobby,
}
