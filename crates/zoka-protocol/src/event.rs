//! Server events: everything the server pushes to clients.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, RoomSnapshot, RoomSummary, RoundRecord};

/// All events the server emits.
///
/// Room-scoped events go to the room's members; `ROOM_LIST` goes to lobby
/// subscribers; `KICKED` only to the removed player; `ERROR` only to the
/// client whose command failed. Failures are never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    /// First event on every connection: the id assigned to this client.
    #[serde(rename_all = "camelCase")]
    Welcome { player_id: PlayerId },

    /// Full snapshot after any room mutation.
    RoomUpdated { room: RoomSnapshot },

    /// Current lobby listing.
    RoomList { rooms: Vec<RoomSummary> },

    /// The match began; hands are dealt and round 1 is live.
    GameStarted { room: RoomSnapshot },

    /// A new round began after the previous one resolved.
    RoundStarted { room: RoomSnapshot },

    /// A round fully resolved.
    RoundResult { record: RoundRecord },

    /// The match finished after round 10 (or an early abort). Standings
    /// are player ids by star total, descending, ties in join order.
    GameEnded {
        room: RoomSnapshot,
        standings: Vec<PlayerId>,
    },

    /// You were removed from the room by the host.
    Kicked,

    /// A command from this client failed. Codes follow HTTP conventions:
    /// 400 validation, 401 authorization, 404 not found, 409 state.
    Error { code: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoomCode, RoomStatus};

    fn snapshot() -> RoomSnapshot {
        RoomSnapshot {
            code: RoomCode::parse("TEST01").unwrap(),
            max_players: 4,
            status: RoomStatus::Waiting,
            players: vec![],
            host_id: PlayerId(1),
            round: 1,
            turn_order: vec![],
            current_turn_index: 0,
            history: vec![],
            version: 1,
        }
    }

    #[test]
    fn test_event_tags_match_client_expectations() {
        let cases: Vec<(ServerEvent, &str)> = vec![
            (ServerEvent::Welcome { player_id: PlayerId(1) }, "WELCOME"),
            (ServerEvent::RoomUpdated { room: snapshot() }, "ROOM_UPDATED"),
            (ServerEvent::RoomList { rooms: vec![] }, "ROOM_LIST"),
            (ServerEvent::GameStarted { room: snapshot() }, "GAME_STARTED"),
            (ServerEvent::RoundStarted { room: snapshot() }, "ROUND_STARTED"),
            (
                ServerEvent::GameEnded {
                    room: snapshot(),
                    standings: vec![PlayerId(1)],
                },
                "GAME_ENDED",
            ),
            (ServerEvent::Kicked, "KICKED"),
        ];
        for (event, tag) in cases {
            let json: serde_json::Value = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], tag);
        }
    }

    #[test]
    fn test_error_event_shape() {
        let event = ServerEvent::Error {
            code: 409,
            message: "room is full".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ERROR");
        assert_eq!(json["code"], 409);
        assert_eq!(json["message"], "room is full");
    }

    #[test]
    fn test_room_updated_round_trip() {
        let event = ServerEvent::RoomUpdated { room: snapshot() };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
