//! Error types for the room layer.

use zoka_engine::GameError;
use zoka_protocol::RoomCode;

/// Errors that can occur while routing a command to a room.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this code exists.
    #[error("no room with code {0}")]
    NotFound(RoomCode),

    /// The room's command channel is closed (room torn down mid-flight).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// The room refused the command.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl RoomError {
    /// HTTP-style wire code for `ERROR` events.
    pub fn code(&self) -> u16 {
        match self {
            RoomError::NotFound(_) | RoomError::Unavailable(_) => 404,
            RoomError::Game(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes() {
        let code = RoomCode::parse("ABCDEF").unwrap();
        assert_eq!(RoomError::NotFound(code.clone()).code(), 404);
        assert_eq!(RoomError::Unavailable(code).code(), 404);
        assert_eq!(RoomError::Game(GameError::NotHost).code(), 401);
        assert_eq!(RoomError::Game(GameError::RoomFull).code(), 409);
    }
}
