//! Error types for game commands.

use zoka_protocol::{CardId, PlayerId, RoomStatus};

/// Broad classification of a [`GameError`], used to pick the wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structurally invalid input: bad username, maxPlayers out of range.
    Validation,
    /// The caller lacks permission (host-only commands).
    Authorization,
    /// The target room does not exist.
    NotFound,
    /// The command is valid but the room's current state forbids it.
    State,
}

impl ErrorKind {
    /// HTTP-style wire code for `ERROR` events.
    pub fn code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Authorization => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::State => 409,
        }
    }
}

/// Every way a room command can be refused.
///
/// These are returned to the issuing client only — never broadcast — and
/// never stop the room from processing subsequent commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("maxPlayers must be between {min} and {max}, got {got}")]
    MaxPlayersOutOfRange { got: usize, min: usize, max: usize },

    #[error("malformed room code: {0:?}")]
    MalformedRoomCode(String),

    #[error("no room with code {0}")]
    RoomNotFound(String),

    #[error("room is full")]
    RoomFull,

    #[error("player {0} is already in the room")]
    AlreadyInRoom(PlayerId),

    #[error("player {0} is not in the room")]
    NotInRoom(PlayerId),

    #[error("room is {actual}, expected {expected}")]
    WrongStatus {
        expected: RoomStatus,
        actual: RoomStatus,
    },

    #[error("need at least {min} players to start, have {have}")]
    NotEnoughPlayers { have: usize, min: usize },

    #[error("every other player must be ready before starting")]
    PlayersNotReady,

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("card {0} is not in your hand")]
    CardNotInHand(CardId),

    #[error("no cards left in hand")]
    EmptyHand,

    #[error("only the host may do that")]
    NotHost,

    #[error("the host cannot be kicked")]
    CannotKickHost,
}

impl GameError {
    /// Classifies this error for wire reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::EmptyUsername
            | GameError::MaxPlayersOutOfRange { .. }
            | GameError::MalformedRoomCode(_) => ErrorKind::Validation,
            GameError::NotHost | GameError::CannotKickHost => ErrorKind::Authorization,
            GameError::RoomNotFound(_) => ErrorKind::NotFound,
            GameError::RoomFull
            | GameError::AlreadyInRoom(_)
            | GameError::NotInRoom(_)
            | GameError::WrongStatus { .. }
            | GameError::NotEnoughPlayers { .. }
            | GameError::PlayersNotReady
            | GameError::NotYourTurn
            | GameError::CardNotInHand(_)
            | GameError::EmptyHand => ErrorKind::State,
        }
    }

    /// Wire code shorthand: `self.kind().code()`.
    pub fn code(&self) -> u16 {
        self.kind().code()
    }
}
