//! The serializable game model.
//!
//! Everything here travels on the wire inside [`crate::ServerEvent`]
//! payloads, so the serde attributes are part of the protocol contract:
//! struct fields are `camelCase`, enum tags are the variant names as
//! written. Changing either breaks the client.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Newtype over `u64` so a player id can never be confused with a card id.
/// `#[serde(transparent)]` serializes it as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a card, allocated per room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Length of a room code in characters.
pub const ROOM_CODE_LEN: usize = 6;

/// A room's 6-character join code: uppercase ASCII letters and digits.
///
/// Validated on construction; the only ways to obtain one are
/// [`RoomCode::parse`] and deserialization (which goes through the same
/// check via `try_from`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Parses and validates a room code.
    ///
    /// Lowercase input is accepted and uppercased, since codes are typed
    /// by hand.
    pub fn parse(raw: &str) -> Result<Self, crate::ProtocolError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != ROOM_CODE_LEN
            || !code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(crate::ProtocolError::InvalidRoomCode(raw.to_string()));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = crate::ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Elements and cards
// ---------------------------------------------------------------------------

/// The six elements, arranged in one directed counter cycle.
///
/// `A.beats() == B` means a card of element A counters a card of element B.
/// Every element beats exactly one other and is beaten by exactly one
/// other: Fire→Ice→Wind→Earth→Electric→Water→Fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Ice,
    Wind,
    Earth,
    Electric,
    Water,
}

impl Element {
    /// All elements, in cycle order.
    pub const ALL: [Element; 6] = [
        Element::Fire,
        Element::Ice,
        Element::Wind,
        Element::Earth,
        Element::Electric,
        Element::Water,
    ];

    /// The element this one counters.
    pub fn beats(self) -> Element {
        match self {
            Element::Fire => Element::Ice,
            Element::Ice => Element::Wind,
            Element::Wind => Element::Earth,
            Element::Earth => Element::Electric,
            Element::Electric => Element::Water,
            Element::Water => Element::Fire,
        }
    }

    /// The element this one is countered by.
    pub fn beaten_by(self) -> Element {
        match self {
            Element::Ice => Element::Fire,
            Element::Wind => Element::Ice,
            Element::Earth => Element::Wind,
            Element::Electric => Element::Earth,
            Element::Water => Element::Electric,
            Element::Fire => Element::Water,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Element::Fire => "Fire",
            Element::Ice => "Ice",
            Element::Wind => "Wind",
            Element::Earth => "Earth",
            Element::Electric => "Electric",
            Element::Water => "Water",
        };
        f.write_str(name)
    }
}

/// A single playable card. Immutable once dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub element: Element,
    /// Star value, always ≥ 1.
    pub stars: u32,
}

// ---------------------------------------------------------------------------
// Players and rooms
// ---------------------------------------------------------------------------

/// A player inside a room, including their full hand.
///
/// The room snapshot is broadcast whole to every member; hiding other
/// players' hands is a client concern, not a protocol one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub hand: Vec<Card>,
    /// Star total; starts each match at 55 and never drops below 0.
    pub stars: i64,
    pub ready: bool,
    pub played_card: Option<Card>,
    pub has_played: bool,
}

/// Room lifecycle status.
///
/// Transitions: WAITING → PLAYING → FINISHED, and FINISHED → WAITING only
/// via the host's explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(self) -> bool {
        matches!(self, RoomStatus::Waiting)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Waiting => write!(f, "WAITING"),
            RoomStatus::Playing => write!(f, "PLAYING"),
            RoomStatus::Finished => write!(f, "FINISHED"),
        }
    }
}

/// A full room snapshot, broadcast to members after every mutation.
///
/// `version` increases monotonically so subscribers can discard stale
/// snapshots delivered out of order by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub max_players: usize,
    pub status: RoomStatus,
    /// Players in join order. The first entry migrated to host when the
    /// previous host left.
    pub players: Vec<Player>,
    pub host_id: PlayerId,
    /// Current round, 1-based. Meaningful only while PLAYING or FINISHED.
    pub round: u32,
    pub turn_order: Vec<PlayerId>,
    pub current_turn_index: usize,
    pub history: Vec<RoundRecord>,
    pub version: u64,
}

/// A one-line room summary for lobby browsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub player_count: usize,
    pub max_players: usize,
}

// ---------------------------------------------------------------------------
// Round history
// ---------------------------------------------------------------------------

/// One player's line in a resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub player_id: PlayerId,
    pub card_element: Element,
    pub card_stars: u32,
    /// Signed star delta this round.
    pub change: i64,
    /// Star total after applying `change`, clamped at zero.
    pub new_total: i64,
}

/// The outcome of one fully played round, in turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round: u32,
    pub results: Vec<RoundResult>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_card_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&CardId(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_room_code_parse_accepts_valid() {
        let code = RoomCode::parse("A1B2C3").unwrap();
        assert_eq!(code.as_str(), "A1B2C3");
    }

    #[test]
    fn test_room_code_parse_uppercases() {
        let code = RoomCode::parse("abc123").unwrap();
        assert_eq!(code.as_str(), "ABC123");
    }

    #[test]
    fn test_room_code_parse_rejects_wrong_length() {
        assert!(RoomCode::parse("ABC12").is_err());
        assert!(RoomCode::parse("ABC1234").is_err());
        assert!(RoomCode::parse("").is_err());
    }

    #[test]
    fn test_room_code_parse_rejects_symbols() {
        assert!(RoomCode::parse("AB-12!").is_err());
        assert!(RoomCode::parse("ÄBC123").is_err());
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let code = RoomCode::parse("ZOKA42").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"ZOKA42\"");
    }

    #[test]
    fn test_room_code_deserialization_validates() {
        let ok: Result<RoomCode, _> = serde_json::from_str("\"QWERTY\"");
        assert!(ok.is_ok());
        let bad: Result<RoomCode, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_element_cycle_is_one_loop() {
        // Following beats() from any element must visit all six and
        // return to the start.
        let mut seen = vec![Element::Fire];
        let mut cur = Element::Fire;
        for _ in 0..5 {
            cur = cur.beats();
            assert!(!seen.contains(&cur));
            seen.push(cur);
        }
        assert_eq!(cur.beats(), Element::Fire);
    }

    #[test]
    fn test_element_beaten_by_is_inverse_of_beats() {
        for el in Element::ALL {
            assert_eq!(el.beats().beaten_by(), el);
            assert_eq!(el.beaten_by().beats(), el);
        }
    }

    #[test]
    fn test_element_serializes_as_name() {
        let json = serde_json::to_string(&Element::Electric).unwrap();
        assert_eq!(json, "\"Electric\"");
    }

    #[test]
    fn test_room_status_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&RoomStatus::Waiting).unwrap(),
            "\"WAITING\""
        );
        assert_eq!(
            serde_json::to_string(&RoomStatus::Playing).unwrap(),
            "\"PLAYING\""
        );
    }

    #[test]
    fn test_player_uses_camel_case_fields() {
        let player = Player {
            id: PlayerId(1),
            username: "kai".into(),
            hand: vec![],
            stars: 55,
            ready: false,
            played_card: None,
            has_played: false,
        };
        let json: serde_json::Value = serde_json::to_value(&player).unwrap();
        assert!(json.get("playedCard").is_some());
        assert!(json.get("hasPlayed").is_some());
        assert!(json.get("has_played").is_none());
    }

    #[test]
    fn test_round_record_round_trip() {
        let record = RoundRecord {
            round: 3,
            results: vec![RoundResult {
                player_id: PlayerId(9),
                card_element: Element::Water,
                card_stars: 4,
                change: -4,
                new_total: 51,
            }],
        };
        let bytes = serde_json::to_vec(&record).unwrap();
        let decoded: RoundRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_room_snapshot_round_trip() {
        let snapshot = RoomSnapshot {
            code: RoomCode::parse("AAAAAA").unwrap(),
            max_players: 8,
            status: RoomStatus::Waiting,
            players: vec![],
            host_id: PlayerId(1),
            round: 1,
            turn_order: vec![PlayerId(1)],
            current_turn_index: 0,
            history: vec![],
            version: 12,
        };
        let bytes = serde_json::to_vec(&snapshot).unwrap();
        let decoded: RoomSnapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot, decoded);
    }
}
