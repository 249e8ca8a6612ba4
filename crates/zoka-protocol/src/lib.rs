//! Wire protocol for the Zoka card-battle server.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`Element`], [`Card`], [`Player`], [`RoomSnapshot`], ...) —
//!   the full serializable game model that travels on the wire.
//! - **Commands** ([`ClientCommand`]) — the closed tagged union of
//!   everything a client may ask for.
//! - **Events** ([`ServerEvent`]) — everything the server pushes back.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become bytes.
//!
//! The protocol layer knows nothing about connections, actors, or game
//! rules — it only describes shapes. Field names are `camelCase` and
//! command/event tags are `SCREAMING_SNAKE_CASE` to match the existing
//! browser client.

mod codec;
mod command;
mod error;
mod event;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::ClientCommand;
pub use error::ProtocolError;
pub use event::ServerEvent;
pub use types::{
    Card, CardId, Element, Player, PlayerId, RoomCode, RoomSnapshot,
    RoomStatus, RoomSummary, RoundRecord, RoundResult, ROOM_CODE_LEN,
};
