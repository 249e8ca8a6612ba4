//! Unified error type for the gateway.

use zoka_protocol::ProtocolError;
use zoka_room::RoomError;

/// Top-level error that wraps the layer-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts lower-layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Socket-level failure (bind, accept).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WebSocket handshake or frame failure.
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Encode or decode failure on the wire.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Command refused by the room layer.
    #[error(transparent)]
    Room(#[from] RoomError),
}
