//! The Zoka gateway: WebSocket transport in front of the room layer.
//!
//! This crate owns everything network-facing: accepting connections,
//! assigning player ids, decoding [`zoka_protocol::ClientCommand`]s,
//! routing them to room actors, and forwarding [`zoka_protocol::ServerEvent`]s
//! back out. Game rules live in `zoka-engine`; room lifecycles live in
//! `zoka-room`; nothing here inspects a hand or a star total.

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{ZokaServer, ZokaServerBuilder};
