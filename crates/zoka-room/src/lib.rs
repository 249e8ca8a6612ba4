//! Room actors and registry for Zoka.
//!
//! Each room runs as an isolated Tokio task (actor model) owning an
//! engine [`zoka_engine::Room`] and a [`zoka_clock::TurnClock`]. All
//! commands against one room are serialized through its channel;
//! commands against different rooms run fully concurrently.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates, indexes, and lists rooms by code
//! - [`RoomHandle`] — sends commands to a running room actor
//! - [`PlayerSender`] — per-player outbound event channel
//! - [`RoomError`] — routing-level failures wrapping engine errors

mod error;
mod registry;
mod room;

pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{PlayerSender, RoomHandle};
