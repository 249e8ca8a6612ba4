//! Pure game core for Zoka.
//!
//! Everything in this crate is synchronous and side-effect free: no I/O,
//! no clocks, no channels. The room actor in `zoka-room` owns a [`Room`]
//! and drives it through its command methods; timers and broadcasting
//! live out there.
//!
//! # Key types
//!
//! - [`Room`] — the aggregate: membership, lifecycle state machine, and
//!   turn bookkeeping
//! - [`resolve_round`] — the element-counter scoring algorithm
//! - [`HandDealer`] — deals each player one card per round at match start
//! - [`GameConfig`] — fixed parameters and tuning knobs
//! - [`GameError`] — every way a command can be refused

mod config;
mod dealer;
mod error;
mod resolver;
mod room;

pub use config::GameConfig;
pub use dealer::HandDealer;
pub use error::{ErrorKind, GameError};
pub use resolver::{Play, resolve_round};
pub use room::{LeaveFollowUp, LeaveOutcome, PlayOutcome, Room};
