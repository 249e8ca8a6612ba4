//! Cancellable turn deadline for Zoka room actors.
//!
//! A [`TurnClock`] holds at most one pending deadline. It is designed to
//! sit inside a room actor's `tokio::select!` loop next to the command
//! channel, which is what makes a play and a timeout mutually exclusive:
//! both are handled by the same serialized loop, and whichever branch
//! wins disarms the other.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* a play disarms the clock */ }
//!         turn = clock.expired() => { /* auto-play turn.generation */ }
//!     }
//! }
//! ```
//!
//! # Disarmed mode
//!
//! When no deadline is armed, [`TurnClock::expired`] pends forever, the
//! same way an event-driven loop with no timer behaves. `select!` keeps
//! servicing the other branches.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::trace;

/// Identifies which armed deadline fired.
///
/// Every [`TurnClock::arm`] bumps the generation. The actor records the
/// generation it armed for the current turn; a fired deadline carrying an
/// older generation belongs to a turn that has already ended and must be
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnDeadline {
    /// Generation of the `arm` call that scheduled this deadline.
    pub generation: u64,
}

/// A single cancellable deadline, one per room.
#[derive(Debug)]
pub struct TurnClock {
    deadline: Option<Instant>,
    generation: u64,
}

impl TurnClock {
    /// Creates a disarmed clock.
    pub fn new() -> Self {
        Self {
            deadline: None,
            generation: 0,
        }
    }

    /// Arms the clock `timeout` from now, replacing any pending deadline.
    ///
    /// Returns the generation the caller should expect back from
    /// [`expired`](Self::expired).
    pub fn arm(&mut self, timeout: Duration) -> u64 {
        self.generation += 1;
        self.deadline = Some(Instant::now() + timeout);
        trace!(generation = self.generation, ?timeout, "turn clock armed");
        self.generation
    }

    /// Cancels the pending deadline, if any.
    pub fn disarm(&mut self) {
        if self.deadline.take().is_some() {
            trace!(generation = self.generation, "turn clock disarmed");
        }
    }

    /// Whether a deadline is currently pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending deadline, if armed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Current arm generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the armed deadline; pends forever while disarmed.
    ///
    /// Cancel-safe: if another `select!` branch wins, the deadline stays
    /// armed and the next call picks it up again. On expiry the clock
    /// disarms itself before returning.
    pub async fn expired(&mut self) -> TurnDeadline {
        match self.deadline {
            Some(deadline) => {
                time::sleep_until(deadline).await;
                self.deadline = None;
                trace!(generation = self.generation, "turn clock fired");
                TurnDeadline {
                    generation: self.generation,
                }
            }
            None => {
                // Never resolves; select! handles the other branches.
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

impl Default for TurnClock {
    fn default() -> Self {
        Self::new()
    }
}
