//! Room actor: an isolated Tokio task that owns one match.
//!
//! Every command targeting a room flows through its mpsc channel and is
//! handled one at a time, which is the whole concurrency story: there is
//! no lock around `current_turn_index` or `has_played` because nothing
//! else can touch them. The turn clock lives in the same `select!` loop,
//! so "player played" and "timer fired" are mutually exclusive — at most
//! one action per turn, by construction.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use zoka_clock::{TurnClock, TurnDeadline};
use zoka_engine::{GameError, LeaveFollowUp, PlayOutcome, Room};
use zoka_protocol::{CardId, PlayerId, RoomCode, RoomSummary, ServerEvent};

use crate::RoomError;

/// Channel for delivering outbound events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` is the reply channel: results go back to the
/// issuing connection only, never broadcast.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        username: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    SetReady {
        player_id: PlayerId,
        ready: bool,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Start {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Play {
        player_id: PlayerId,
        card_id: CardId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Kick {
        player_id: PlayerId,
        target: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Reset {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Summary {
        reply: oneshot::Sender<RoomSummary>,
    },
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's join code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub async fn join(
        &self,
        player_id: PlayerId,
        username: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        self.ask(|reply| RoomCommand::Join {
            player_id,
            username,
            sender,
            reply,
        })
        .await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.ask(|reply| RoomCommand::Leave { player_id, reply }).await
    }

    pub async fn set_ready(&self, player_id: PlayerId, ready: bool) -> Result<(), RoomError> {
        self.ask(|reply| RoomCommand::SetReady {
            player_id,
            ready,
            reply,
        })
        .await
    }

    pub async fn start(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.ask(|reply| RoomCommand::Start { player_id, reply }).await
    }

    pub async fn play_card(&self, player_id: PlayerId, card_id: CardId) -> Result<(), RoomError> {
        self.ask(|reply| RoomCommand::Play {
            player_id,
            card_id,
            reply,
        })
        .await
    }

    pub async fn kick(&self, player_id: PlayerId, target: PlayerId) -> Result<(), RoomError> {
        self.ask(|reply| RoomCommand::Kick {
            player_id,
            target,
            reply,
        })
        .await
    }

    pub async fn reset(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.ask(|reply| RoomCommand::Reset { player_id, reply }).await
    }

    /// Requests the current lobby summary.
    pub async fn summary(&self) -> Result<RoomSummary, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Summary { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    async fn ask(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<(), GameError>>) -> RoomCommand,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
            .map_err(RoomError::Game)
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
    clock: TurnClock,
    /// Clock generation armed for the current turn; anything older is a
    /// deadline for a turn that has already ended.
    armed_generation: u64,
    /// Tells the registry this room emptied out and should be dropped.
    reaper: mpsc::UnboundedSender<RoomCode>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.room.code(), "room actor started");

        // The creator's first snapshot.
        let room = self.room.snapshot();
        self.broadcast(ServerEvent::RoomUpdated { room });

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd) {
                            break;
                        }
                    }
                    None => break,
                },
                deadline = self.clock.expired() => {
                    self.handle_turn_timeout(deadline);
                }
            }
        }

        tracing::info!(room = %self.room.code(), "room actor stopped");
    }

    /// Handles one command. Returns `true` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player_id,
                username,
                sender,
                reply,
            } => {
                let result = self.room.join(player_id, &username);
                if result.is_ok() {
                    self.senders.insert(player_id, sender);
                    tracing::info!(
                        room = %self.room.code(),
                        %player_id,
                        players = self.room.player_count(),
                        "player joined"
                    );
                    self.broadcast_snapshot();
                }
                let _ = reply.send(result);
            }

            RoomCommand::Leave { player_id, reply } => {
                let result = self.handle_departure(player_id);
                let _ = reply.send(result);
                if self.room.player_count() == 0 {
                    let _ = self.reaper.send(self.room.code().clone());
                    return true;
                }
            }

            RoomCommand::SetReady {
                player_id,
                ready,
                reply,
            } => {
                let result = self.room.set_ready(player_id, ready);
                if result.is_ok() {
                    self.broadcast_snapshot();
                }
                let _ = reply.send(result);
            }

            RoomCommand::Start { player_id, reply } => {
                let result = self.room.start(player_id, &mut rand::rng());
                if result.is_ok() {
                    tracing::info!(
                        room = %self.room.code(),
                        players = self.room.player_count(),
                        "match started"
                    );
                    let room = self.room.snapshot();
                    self.broadcast(ServerEvent::GameStarted { room });
                    self.arm_turn();
                }
                let _ = reply.send(result);
            }

            RoomCommand::Play {
                player_id,
                card_id,
                reply,
            } => {
                let result = self.room.play_card(player_id, card_id);
                match result {
                    Ok(outcome) => {
                        self.apply_play_outcome(outcome);
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomCommand::Kick {
                player_id,
                target,
                reply,
            } => {
                let result = match self.room.kick(player_id, target) {
                    Ok(outcome) => {
                        // The removed player hears only KICKED.
                        if let Some(sender) = self.senders.remove(&target) {
                            let _ = sender.send(ServerEvent::Kicked);
                        }
                        tracing::info!(
                            room = %self.room.code(),
                            %target,
                            "player kicked"
                        );
                        self.broadcast_snapshot();
                        self.apply_leave_follow_up(outcome.follow_up);
                        Ok(())
                    }
                    Err(e) => Err(e),
                };
                let _ = reply.send(result);
            }

            RoomCommand::Reset { player_id, reply } => {
                let result = self.room.reset(player_id);
                if result.is_ok() {
                    tracing::info!(room = %self.room.code(), "room reset to lobby");
                    self.broadcast_snapshot();
                }
                let _ = reply.send(result);
            }

            RoomCommand::Summary { reply } => {
                let _ = reply.send(self.room.summary());
            }

            RoomCommand::Shutdown => {
                tracing::info!(room = %self.room.code(), "room shutting down");
                return true;
            }
        }
        false
    }

    fn handle_departure(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        let outcome = self.room.leave(player_id)?;
        self.senders.remove(&player_id);
        tracing::info!(
            room = %self.room.code(),
            %player_id,
            players = self.room.player_count(),
            "player left"
        );
        if !outcome.room_now_empty {
            self.broadcast_snapshot();
            self.apply_leave_follow_up(outcome.follow_up);
        }
        Ok(())
    }

    fn handle_turn_timeout(&mut self, deadline: TurnDeadline) {
        if deadline.generation != self.armed_generation {
            // A deadline armed for an earlier turn; the turn it guarded
            // already ended.
            return;
        }
        match self.room.play_current_lowest() {
            Ok((player_id, outcome)) => {
                tracing::info!(
                    room = %self.room.code(),
                    %player_id,
                    "turn timed out, lowest card auto-played"
                );
                self.apply_play_outcome(outcome);
            }
            Err(e) => {
                tracing::warn!(
                    room = %self.room.code(),
                    error = %e,
                    "turn timeout with no playable turn"
                );
            }
        }
    }

    /// Post-play bookkeeping shared by explicit plays and timeouts.
    fn apply_play_outcome(&mut self, outcome: PlayOutcome) {
        match outcome {
            PlayOutcome::TurnAdvanced { next } => {
                tracing::debug!(room = %self.room.code(), %next, "turn advanced");
                self.broadcast_snapshot();
                self.arm_turn();
            }
            PlayOutcome::RoundResolved { record, match_over } => {
                tracing::info!(
                    room = %self.room.code(),
                    round = record.round,
                    match_over,
                    "round resolved"
                );
                self.broadcast(ServerEvent::RoundResult { record });
                if match_over {
                    self.clock.disarm();
                    let standings = self.room.standings();
                    let room = self.room.snapshot();
                    self.broadcast(ServerEvent::GameEnded { room, standings });
                } else {
                    let room = self.room.snapshot();
                    self.broadcast(ServerEvent::RoundStarted { room });
                    self.arm_turn();
                }
            }
        }
    }

    fn apply_leave_follow_up(&mut self, follow_up: LeaveFollowUp) {
        match follow_up {
            LeaveFollowUp::None => {}
            LeaveFollowUp::TurnAdvanced { next } => {
                tracing::debug!(
                    room = %self.room.code(),
                    %next,
                    "turn passed after departure"
                );
                self.broadcast_snapshot();
                self.arm_turn();
            }
            LeaveFollowUp::RoundResolved { record, match_over } => {
                self.apply_play_outcome(PlayOutcome::RoundResolved { record, match_over });
            }
            LeaveFollowUp::MatchAborted => {
                tracing::info!(
                    room = %self.room.code(),
                    "match aborted, fewer than two players remain"
                );
                self.clock.disarm();
                let standings = self.room.standings();
                let room = self.room.snapshot();
                self.broadcast(ServerEvent::GameEnded { room, standings });
            }
        }
    }

    fn arm_turn(&mut self) {
        self.armed_generation = self.clock.arm(self.room.turn_timeout());
    }

    fn broadcast_snapshot(&mut self) {
        let room = self.room.snapshot();
        self.broadcast(ServerEvent::RoomUpdated { room });
    }

    /// Fire-and-forget delivery to every member, in production order.
    /// A gone receiver just means that player's connection dropped.
    fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }
}

/// Spawns a room actor for `room` with the host already seated, and
/// returns a handle to it.
pub(crate) fn spawn_room(
    room: Room,
    host_sender: PlayerSender,
    reaper: mpsc::UnboundedSender<RoomCode>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let code = room.code().clone();

    let mut senders = HashMap::new();
    senders.insert(room.host_id(), host_sender);

    let actor = RoomActor {
        room,
        senders,
        receiver: rx,
        clock: TurnClock::new(),
        armed_generation: 0,
        reaper,
    };
    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
