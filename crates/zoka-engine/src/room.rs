//! The room aggregate: membership, lifecycle state machine, and turn
//! bookkeeping.
//!
//! A [`Room`] is driven exclusively through its command methods; the
//! actor layer serializes calls, so none of this needs interior
//! mutability. Methods either mutate and report what happened, or refuse
//! with a [`GameError`] and leave the room untouched.

use rand::Rng;

use zoka_protocol::{
    Card, CardId, Player, PlayerId, RoomCode, RoomSnapshot, RoomStatus, RoomSummary, RoundRecord,
    RoundResult,
};

use crate::{GameConfig, GameError, HandDealer, Play, resolve_round};

/// What a successful play (explicit or auto) led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The turn moved on; the clock should be re-armed for `next`.
    TurnAdvanced { next: PlayerId },
    /// Everyone had played: the round resolved. When `match_over` the
    /// room is now FINISHED, otherwise a fresh round just began.
    RoundResolved {
        record: RoundRecord,
        match_over: bool,
    },
}

/// Turn-scheduling consequence of a departure mid-match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveFollowUp {
    /// Nothing turn-related changed.
    None,
    /// The departing player held the turn; it passed to `next`.
    TurnAdvanced { next: PlayerId },
    /// The departure completed the round.
    RoundResolved {
        record: RoundRecord,
        match_over: bool,
    },
    /// Fewer than two players remain mid-match; the room is FINISHED.
    MatchAborted,
}

/// Everything the actor needs to react to a leave or kick.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub removed: Player,
    /// Set when host duty migrated to the earliest-joined survivor.
    pub new_host: Option<PlayerId>,
    pub room_now_empty: bool,
    pub follow_up: LeaveFollowUp,
}

/// An isolated match instance identified by its join code.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    config: GameConfig,
    dealer: HandDealer,
    max_players: usize,
    status: RoomStatus,
    /// Join order; index 0 is always the current host's seat after
    /// migration.
    players: Vec<Player>,
    host_id: PlayerId,
    round: u32,
    turn_order: Vec<PlayerId>,
    current_turn_index: usize,
    history: Vec<RoundRecord>,
    version: u64,
    next_card_id: u64,
}

impl Room {
    /// Creates a WAITING room with the creator as host and sole member.
    pub fn new(
        code: RoomCode,
        config: GameConfig,
        host_id: PlayerId,
        host_username: &str,
        max_players: usize,
    ) -> Result<Self, GameError> {
        if !config.max_players_range.contains(&max_players) {
            return Err(GameError::MaxPlayersOutOfRange {
                got: max_players,
                min: *config.max_players_range.start(),
                max: *config.max_players_range.end(),
            });
        }
        let host = new_player(host_id, host_username)?;
        let dealer = HandDealer::new(&config);
        Ok(Self {
            code,
            config,
            dealer,
            max_players,
            status: RoomStatus::Waiting,
            players: vec![host],
            host_id,
            round: 1,
            turn_order: Vec::new(),
            current_turn_index: 0,
            history: Vec::new(),
            version: 0,
            next_card_id: 0,
        })
    }

    // -- accessors ---------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn host_id(&self) -> PlayerId {
        self.host_id
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn turn_timeout(&self) -> std::time::Duration {
        self.config.turn_timeout
    }

    /// The player whose turn it is, while PLAYING.
    pub fn current_player(&self) -> Option<PlayerId> {
        if self.status != RoomStatus::Playing {
            return None;
        }
        self.turn_order.get(self.current_turn_index).copied()
    }

    /// Standings by star total, descending; ties keep join order.
    pub fn standings(&self) -> Vec<PlayerId> {
        let mut order: Vec<usize> = (0..self.players.len()).collect();
        order.sort_by_key(|&i| (std::cmp::Reverse(self.players[i].stars), i));
        order.into_iter().map(|i| self.players[i].id).collect()
    }

    /// Lobby summary line.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            code: self.code.clone(),
            status: self.status,
            player_count: self.players.len(),
            max_players: self.max_players,
        }
    }

    /// Full snapshot for broadcasting. Bumps the version counter so
    /// subscribers can discard stale copies.
    pub fn snapshot(&mut self) -> RoomSnapshot {
        self.version += 1;
        RoomSnapshot {
            code: self.code.clone(),
            max_players: self.max_players,
            status: self.status,
            players: self.players.clone(),
            host_id: self.host_id,
            round: self.round,
            turn_order: self.turn_order.clone(),
            current_turn_index: self.current_turn_index,
            history: self.history.clone(),
            version: self.version,
        }
    }

    // -- lobby commands ----------------------------------------------------

    /// Adds a player. WAITING rooms only, and only while there is space.
    pub fn join(&mut self, id: PlayerId, username: &str) -> Result<(), GameError> {
        self.expect_status(RoomStatus::Waiting)?;
        if self.contains(id) {
            return Err(GameError::AlreadyInRoom(id));
        }
        if self.players.len() >= self.max_players {
            return Err(GameError::RoomFull);
        }
        self.players.push(new_player(id, username)?);
        Ok(())
    }

    /// Toggles readiness while WAITING. The host may toggle too, but the
    /// start gate never looks at the host's flag.
    pub fn set_ready(&mut self, id: PlayerId, ready: bool) -> Result<(), GameError> {
        self.expect_status(RoomStatus::Waiting)?;
        self.player_mut(id)?.ready = ready;
        Ok(())
    }

    /// Starts the match: deals hands, fixes the turn order, resets stars.
    ///
    /// Host only; requires the minimum player count and every non-host
    /// player ready.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        caller: PlayerId,
        rng: &mut R,
    ) -> Result<(), GameError> {
        self.expect_host(caller)?;
        self.expect_status(RoomStatus::Waiting)?;
        if self.players.len() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                have: self.players.len(),
                min: self.config.min_players,
            });
        }
        if self
            .players
            .iter()
            .any(|p| p.id != self.host_id && !p.ready)
        {
            return Err(GameError::PlayersNotReady);
        }

        for player in &mut self.players {
            player.hand = self.dealer.deal(rng, &mut self.next_card_id);
            player.stars = self.config.starting_stars;
            player.played_card = None;
            player.has_played = false;
        }
        self.turn_order = self.players.iter().map(|p| p.id).collect();
        self.round = 1;
        self.current_turn_index = 0;
        self.history.clear();
        self.status = RoomStatus::Playing;
        Ok(())
    }

    /// Returns a FINISHED room to the lobby, keeping membership.
    pub fn reset(&mut self, caller: PlayerId) -> Result<(), GameError> {
        self.expect_host(caller)?;
        self.expect_status(RoomStatus::Finished)?;
        for player in &mut self.players {
            player.hand.clear();
            player.played_card = None;
            player.has_played = false;
            player.ready = false;
        }
        self.turn_order.clear();
        self.current_turn_index = 0;
        self.round = 1;
        self.history.clear();
        self.status = RoomStatus::Waiting;
        Ok(())
    }

    // -- turn commands -----------------------------------------------------

    /// Plays `card_id` for `caller`. Only valid on the caller's turn with
    /// a card from their own hand.
    pub fn play_card(
        &mut self,
        caller: PlayerId,
        card_id: CardId,
    ) -> Result<PlayOutcome, GameError> {
        self.expect_status(RoomStatus::Playing)?;
        if self.current_player() != Some(caller) {
            return Err(GameError::NotYourTurn);
        }
        let player = self.player_mut(caller)?;
        let pos = player
            .hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(GameError::CardNotInHand(card_id))?;
        let card = player.hand.remove(pos);
        Ok(self.commit_play(caller, card))
    }

    /// Timeout fallback: plays the active player's lowest-stars card,
    /// ties broken by original deal order. Identical to an explicit play
    /// afterwards.
    pub fn play_current_lowest(&mut self) -> Result<(PlayerId, PlayOutcome), GameError> {
        self.expect_status(RoomStatus::Playing)?;
        let current = self.current_player().ok_or(GameError::EmptyHand)?;
        let player = self.player_mut(current)?;
        let pos = player
            .hand
            .iter()
            .enumerate()
            .min_by_key(|(i, c)| (c.stars, *i))
            .map(|(i, _)| i)
            .ok_or(GameError::EmptyHand)?;
        let card = player.hand.remove(pos);
        let outcome = self.commit_play(current, card);
        Ok((current, outcome))
    }

    fn commit_play(&mut self, player_id: PlayerId, card: Card) -> PlayOutcome {
        if let Ok(player) = self.player_mut(player_id) {
            player.played_card = Some(card);
            player.has_played = true;
        }
        match self.seek_unplayed_from(self.current_turn_index + 1) {
            Some(next_index) => {
                self.current_turn_index = next_index;
                PlayOutcome::TurnAdvanced {
                    next: self.turn_order[next_index],
                }
            }
            None => self.resolve_current_round(),
        }
    }

    /// First turn-order index at or after `start` (wrapping) whose player
    /// has not played. `None` when the round is complete.
    fn seek_unplayed_from(&self, start: usize) -> Option<usize> {
        let n = self.turn_order.len();
        (0..n).map(|offset| (start + offset) % n).find(|&i| {
            self.players
                .iter()
                .find(|p| p.id == self.turn_order[i])
                .is_some_and(|p| !p.has_played)
        })
    }

    fn resolve_current_round(&mut self) -> PlayOutcome {
        let plays: Vec<Play> = self
            .turn_order
            .iter()
            .filter_map(|&id| {
                let player = self.players.iter().find(|p| p.id == id)?;
                let card = player.played_card?;
                Some(Play {
                    player: id,
                    element: card.element,
                    stars: card.stars,
                })
            })
            .collect();
        debug_assert_eq!(plays.len(), self.turn_order.len());

        let changes = resolve_round(&plays);
        let mut results = Vec::with_capacity(plays.len());
        for (play, change) in plays.iter().zip(changes) {
            if let Ok(player) = self.player_mut(play.player) {
                // Star floor: clamp at zero, no elimination.
                let new_total = (player.stars + change).max(0);
                player.stars = new_total;
                player.played_card = None;
                player.has_played = false;
                results.push(RoundResult {
                    player_id: play.player,
                    card_element: play.element,
                    card_stars: play.stars,
                    change,
                    new_total,
                });
            }
        }

        let record = RoundRecord {
            round: self.round,
            results,
        };
        self.history.push(record.clone());

        let match_over = self.round >= self.config.rounds;
        if match_over {
            self.status = RoomStatus::Finished;
        } else {
            self.round += 1;
            self.current_turn_index = 0;
        }
        PlayOutcome::RoundResolved { record, match_over }
    }

    // -- membership commands -----------------------------------------------

    /// Removes `id` voluntarily. Valid in any state.
    pub fn leave(&mut self, id: PlayerId) -> Result<LeaveOutcome, GameError> {
        self.remove_player(id)
    }

    /// Host removes `target`. The host cannot kick themselves.
    pub fn kick(&mut self, caller: PlayerId, target: PlayerId) -> Result<LeaveOutcome, GameError> {
        self.expect_host(caller)?;
        if target == self.host_id {
            return Err(GameError::CannotKickHost);
        }
        if !self.contains(target) {
            return Err(GameError::NotInRoom(target));
        }
        self.remove_player(target)
    }

    fn remove_player(&mut self, id: PlayerId) -> Result<LeaveOutcome, GameError> {
        let seat = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::NotInRoom(id))?;
        let removed = self.players.remove(seat);

        let mut new_host = None;
        if removed.id == self.host_id {
            if let Some(first) = self.players.first() {
                self.host_id = first.id;
                new_host = Some(first.id);
            }
        }

        let room_now_empty = self.players.is_empty();
        let follow_up = if self.status == RoomStatus::Playing && !room_now_empty {
            self.drop_from_turn_order(removed.id)
        } else {
            LeaveFollowUp::None
        };

        Ok(LeaveOutcome {
            removed,
            new_host,
            room_now_empty,
            follow_up,
        })
    }

    /// Departure policy mid-match: the player vanishes from the turn
    /// order (permanently "already played"), the turn passes if they held
    /// it, and the match ends early below two players.
    fn drop_from_turn_order(&mut self, id: PlayerId) -> LeaveFollowUp {
        let Some(order_index) = self.turn_order.iter().position(|&p| p == id) else {
            return LeaveFollowUp::None;
        };
        let held_turn = order_index == self.current_turn_index;
        self.turn_order.remove(order_index);

        if self.turn_order.len() < 2 {
            self.status = RoomStatus::Finished;
            return LeaveFollowUp::MatchAborted;
        }

        if order_index < self.current_turn_index {
            self.current_turn_index -= 1;
        }
        if self.current_turn_index >= self.turn_order.len() {
            self.current_turn_index = 0;
        }

        match self.seek_unplayed_from(self.current_turn_index) {
            None => {
                // The departing player was the last holdout.
                match self.resolve_current_round() {
                    PlayOutcome::RoundResolved { record, match_over } => {
                        LeaveFollowUp::RoundResolved { record, match_over }
                    }
                    PlayOutcome::TurnAdvanced { .. } => LeaveFollowUp::None,
                }
            }
            Some(next_index) => {
                self.current_turn_index = next_index;
                if held_turn {
                    LeaveFollowUp::TurnAdvanced {
                        next: self.turn_order[next_index],
                    }
                } else {
                    LeaveFollowUp::None
                }
            }
        }
    }

    // -- helpers -----------------------------------------------------------

    fn expect_status(&self, expected: RoomStatus) -> Result<(), GameError> {
        if self.status != expected {
            return Err(GameError::WrongStatus {
                expected,
                actual: self.status,
            });
        }
        Ok(())
    }

    fn expect_host(&self, caller: PlayerId) -> Result<(), GameError> {
        if caller != self.host_id {
            return Err(GameError::NotHost);
        }
        Ok(())
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::NotInRoom(id))
    }
}

fn new_player(id: PlayerId, username: &str) -> Result<Player, GameError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(GameError::EmptyUsername);
    }
    Ok(Player {
        id,
        username: username.to_string(),
        hand: Vec::new(),
        stars: 0,
        ready: false,
        played_card: None,
        has_played: false,
    })
}
