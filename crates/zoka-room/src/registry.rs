//! Registry of live rooms, indexed by join code.

use std::collections::HashMap;

use rand::Rng;
use tokio::sync::mpsc;
use zoka_engine::{GameConfig, GameError, Room};
use zoka_protocol::{PlayerId, RoomCode, RoomSummary, ROOM_CODE_LEN};

use crate::room::{spawn_room, PlayerSender, RoomHandle};
use crate::RoomError;

/// Characters a join code is drawn from. Uppercase-only keeps codes
/// shoutable over voice chat.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Command channel depth per room actor.
const ROOM_CHANNEL_SIZE: usize = 64;

/// Creates and indexes room actors.
///
/// The registry hands out [`RoomHandle`]s; it never touches room state
/// itself. Emptied rooms report their code on the reaper channel
/// returned by [`RoomRegistry::new`], and whoever drives that channel
/// calls [`RoomRegistry::remove`].
pub struct RoomRegistry {
    config: GameConfig,
    rooms: HashMap<RoomCode, RoomHandle>,
    reaper_tx: mpsc::UnboundedSender<RoomCode>,
}

impl RoomRegistry {
    /// Creates an empty registry. The receiver yields codes of rooms
    /// whose last player left.
    pub fn new(config: GameConfig) -> (Self, mpsc::UnboundedReceiver<RoomCode>) {
        let (reaper_tx, reaper_rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                rooms: HashMap::new(),
                reaper_tx,
            },
            reaper_rx,
        )
    }

    /// Spawns a new room with `host_id` seated as host and returns its
    /// handle. The actor immediately sends the host the first
    /// `ROOM_UPDATED` snapshot.
    pub fn create_room(
        &mut self,
        host_id: PlayerId,
        host_username: &str,
        max_players: usize,
        host_sender: PlayerSender,
    ) -> Result<RoomHandle, RoomError> {
        let code = self.unused_code();
        let room = Room::new(
            code.clone(),
            self.config.clone(),
            host_id,
            host_username,
            max_players,
        )
        .map_err(RoomError::Game)?;

        let handle = spawn_room(room, host_sender, self.reaper_tx.clone(), ROOM_CHANNEL_SIZE);
        tracing::info!(room = %code, rooms = self.rooms.len() + 1, "room created");
        self.rooms.insert(code, handle.clone());
        Ok(handle)
    }

    /// Parses `raw` as a join code and looks the room up.
    pub fn find(&self, raw: &str) -> Result<RoomHandle, RoomError> {
        let code = RoomCode::parse(raw)
            .map_err(|_| RoomError::Game(GameError::MalformedRoomCode(raw.to_string())))?;
        self.rooms
            .get(&code)
            .cloned()
            .ok_or(RoomError::NotFound(code))
    }

    /// Drops a room from the index. The actor task has usually already
    /// exited by the time its code comes off the reaper channel.
    pub fn remove(&mut self, code: &RoomCode) -> Option<RoomHandle> {
        let handle = self.rooms.remove(code);
        if handle.is_some() {
            tracing::info!(room = %code, rooms = self.rooms.len(), "room removed");
        }
        handle
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Collects one summary line per live room, for the lobby list.
    /// Rooms that stop responding mid-collection are skipped; their
    /// codes are already in the reaper queue.
    pub async fn summaries(&self) -> Vec<RoomSummary> {
        let mut out = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(summary) = handle.summary().await {
                out.push(summary);
            }
        }
        out.sort_by(|a, b| a.code.as_str().cmp(b.code.as_str()));
        out
    }

    /// Generates a join code not currently in use.
    fn unused_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let raw: String = (0..ROOM_CODE_LEN)
                .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
                .collect();
            // parse() cannot fail on charset output; re-check anyway so
            // a charset edit can't silently mint bad codes.
            if let Ok(code) = RoomCode::parse(&raw) {
                if !self.rooms.contains_key(&code) {
                    return code;
                }
            }
        }
    }
}
