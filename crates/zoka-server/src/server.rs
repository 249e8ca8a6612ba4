//! `ZokaServer` builder and accept loop.
//!
//! The entry point for running a Zoka gateway. It ties together the
//! layers: transport → protocol → rooms.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, broadcast, mpsc};
use zoka_engine::GameConfig;
use zoka_protocol::{RoomCode, RoomSummary};
use zoka_room::RoomRegistry;

use crate::ServerError;
use crate::handler::handle_connection;

/// Buffered lobby updates per subscriber; laggards skip to the newest.
const LOBBY_CHANNEL_SIZE: usize = 16;

/// Shared gateway state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry sits behind a `Mutex`; room state itself is actor-owned and
/// never locked.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<RoomRegistry>,
    /// Lobby feed: every registry mutation publishes a fresh room list
    /// here, and unseated connections forward it as `ROOM_LIST`.
    pub(crate) lobby: broadcast::Sender<Vec<RoomSummary>>,
    /// Monotonic player id source, one id per accepted connection.
    pub(crate) next_player_id: AtomicU64,
}

impl ServerState {
    /// Publishes the current room list to lobby subscribers.
    pub(crate) async fn refresh_lobby(&self) {
        let summaries = self.registry.lock().await.summaries().await;
        // No subscribers is fine.
        let _ = self.lobby.send(summaries);
    }
}

/// Builder for configuring and starting a Zoka gateway.
///
/// # Example
///
/// ```rust,ignore
/// let server = ZokaServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ZokaServerBuilder {
    bind_addr: String,
    config: GameConfig,
}

impl ZokaServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the game configuration.
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and starts the reaper task.
    pub async fn build(self) -> Result<ZokaServer, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "gateway listening");

        let (registry, reaper_rx) = RoomRegistry::new(self.config);
        let (lobby, _) = broadcast::channel(LOBBY_CHANNEL_SIZE);
        let state = Arc::new(ServerState {
            registry: Mutex::new(registry),
            lobby,
            next_player_id: AtomicU64::new(1),
        });

        tokio::spawn(reap_empty_rooms(Arc::clone(&state), reaper_rx));

        Ok(ZokaServer { listener, state })
    }
}

impl Default for ZokaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains the reaper channel: unregisters rooms whose last player left
/// and republishes the lobby list.
async fn reap_empty_rooms(
    state: Arc<ServerState>,
    mut reaper_rx: mpsc::UnboundedReceiver<RoomCode>,
) {
    while let Some(code) = reaper_rx.recv().await {
        state.registry.lock().await.remove(&code);
        state.refresh_lobby().await;
    }
}

/// A running Zoka gateway.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ZokaServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl ZokaServer {
    /// Creates a new builder.
    pub fn builder() -> ZokaServerBuilder {
        ZokaServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop. Each connection gets its own handler task.
    /// Runs until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("zoka gateway running");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
