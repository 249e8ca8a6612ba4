//! Per-connection handler: WebSocket upgrade, command dispatch, and
//! event forwarding.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Upgrade to WebSocket, assign a fresh `PlayerId`
//!   2. Send `WELCOME`
//!   3. Loop: `select!` over inbound frames, room events, lobby updates
//!   4. On disconnect, leave the current room (soft departure)

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use zoka_engine::GameError;
use zoka_protocol::{ClientCommand, Codec, JsonCodec, PlayerId, ServerEvent};
use zoka_room::{PlayerSender, RoomError, RoomHandle};

use crate::ServerError;
use crate::server::ServerState;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// What the gateway remembers about one connection.
struct ConnState {
    /// Username announced via `SET_IDENTITY` or the last create/join.
    username: Option<String>,
    /// Handle to the room this player currently sits in.
    room: Option<RoomHandle>,
}

impl ConnState {
    /// The name to register under: the given one, or the stored identity
    /// when the command left it blank.
    fn effective_name(&self, given: String) -> String {
        if given.trim().is_empty() {
            self.username.clone().unwrap_or(given)
        } else {
            given
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();
    let codec = JsonCodec;

    let player_id = PlayerId(state.next_player_id.fetch_add(1, Ordering::Relaxed));
    tracing::info!(%player_id, %addr, "client connected");

    // Room actors deliver events for this player here.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut lobby_rx = state.lobby.subscribe();
    let mut conn = ConnState {
        username: None,
        room: None,
    };

    send_event(&mut ws_tx, &codec, &ServerEvent::Welcome { player_id }).await?;

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                let data = match frame {
                    Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                    Some(Ok(Message::Binary(data))) => data.into(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue, // ping/pong/frame
                    Some(Err(e)) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };

                let command: ClientCommand = match codec.decode(&data) {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "undecodable command");
                        let event = ServerEvent::Error {
                            code: 400,
                            message: format!("invalid command: {e}"),
                        };
                        send_event(&mut ws_tx, &codec, &event).await?;
                        continue;
                    }
                };

                match dispatch(&state, player_id, &event_tx, &mut conn, command).await {
                    Ok(Some(reply)) => send_event(&mut ws_tx, &codec, &reply).await?,
                    Ok(None) => {}
                    Err(e) => {
                        let event = ServerEvent::Error {
                            code: e.code(),
                            message: e.to_string(),
                        };
                        send_event(&mut ws_tx, &codec, &event).await?;
                    }
                }
            }

            event = event_rx.recv() => {
                // We hold an `event_tx` clone, so the channel stays open.
                let Some(event) = event else { break };
                match &event {
                    ServerEvent::Kicked => conn.room = None,
                    // A match can finish without any command arriving
                    // (timeout-driven final round), so the lobby listing
                    // is refreshed from here too.
                    ServerEvent::GameEnded { .. } => state.refresh_lobby().await,
                    _ => {}
                }
                send_event(&mut ws_tx, &codec, &event).await?;
            }

            update = lobby_rx.recv() => {
                match update {
                    // Seated players get room snapshots instead.
                    Ok(rooms) if conn.room.is_none() => {
                        let event = ServerEvent::RoomList { rooms };
                        send_event(&mut ws_tx, &codec, &event).await?;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(%player_id, skipped, "lobby feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Disconnection is a soft departure: the player leaves their room
    // like anyone walking out of it.
    if let Some(room) = conn.room.take() {
        if let Err(e) = room.leave(player_id).await {
            tracing::debug!(%player_id, error = %e, "leave on disconnect failed");
        }
        state.refresh_lobby().await;
    }
    tracing::info!(%player_id, "client disconnected");
    Ok(())
}

/// Routes one command. `Ok(Some(_))` is a direct reply to the issuing
/// client; room-scoped events arrive via the player's event channel.
async fn dispatch(
    state: &Arc<ServerState>,
    player_id: PlayerId,
    event_tx: &PlayerSender,
    conn: &mut ConnState,
    command: ClientCommand,
) -> Result<Option<ServerEvent>, RoomError> {
    match command {
        ClientCommand::SetIdentity { username } => {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(RoomError::Game(GameError::EmptyUsername));
            }
            tracing::debug!(%player_id, username, "identity set");
            conn.username = Some(username);
            Ok(None)
        }

        ClientCommand::CreateRoom {
            username,
            max_players,
        } => {
            ensure_unseated(conn, player_id)?;
            let username = conn.effective_name(username);
            let handle = state.registry.lock().await.create_room(
                player_id,
                &username,
                max_players,
                event_tx.clone(),
            )?;
            conn.username = Some(username);
            conn.room = Some(handle);
            state.refresh_lobby().await;
            Ok(None)
        }

        ClientCommand::JoinRoom { username, code } => {
            ensure_unseated(conn, player_id)?;
            let username = conn.effective_name(username);
            let handle = state.registry.lock().await.find(&code)?;
            handle
                .join(player_id, username.clone(), event_tx.clone())
                .await?;
            conn.username = Some(username);
            conn.room = Some(handle);
            state.refresh_lobby().await;
            Ok(None)
        }

        ClientCommand::LeaveRoom => {
            seated(conn, player_id)?.leave(player_id).await?;
            conn.room = None;
            state.refresh_lobby().await;
            Ok(None)
        }

        ClientCommand::SetReady { ready } => {
            seated(conn, player_id)?.set_ready(player_id, ready).await?;
            Ok(None)
        }

        ClientCommand::StartGame => {
            seated(conn, player_id)?.start(player_id).await?;
            state.refresh_lobby().await;
            Ok(None)
        }

        ClientCommand::PlayCard { card_id } => {
            seated(conn, player_id)?.play_card(player_id, card_id).await?;
            Ok(None)
        }

        ClientCommand::KickPlayer { target_id } => {
            seated(conn, player_id)?.kick(player_id, target_id).await?;
            state.refresh_lobby().await;
            Ok(None)
        }

        ClientCommand::ListRooms => {
            let rooms = state.registry.lock().await.summaries().await;
            Ok(Some(ServerEvent::RoomList { rooms }))
        }

        ClientCommand::ResetToLobby => {
            seated(conn, player_id)?.reset(player_id).await?;
            state.refresh_lobby().await;
            Ok(None)
        }
    }
}

/// Room-scoped commands require a seat.
fn seated(conn: &ConnState, player_id: PlayerId) -> Result<RoomHandle, RoomError> {
    conn.room
        .clone()
        .ok_or(RoomError::Game(GameError::NotInRoom(player_id)))
}

/// Creating or joining requires not already sitting in a room.
fn ensure_unseated(conn: &ConnState, player_id: PlayerId) -> Result<(), RoomError> {
    if conn.room.is_some() {
        return Err(RoomError::Game(GameError::AlreadyInRoom(player_id)));
    }
    Ok(())
}

/// Encodes an event and sends it as one text frame.
async fn send_event(
    ws_tx: &mut WsSink,
    codec: &JsonCodec,
    event: &ServerEvent,
) -> Result<(), ServerError> {
    let bytes = codec.encode(event)?;
    // serde_json output is always valid UTF-8.
    let text = String::from_utf8(bytes)
        .map_err(|e| zoka_protocol::ProtocolError::InvalidMessage(e.to_string()))?;
    ws_tx.send(Message::Text(text.into())).await?;
    Ok(())
}
