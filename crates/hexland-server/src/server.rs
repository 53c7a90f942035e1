//! WebSocket server and connection handling.
//!
//! The server is a relay with a gatekeeper: it owns rooms, validates that
//! a game action comes from the seat whose turn it is, mirrors the turn
//! state, and rebroadcasts the action verbatim. Dice are the one thing it
//! resolves itself, so every client sees the same result.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::{Room, RoomState};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How often idle connections are pinged; a connection that misses a
/// whole interval without ponging is dropped.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Server state shared across all connections.
pub struct ServerState {
    /// All active rooms, keyed by join code
    pub rooms: DashMap<String, Room>,
    /// Mapping from connection ID to its room code
    pub conn_rooms: DashMap<Uuid, String>,
    /// Mapping from connection ID to its message sender
    pub senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            conn_rooms: DashMap::new(),
            senders: DashMap::new(),
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, conn: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to everyone seated in a room.
    pub fn broadcast_to_room(&self, code: &str, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(code) {
            for seat in room.seats.iter().flatten() {
                self.send_to(seat.conn, msg.clone());
            }
        }
    }

    /// Broadcast a message to a room, skipping one connection.
    pub fn broadcast_to_room_except(&self, code: &str, except: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(code) {
            for seat in room.seats.iter().flatten() {
                if seat.conn != except {
                    self.send_to(seat.conn, msg.clone());
                }
            }
        }
    }

    /// Generate a room code not currently in use.
    fn unused_code(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code = Room::generate_code(&mut rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Hexland server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let conn = Uuid::new_v4();

    // Channel for outgoing messages; a dedicated task drains it into the
    // socket so broadcast paths never block on a slow client.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.senders.insert(conn, tx);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Application-level liveness: ping every interval, drop the
    // connection if the previous ping went unanswered.
    let mut ping_timer = tokio::time::interval(PING_INTERVAL);
    ping_timer.tick().await; // First tick fires immediately
    let mut alive = true;

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Pong) => alive = true,
                            Ok(client_msg) => handle_message(conn, client_msg, &state),
                            Err(e) => debug!("Invalid message from {}: {}", conn, e),
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} closing connection", conn);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", conn, e);
                        break;
                    }
                    None => break,
                }
            }
            _ = ping_timer.tick() => {
                if !alive {
                    warn!("Client {} timed out", conn);
                    break;
                }
                alive = false;
                state.send_to(conn, ServerMessage::Ping);
            }
        }
    }

    // Clean up on disconnect
    handle_disconnect(conn, &state);
    state.senders.remove(&conn);
    send_task.abort();

    info!("Connection closed for {}", conn);
    Ok(())
}

/// Handle a client message.
fn handle_message(conn: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateRoom {
            name,
            max_players,
            map_radius,
        } => {
            if state.conn_rooms.contains_key(&conn) {
                state.send_to(
                    conn,
                    ServerMessage::Error {
                        message: "Already in a room".to_string(),
                    },
                );
                return;
            }

            let code = state.unused_code();
            let name = if name.is_empty() { "Host".to_string() } else { name };
            let room = Room::new(
                code.clone(),
                conn,
                name,
                max_players.unwrap_or(4),
                map_radius.unwrap_or(2),
            );
            let roster = room.roster();

            state.rooms.insert(code.clone(), room);
            state.conn_rooms.insert(conn, code.clone());

            info!("Room {} created by {}", code, conn);
            state.send_to(
                conn,
                ServerMessage::RoomCreated {
                    code,
                    player_index: 0,
                },
            );
            state.send_to(conn, ServerMessage::PlayerList { players: roster });
        }

        ClientMessage::JoinRoom { code, name } => {
            if state.conn_rooms.contains_key(&conn) {
                state.send_to(
                    conn,
                    ServerMessage::Error {
                        message: "Already in a room".to_string(),
                    },
                );
                return;
            }

            let code = code.to_uppercase();
            let Some(mut room) = state.rooms.get_mut(&code) else {
                state.send_to(
                    conn,
                    ServerMessage::Error {
                        message: "Room not found".to_string(),
                    },
                );
                return;
            };

            let name = if name.is_empty() { "Player".to_string() } else { name };
            match room.join(conn, name) {
                Ok(seat) => {
                    info!("Client {} joined room {} at seat {}", conn, room.code, seat);
                    let roster = room.roster();
                    drop(room); // Release lock before broadcasting
                    state.conn_rooms.insert(conn, code.clone());

                    state.send_to(
                        conn,
                        ServerMessage::RoomJoined {
                            code: code.clone(),
                            player_index: seat,
                        },
                    );
                    state.broadcast_to_room(&code, ServerMessage::PlayerList { players: roster });
                }
                Err(e) => {
                    state.send_to(
                        conn,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }

        ClientMessage::PlayerReady { ready } => {
            if let Some(code) = state.conn_rooms.get(&conn).map(|c| c.value().clone()) {
                if let Some(mut room) = state.rooms.get_mut(&code) {
                    if room.state != RoomState::Lobby {
                        return;
                    }
                    room.set_ready(conn, ready);
                    let roster = room.roster();
                    drop(room);
                    state.broadcast_to_room(&code, ServerMessage::PlayerList { players: roster });
                }
            }
        }

        ClientMessage::StartGame => {
            if let Some(code) = state.conn_rooms.get(&conn).map(|c| c.value().clone()) {
                if let Some(mut room) = state.rooms.get_mut(&code) {
                    let mut rng = rand::thread_rng();
                    match room.start(conn, &mut rng) {
                        Ok(seed) => {
                            info!("Room {} starting with seed {}", room.code, seed);
                            let players = room.roster();
                            let map_radius = room.map_radius;
                            drop(room);

                            state.broadcast_to_room(
                                &code,
                                ServerMessage::GameStart {
                                    seed,
                                    players,
                                    map_radius,
                                },
                            );
                        }
                        Err(e) => {
                            state.send_to(
                                conn,
                                ServerMessage::Error {
                                    message: e.to_string(),
                                },
                            );
                        }
                    }
                }
            }
        }

        ClientMessage::GameAction { action, data } => {
            if let Some(code) = state.conn_rooms.get(&conn).map(|c| c.value().clone()) {
                if let Some(mut room) = state.rooms.get_mut(&code) {
                    if room.state != RoomState::Playing {
                        return;
                    }

                    let seat = match room.validate_turn(conn) {
                        Ok(seat) => seat,
                        Err(reason) => {
                            drop(room);
                            state.send_to(
                                conn,
                                ServerMessage::ActionRejected {
                                    action,
                                    reason: reason.message().to_string(),
                                },
                            );
                            return;
                        }
                    };

                    if action == "roll_dice" {
                        // Dice are resolved here so every client agrees.
                        let mut rng = rand::thread_rng();
                        let d1: u8 = rng.gen_range(1..=6);
                        let d2: u8 = rng.gen_range(1..=6);
                        room.record_roll(d1 + d2);
                        drop(room);

                        let mut result = serde_json::Map::new();
                        result.insert("d1".to_string(), d1.into());
                        result.insert("d2".to_string(), d2.into());
                        state.broadcast_to_room(
                            &code,
                            ServerMessage::GameAction {
                                action: "dice_result".to_string(),
                                player_index: seat,
                                data: result,
                            },
                        );
                    } else {
                        let card_type = data.get("cardType").and_then(|v| v.as_str());
                        room.apply_action_mirror(&action, card_type);
                        drop(room);

                        state.broadcast_to_room(
                            &code,
                            ServerMessage::GameAction {
                                action,
                                player_index: seat,
                                data,
                            },
                        );
                    }
                }
            }
        }

        ClientMessage::ExploreSync { pos, rot, anim } => {
            if let Some(code) = state.conn_rooms.get(&conn).map(|c| c.value().clone()) {
                let seat = state
                    .rooms
                    .get(&code)
                    .and_then(|room| room.seat_of(conn));
                if let Some(seat) = seat {
                    state.broadcast_to_room_except(
                        &code,
                        conn,
                        ServerMessage::ExploreSync {
                            player_index: seat,
                            pos,
                            rot,
                            anim,
                        },
                    );
                }
            }
        }

        ClientMessage::LeaveRoom => {
            handle_disconnect(conn, state);
        }

        // Handled inline in the connection loop
        ClientMessage::Pong => {}
    }
}

/// Remove a connection from its room, promoting a new host or tearing
/// the room down as needed.
fn handle_disconnect(conn: Uuid, state: &Arc<ServerState>) {
    let Some((_, code)) = state.conn_rooms.remove(&conn) else {
        return;
    };

    let Some(mut room) = state.rooms.get_mut(&code) else {
        return;
    };
    let outcome = room.leave(conn);
    let roster = room.roster();

    if outcome.destroy {
        info!("Room {} destroyed", room.code);
        drop(room);
        state.rooms.remove(&code);
        return;
    }
    drop(room);

    if let Some(new_host) = outcome.new_host {
        info!("Room {}: host reassigned to {}", code, new_host);
        state.send_to(new_host, ServerMessage::HostChanged);
    }

    state.broadcast_to_room(&code, ServerMessage::PlayerList { players: roster });
    if let Some(seat) = outcome.seat {
        state.broadcast_to_room(
            &code,
            ServerMessage::PlayerDisconnected { player_index: seat },
        );
    }
}
