//! WebSocket protocol messages for Hexland multiplayer.
//!
//! Messages are flat JSON objects dispatched on a `type` field, with
//! camelCase field names on the wire. Game actions are relayed with their
//! action-specific fields preserved verbatim, so both directions carry the
//! extra fields as an open map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a new game room
    CreateRoom {
        #[serde(default)]
        name: String,
        #[serde(rename = "maxPlayers", default)]
        max_players: Option<u8>,
        #[serde(rename = "mapRadius", default)]
        map_radius: Option<u8>,
    },

    /// Join an existing room by code
    JoinRoom {
        code: String,
        #[serde(default)]
        name: String,
    },

    /// Toggle lobby readiness
    PlayerReady { ready: bool },

    /// Start the game (host only)
    StartGame,

    /// Submit a game action; extra fields ride along untouched
    GameAction {
        action: String,
        #[serde(flatten)]
        data: Map<String, Value>,
    },

    /// Explore-mode position/animation sync, relayed best-effort
    ExploreSync {
        #[serde(default)]
        pos: Value,
        #[serde(default)]
        rot: Value,
        #[serde(default)]
        anim: Value,
    },

    /// Leave current room
    LeaveRoom,

    /// Liveness answer to a server ping
    Pong,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Room created; creator holds seat `player_index`
    RoomCreated {
        code: String,
        #[serde(rename = "playerIndex")]
        player_index: usize,
    },

    /// Joined a room successfully
    RoomJoined {
        code: String,
        #[serde(rename = "playerIndex")]
        player_index: usize,
    },

    /// Full seat roster, sent on every membership/readiness change
    PlayerList { players: Vec<SeatInfo> },

    /// Game starting: every client regenerates the board from `seed`
    GameStart {
        seed: u32,
        players: Vec<SeatInfo>,
        #[serde(rename = "mapRadius")]
        map_radius: u8,
    },

    /// A validated action relayed to the room
    GameAction {
        action: String,
        #[serde(rename = "playerIndex")]
        player_index: usize,
        #[serde(flatten)]
        data: Map<String, Value>,
    },

    /// Explore-mode sync from another player
    ExploreSync {
        #[serde(rename = "playerIndex")]
        player_index: usize,
        pos: Value,
        rot: Value,
        anim: Value,
    },

    /// Request failed outside the game-action path
    Error { message: String },

    /// The receiver has been promoted to host
    HostChanged,

    /// A seat lost its human and is now AI-controlled
    PlayerDisconnected {
        #[serde(rename = "playerIndex")]
        player_index: usize,
    },

    /// A game action was refused; no state changed
    ActionRejected { action: String, reason: String },

    /// Liveness probe; answer with `pong`
    Ping,
}

/// One seat as shown in the lobby roster and the game-start payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatInfo {
    pub name: String,
    pub ready: bool,
    #[serde(rename = "isAI")]
    pub is_ai: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_shape() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"create_room","name":"Ana","maxPlayers":3,"mapRadius":2}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::CreateRoom {
                name,
                max_players,
                map_radius,
            } => {
                assert_eq!(name, "Ana");
                assert_eq!(max_players, Some(3));
                assert_eq!(map_radius, Some(2));
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_game_action_preserves_extra_fields() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"game_action","action":"build_settlement","vertex":17}"#,
        )
        .unwrap();
        let ClientMessage::GameAction { action, data } = msg else {
            panic!("wrong variant");
        };
        assert_eq!(action, "build_settlement");
        assert_eq!(data.get("vertex"), Some(&Value::from(17)));
    }

    #[test]
    fn test_server_message_is_flat() {
        let mut data = Map::new();
        data.insert("d1".to_string(), Value::from(3));
        data.insert("d2".to_string(), Value::from(4));

        let msg = ServerMessage::GameAction {
            action: "dice_result".to_string(),
            player_index: 1,
            data,
        };
        let json: Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "game_action");
        assert_eq!(json["action"], "dice_result");
        assert_eq!(json["playerIndex"], 1);
        assert_eq!(json["d1"], 3);
        assert_eq!(json["d2"], 4);
    }

    #[test]
    fn test_unit_messages() {
        let pong: ClientMessage = serde_json::from_str(r#"{"type":"pong"}"#).unwrap();
        assert!(matches!(pong, ClientMessage::Pong));

        let ping = serde_json::to_value(&ServerMessage::Ping).unwrap();
        assert_eq!(ping, serde_json::json!({"type": "ping"}));
    }
}
