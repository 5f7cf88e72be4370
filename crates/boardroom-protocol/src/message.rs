//! The tagged `{type, payload}` messages of the coordinator protocol.
//!
//! Every frame on the wire is one of these two enums. Serde's adjacent
//! tagging produces the exact shape the clients expect:
//!
//! ```json
//! { "type": "JOIN_ROOM", "payload": { "code": "AB12CD", "playerName": "Bob" } }
//! ```
//!
//! Decoding rejects unknown `type` tags and malformed payloads with a
//! [`ProtocolError`](crate::ProtocolError); the coordinator turns either
//! into a single `ERROR` event back to the sender, never a crash.

use serde::{Deserialize, Serialize};

use crate::types::{
    CustomRules, GameState, GameStatePatch, Player, PlayerId, RoomCode,
    RoomSnapshot, RulesPatch,
};

// ---------------------------------------------------------------------------
// ClientCommand — inbound
// ---------------------------------------------------------------------------

/// A command sent by a client to the coordinator.
///
/// Exactly one room/registry operation corresponds to each variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    /// Create a new room with the sender as sole player and host.
    CreateRoom {
        player_name: String,
        color: String,
        #[serde(default)]
        token_url: Option<String>,
        /// Opaque board/property payload, stored and relayed verbatim.
        #[serde(default)]
        properties: Option<serde_json::Value>,
    },

    /// Join an existing room by code.
    JoinRoom {
        code: RoomCode,
        player_name: String,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        token_url: Option<String>,
    },

    /// Leave a room. Disconnecting triggers the same path implicitly.
    LeaveRoom { player_id: PlayerId, code: RoomCode },

    /// Shallow-merge a partial game state into the room's shared state.
    UpdateGameState {
        code: RoomCode,
        game_state: GameStatePatch,
    },

    /// Roll two dice on behalf of a player.
    RollDice { code: RoomCode, player_id: PlayerId },

    /// Send a chat line to the room.
    ChatMessage {
        code: RoomCode,
        player_id: PlayerId,
        message: String,
    },

    /// Shallow-merge house-rule changes. Host only.
    UpdateRules {
        code: RoomCode,
        player_id: PlayerId,
        rules: RulesPatch,
    },

    /// Move the room from lobby to playing. Host only, needs ≥2 players.
    StartGame { code: RoomCode, player_id: PlayerId },
}

// ---------------------------------------------------------------------------
// ServerEvent — outbound
// ---------------------------------------------------------------------------

/// An event sent by the coordinator to one or many clients.
///
/// Direct replies (`RoomCreated`, `RoomJoined`, `Error`) go only to the
/// connection that triggered them; the rest are room broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Reply to the creator: their new room, code, and identity.
    RoomCreated {
        code: RoomCode,
        player_id: PlayerId,
        room: RoomSnapshot,
    },

    /// Reply to a joiner: their identity and the full room snapshot.
    RoomJoined {
        player_id: PlayerId,
        room: RoomSnapshot,
    },

    /// Broadcast to existing members when someone joins.
    PlayerJoined { player: Player },

    /// Broadcast to remaining members when someone leaves.
    PlayerLeft { player_id: PlayerId },

    /// Broadcast when host authority transfers after the host left.
    HostChanged { new_host_id: PlayerId },

    /// Broadcast of the full merged state after an update.
    GameStateUpdated { game_state: GameState },

    /// Broadcast of a dice roll, including to the roller.
    DiceRolled {
        player_id: PlayerId,
        dice1: u8,
        dice2: u8,
        /// Snake-eyes bonus credited to the roller (0 when none).
        bonus: i64,
        is_snake_eyes: bool,
    },

    /// Broadcast of a chat line with a server-assigned timestamp.
    ChatMessage {
        player_id: PlayerId,
        player_name: String,
        message: String,
        /// Milliseconds since the Unix epoch.
        timestamp: u64,
    },

    /// Broadcast of the full rules record after a host change to them.
    RulesUpdated { rules: CustomRules },

    /// Broadcast when the host starts the game.
    GameStarted { game_state: GameState },

    /// Sent only to the connection whose command failed.
    Error { error: String },
}

// =========================================================================
// Tests
// =========================================================================
