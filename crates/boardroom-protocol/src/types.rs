//! Core data-model types for the Boardroom wire format.
//!
//! Everything in this module is serialized into the `payload` of the
//! tagged messages in [`crate::message`] and consumed by the rendering
//! layer on the other end, so the JSON shapes here are a compatibility
//! contract: field names are camelCase, dice values are a two-element
//! array, the phase is a lowercase string.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Generated server-side when the player enters a room and stable for the
/// lifetime of that connection's membership. Opaque to clients: 21 random
/// alphanumeric characters, long enough that collisions are not a
/// practical concern.
///
/// `#[serde(transparent)]` makes a `PlayerId` serialize as the bare
/// string, not as a wrapper object — the client sees `"x3F…"`, never
/// `{ "0": "x3F…" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Length of a generated player id.
    pub const LEN: usize = 21;
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short, human-shareable room code.
///
/// Six uppercase alphanumeric characters, unique among all currently-live
/// rooms. Players type this into the join screen, so it stays short.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Length of a generated room code.
    pub const LEN: usize = 6;
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One player's piece of a room's state, as the clients see it.
///
/// The coordinator relays most of these fields without interpreting them
/// (`position`, `properties`, `in_jail` are moved by client-driven state
/// updates); the exceptions are `money`, which the snake-eyes bonus rule
/// credits server-side, and `is_host`, which the coordinator owns
/// entirely — exactly one player per room carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Opaque unique id, generated at join time.
    pub id: PlayerId,
    /// User-supplied display name. Not required to be unique.
    pub name: String,
    /// Display color. Collisions discouraged but not forbidden.
    pub color: String,
    /// Board index. Starts at 0 (GO).
    pub position: u32,
    /// Cash balance. Starts at the standard 1500.
    pub money: i64,
    /// Ids of properties this player owns.
    pub properties: Vec<u32>,
    /// Whether the player is currently jailed.
    pub in_jail: bool,
    /// Optional reference to the player's visual token (URL or symbolic id).
    pub token_url: Option<String>,
    /// Whether this player holds host authority for the room.
    pub is_host: bool,
}

impl Player {
    /// Starting cash for every new player.
    pub const STARTING_MONEY: i64 = 1500;

    /// Creates a player at the starting position with default holdings.
    pub fn new(
        id: PlayerId,
        name: String,
        color: String,
        token_url: Option<String>,
        is_host: bool,
    ) -> Self {
        Self {
            id,
            name,
            color,
            position: 0,
            money: Self::STARTING_MONEY,
            properties: Vec::new(),
            in_jail: false,
            token_url,
            is_host,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room.
///
/// One-way transition: `Lobby → Playing`, driven only by the host's
/// `START_GAME`. There is no resume-to-lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Accepting joins; game not yet started.
    #[default]
    Lobby,
    /// Game in progress; joins are rejected.
    Playing,
}

impl Phase {
    /// Returns `true` if the room is still accepting new players.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Lobby)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Playing => write!(f, "playing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Custom rules
// ---------------------------------------------------------------------------

/// House-rule toggles shared by everyone in a room.
///
/// A fixed-shape record rather than an open map, so the known flags are
/// checked at compile time. Only the host may change these, and the
/// coordinator itself consults a single field (`snake_eyes_bonus`) when
/// settling dice rolls — the rest are relayed for the clients to enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRules {
    pub red_dice_enabled: bool,
    pub money_to_free_parking: bool,
    /// Amount credited to a player rolling double ones. 0 disables the rule.
    pub snake_eyes_bonus: i64,
    pub double_go_salary: bool,
    pub auction_properties: bool,
    pub fast_build: bool,
}

impl CustomRules {
    /// Shallow-merges the set fields of `patch` into `self`.
    pub fn apply(&mut self, patch: RulesPatch) {
        if let Some(v) = patch.red_dice_enabled {
            self.red_dice_enabled = v;
        }
        if let Some(v) = patch.money_to_free_parking {
            self.money_to_free_parking = v;
        }
        if let Some(v) = patch.snake_eyes_bonus {
            self.snake_eyes_bonus = v;
        }
        if let Some(v) = patch.double_go_salary {
            self.double_go_salary = v;
        }
        if let Some(v) = patch.auction_properties {
            self.auction_properties = v;
        }
        if let Some(v) = patch.fast_build {
            self.fast_build = v;
        }
    }
}

/// A partial [`CustomRules`] update: absent fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesPatch {
    pub red_dice_enabled: Option<bool>,
    pub money_to_free_parking: Option<bool>,
    pub snake_eyes_bonus: Option<i64>,
    pub double_go_salary: Option<bool>,
    pub auction_properties: Option<bool>,
    pub fast_build: Option<bool>,
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// The shared, room-wide game state that every member sees.
///
/// Nested under `gameState` in room snapshots. The `properties` field is
/// the board payload: an opaque JSON blob supplied at room creation and
/// relayed verbatim — its shape belongs to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Index into join order of the player whose turn it is.
    /// Meaningful only once the phase is `playing`.
    pub current_player_index: u32,
    /// The last-rolled dice pair. Serializes as `[d1, d2]`.
    pub dice_values: (u8, u8),
    pub phase: Phase,
    /// Opaque board/property payload, passed through unmodified.
    pub properties: serde_json::Value,
    pub custom_rules: CustomRules,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_player_index: 0,
            dice_values: (1, 1),
            phase: Phase::Lobby,
            properties: serde_json::Value::Array(Vec::new()),
            custom_rules: CustomRules::default(),
        }
    }
}

impl GameState {
    /// Shallow-merges the set fields of `patch` into `self`.
    ///
    /// `phase` and `custom_rules` are deliberately not patchable here:
    /// the phase moves only through the start-game path, and rules only
    /// through the host-gated rules path.
    pub fn apply(&mut self, patch: GameStatePatch) {
        if let Some(v) = patch.current_player_index {
            self.current_player_index = v;
        }
        if let Some(v) = patch.dice_values {
            self.dice_values = v;
        }
        if let Some(v) = patch.properties {
            self.properties = v;
        }
    }
}

/// A partial [`GameState`] update: absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatePatch {
    pub current_player_index: Option<u32>,
    pub dice_values: Option<(u8, u8)>,
    pub properties: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Room snapshot
// ---------------------------------------------------------------------------

/// A full serialization of a room's current state.
///
/// Sent to a connection that just created or joined the room; existing
/// members are kept current through the incremental events instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub host_id: PlayerId,
    /// All members in join order.
    pub players: Vec<Player>,
    pub game_state: GameState,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
}

// =========================================================================
// Tests
// =========================================================================
