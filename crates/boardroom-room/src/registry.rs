//! The room registry: central authority for room existence and lookup.

use std::collections::HashMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use boardroom_protocol::{Player, PlayerId, RoomCode};
use rand::Rng;

use crate::room::new_player_id;
use crate::{Room, RoomConfig};

/// What happened when a player left (or was disconnected from) a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// No room with that code; nothing to do.
    NoSuchRoom,
    /// The player was not a member; nothing to do.
    NotAMember,
    /// The player left and the now-empty room was deleted.
    RoomDeleted,
    /// The player left; `new_host` is set if authority transferred.
    Left { new_host: Option<PlayerId> },
}

/// Alphabet room codes are drawn from. Uppercase only — codes are read
/// aloud and typed into a join screen.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws one fixed-length candidate code.
fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code = (0..RoomCode::LEN)
        .map(|_| {
            CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char
        })
        .collect();
    RoomCode(code)
}

/// Current time as milliseconds since the Unix epoch.
fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Maps room codes to live rooms.
///
/// Owns creation (with collision-free code allocation), lookup, deletion,
/// and the expiry sweep. The registry is plain owned state — callers
/// construct one per coordinator (or per test) and serialize access at a
/// higher level; there is no hidden locking here.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    config: RoomConfig,
}

impl RoomRegistry {
    /// Creates an empty registry with the given policy.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room with the creator as sole player and host.
    pub fn create_room(
        &mut self,
        player_name: String,
        color: String,
        token_url: Option<String>,
        board_properties: Option<serde_json::Value>,
    ) -> &Room {
        self.create_room_with(
            &mut rand::rng(),
            player_name,
            color,
            token_url,
            board_properties,
        )
    }

    /// [`create_room`](Self::create_room) with an injected code RNG, so
    /// tests can force code collisions deterministically.
    pub fn create_room_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        player_name: String,
        color: String,
        token_url: Option<String>,
        board_properties: Option<serde_json::Value>,
    ) -> &Room {
        let code = self.allocate_code(rng);
        let host =
            Player::new(new_player_id(), player_name, color, token_url, true);
        let room = Room::new(
            code.clone(),
            host,
            board_properties,
            self.config.clone(),
            unix_millis(),
        );

        tracing::info!(code = %code, "room created");
        self.rooms.entry(code).or_insert(room)
    }

    /// Draws candidate codes until one not present in the registry is
    /// found. With 36^6 possibilities and short-lived rooms, this loop
    /// rarely runs more than once.
    fn allocate_code<R: Rng + ?Sized>(&self, rng: &mut R) -> RoomCode {
        loop {
            let code = generate_code(rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
            tracing::debug!(code = %code, "room code collision, retrying");
        }
    }

    /// Pure lookup; callers turn `None` into an error event for the
    /// requesting connection.
    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Idempotent removal.
    pub fn delete(&mut self, code: &RoomCode) -> Option<Room> {
        let removed = self.rooms.remove(code);
        if removed.is_some() {
            tracing::info!(code = %code, "room deleted");
        }
        removed
    }

    /// Removes a player from a room, deleting the room if it empties and
    /// transferring host authority if the host left.
    ///
    /// Missing room or non-member ids are no-ops, so leave (and the
    /// implicit leave on disconnect) is always safe to repeat.
    pub fn leave(
        &mut self,
        code: &RoomCode,
        player_id: &PlayerId,
    ) -> LeaveOutcome {
        let Some(room) = self.rooms.get_mut(code) else {
            return LeaveOutcome::NoSuchRoom;
        };
        let Some(removed) = room.remove_player(player_id) else {
            return LeaveOutcome::NotAMember;
        };

        tracing::info!(
            code = %code,
            player_id = %player_id,
            remaining = room.player_count(),
            "player left room"
        );

        if room.is_empty() {
            self.rooms.remove(code);
            tracing::info!(code = %code, "room deleted (empty)");
            return LeaveOutcome::RoomDeleted;
        }

        if let Some(new_host) = &removed.new_host {
            tracing::info!(
                code = %code,
                new_host = %new_host,
                "host authority transferred"
            );
        }
        LeaveOutcome::Left {
            new_host: removed.new_host,
        }
    }

    /// Deletes every room that is empty or older than the retention
    /// window, returning the evicted rooms so the caller can release
    /// any connections still bound to their members.
    pub fn sweep_expired(&mut self, now: Instant) -> Vec<Room> {
        let retention = self.config.retention;
        let expired: Vec<RoomCode> = self
            .rooms
            .iter()
            .filter(|(_, room)| {
                room.is_empty() || room.age(now) > retention
            })
            .map(|(code, _)| code.clone())
            .collect();

        let mut removed = Vec::with_capacity(expired.len());
        for code in expired {
            if let Some(room) = self.rooms.remove(&code) {
                tracing::info!(
                    code = %code,
                    players = room.player_count(),
                    "room swept"
                );
                removed.push(room);
            }
        }
        removed
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Total players across all live rooms.
    pub fn player_count(&self) -> usize {
        self.rooms.values().map(Room::player_count).sum()
    }
}
