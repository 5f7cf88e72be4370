//! The coordinator: one entry point per inbound command.
//!
//! Owns the room registry and the connection registry together, so a
//! single lock around the `Coordinator` is the global critical section:
//! every command is handled to completion — validation, mutation, and
//! the resulting broadcasts — before the next one begins, and the sweep
//! task's deletions are atomic with respect to command handling.
//!
//! Broadcasting inside the critical section is safe because delivery is
//! a non-blocking channel enqueue; actual socket writes happen in each
//! connection's writer task.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use boardroom_protocol::{
    ClientCommand, GameStatePatch, PlayerId, RoomCode, RulesPatch,
    ServerEvent,
};
use boardroom_room::{LeaveOutcome, RoomConfig, RoomError, RoomRegistry};
use boardroom_session::{ConnectionRegistry, EventSender};

/// The room binding of one connection.
///
/// Tracked by the connection's handler task (not by the registries) so a
/// closed connection can be resolved back to its player for the implicit
/// leave.
#[derive(Debug, Clone)]
pub(crate) struct Membership {
    pub(crate) code: RoomCode,
    pub(crate) player_id: PlayerId,
}

/// Current time as milliseconds since the Unix epoch.
fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Reports a failed command to the requesting connection only.
fn send_error(reply: &EventSender, err: RoomError) {
    let _ = reply.send(ServerEvent::Error {
        error: err.to_string(),
    });
}

/// Routes typed commands to room/registry operations and turns the
/// results into events for one or many connections.
pub(crate) struct Coordinator {
    rooms: RoomRegistry,
    connections: ConnectionRegistry,
}

impl Coordinator {
    pub(crate) fn new(config: RoomConfig) -> Self {
        Self {
            rooms: RoomRegistry::new(config),
            connections: ConnectionRegistry::new(),
        }
    }

    /// Handles one decoded command from `reply`'s connection.
    ///
    /// Errors of any kind go only to the requester; successful mutations
    /// broadcast to the room. `membership` is updated when the command
    /// binds the connection to (or releases it from) a room.
    pub(crate) fn handle_command(
        &mut self,
        reply: &EventSender,
        membership: &mut Option<Membership>,
        cmd: ClientCommand,
    ) {
        match cmd {
            ClientCommand::CreateRoom {
                player_name,
                color,
                token_url,
                properties,
            } => self.create_room(
                reply, membership, player_name, color, token_url, properties,
            ),
            ClientCommand::JoinRoom {
                code,
                player_name,
                color,
                token_url,
            } => self.join_room(
                reply, membership, code, player_name, color, token_url,
            ),
            ClientCommand::LeaveRoom { player_id, code } => {
                self.leave_room(membership, code, player_id)
            }
            ClientCommand::UpdateGameState { code, game_state } => {
                self.update_game_state(reply, code, game_state)
            }
            ClientCommand::RollDice { code, player_id } => {
                self.roll_dice(reply, code, player_id)
            }
            ClientCommand::ChatMessage {
                code,
                player_id,
                message,
            } => self.chat(reply, code, player_id, message),
            ClientCommand::UpdateRules {
                code,
                player_id,
                rules,
            } => self.update_rules(reply, code, player_id, rules),
            ClientCommand::StartGame { code, player_id } => {
                self.start_game(reply, code, player_id)
            }
        }
    }

    /// A closed connection is an implicit leave — same path as
    /// `LEAVE_ROOM`, resolved from the handler-tracked membership.
    pub(crate) fn handle_disconnect(&mut self, membership: Membership) {
        tracing::debug!(
            code = %membership.code,
            player_id = %membership.player_id,
            "disconnect treated as leave"
        );
        self.remove_from_room(&membership.code, &membership.player_id);
    }

    /// Evicts empty and over-age rooms, releasing any connections still
    /// bound to their members.
    pub(crate) fn sweep(&mut self, now: Instant) {
        let removed = self.rooms.sweep_expired(now);
        for room in &removed {
            for player_id in room.player_ids() {
                self.connections.unbind(player_id);
            }
        }
        if !removed.is_empty() {
            tracing::info!(
                swept = removed.len(),
                rooms = self.rooms.room_count(),
                players = self.rooms.player_count(),
                "expiry sweep complete"
            );
        }
    }

    // -- Command handlers -------------------------------------------------

    fn create_room(
        &mut self,
        reply: &EventSender,
        membership: &mut Option<Membership>,
        player_name: String,
        color: String,
        token_url: Option<String>,
        properties: Option<serde_json::Value>,
    ) {
        let room =
            self.rooms
                .create_room(player_name, color, token_url, properties);
        let code = room.code().clone();
        let player_id = room.host_id().clone();
        let snapshot = room.snapshot();

        self.connections.bind(player_id.clone(), reply.clone());
        let _ = reply.send(ServerEvent::RoomCreated {
            code: code.clone(),
            player_id: player_id.clone(),
            room: snapshot,
        });
        *membership = Some(Membership { code, player_id });
    }

    fn join_room(
        &mut self,
        reply: &EventSender,
        membership: &mut Option<Membership>,
        code: RoomCode,
        player_name: String,
        color: Option<String>,
        token_url: Option<String>,
    ) {
        let Some(room) = self.rooms.get_mut(&code) else {
            send_error(reply, RoomError::NotFound(code));
            return;
        };

        let player = match room.add_player(player_name, color, token_url) {
            Ok(player) => player.clone(),
            Err(e) => {
                send_error(reply, e);
                return;
            }
        };

        tracing::info!(
            code = %code,
            player_id = %player.id,
            players = room.player_count(),
            "player joined room"
        );

        self.connections.bind(player.id.clone(), reply.clone());
        // The joiner gets the full snapshot; everyone else just the delta.
        let _ = reply.send(ServerEvent::RoomJoined {
            player_id: player.id.clone(),
            room: room.snapshot(),
        });
        self.connections.broadcast(
            room.player_ids(),
            &ServerEvent::PlayerJoined {
                player: player.clone(),
            },
            Some(&player.id),
        );
        *membership = Some(Membership {
            code,
            player_id: player.id,
        });
    }

    fn leave_room(
        &mut self,
        membership: &mut Option<Membership>,
        code: RoomCode,
        player_id: PlayerId,
    ) {
        self.remove_from_room(&code, &player_id);
        if membership
            .as_ref()
            .is_some_and(|m| m.code == code && m.player_id == player_id)
        {
            *membership = None;
        }
    }

    /// The shared leave path: explicit `LEAVE_ROOM`, implicit disconnect.
    ///
    /// Missing rooms and non-members are silent no-ops, so the two entry
    /// points can race without consequence.
    fn remove_from_room(&mut self, code: &RoomCode, player_id: &PlayerId) {
        match self.rooms.leave(code, player_id) {
            LeaveOutcome::NoSuchRoom | LeaveOutcome::NotAMember => {}
            LeaveOutcome::RoomDeleted => {
                self.connections.unbind(player_id);
            }
            LeaveOutcome::Left { new_host } => {
                self.connections.unbind(player_id);
                let Some(room) = self.rooms.get(code) else {
                    return;
                };
                if let Some(new_host_id) = new_host {
                    self.connections.broadcast(
                        room.player_ids(),
                        &ServerEvent::HostChanged { new_host_id },
                        None,
                    );
                }
                self.connections.broadcast(
                    room.player_ids(),
                    &ServerEvent::PlayerLeft {
                        player_id: player_id.clone(),
                    },
                    None,
                );
            }
        }
    }

    fn update_game_state(
        &mut self,
        reply: &EventSender,
        code: RoomCode,
        patch: GameStatePatch,
    ) {
        let Some(room) = self.rooms.get_mut(&code) else {
            send_error(reply, RoomError::NotFound(code));
            return;
        };

        // Broadcast the full merged state so every member converges on
        // the same view, sender included.
        let game_state = room.update_game_state(patch).clone();
        self.connections.broadcast(
            room.player_ids(),
            &ServerEvent::GameStateUpdated { game_state },
            None,
        );
    }

    fn roll_dice(
        &mut self,
        reply: &EventSender,
        code: RoomCode,
        player_id: PlayerId,
    ) {
        let Some(room) = self.rooms.get_mut(&code) else {
            send_error(reply, RoomError::NotFound(code));
            return;
        };

        let roll = room.roll_dice(&player_id);
        // The roll is not privileged — the roller hears it too.
        self.connections.broadcast(
            room.player_ids(),
            &ServerEvent::DiceRolled {
                player_id,
                dice1: roll.dice1,
                dice2: roll.dice2,
                bonus: roll.bonus,
                is_snake_eyes: roll.is_snake_eyes,
            },
            None,
        );
    }

    fn chat(
        &mut self,
        reply: &EventSender,
        code: RoomCode,
        player_id: PlayerId,
        message: String,
    ) {
        let Some(room) = self.rooms.get(&code) else {
            send_error(reply, RoomError::NotFound(code));
            return;
        };
        // Chat from an id the room doesn't know is dropped silently.
        let Some(player) = room.player(&player_id) else {
            tracing::debug!(code = %code, player_id = %player_id, "chat from non-member ignored");
            return;
        };

        self.connections.broadcast(
            room.player_ids(),
            &ServerEvent::ChatMessage {
                player_id: player_id.clone(),
                player_name: player.name.clone(),
                message,
                timestamp: unix_millis(),
            },
            None,
        );
    }

    fn update_rules(
        &mut self,
        reply: &EventSender,
        code: RoomCode,
        player_id: PlayerId,
        patch: RulesPatch,
    ) {
        let Some(room) = self.rooms.get_mut(&code) else {
            send_error(reply, RoomError::NotFound(code));
            return;
        };

        match room.update_rules(&player_id, patch) {
            Ok(rules) => {
                self.connections.broadcast(
                    room.player_ids(),
                    &ServerEvent::RulesUpdated { rules },
                    None,
                );
            }
            Err(e) => send_error(reply, e),
        }
    }

    fn start_game(
        &mut self,
        reply: &EventSender,
        code: RoomCode,
        player_id: PlayerId,
    ) {
        let Some(room) = self.rooms.get_mut(&code) else {
            send_error(reply, RoomError::NotFound(code));
            return;
        };

        match room.start(&player_id) {
            Ok(state) => {
                let event = ServerEvent::GameStarted {
                    game_state: state.clone(),
                };
                tracing::info!(code = %code, "game started");
                self.connections.broadcast(room.player_ids(), &event, None);
            }
            Err(e) => send_error(reply, e),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
