//! A single room: players in join order, host designation, shared state.
//!
//! Every mutating operation is funneled through the owning `Room` so the
//! capacity, phase, and host-authority checks live in one place, and the
//! broadcast that follows a mutation always reflects a fully-applied
//! state — other members never observe a partial update.

use std::time::{Duration, Instant};

use boardroom_protocol::{
    CustomRules, GameState, GameStatePatch, Phase, Player, PlayerId,
    RoomCode, RoomSnapshot, RulesPatch,
};
use rand::{Rng, distr::Alphanumeric};

use crate::{COLOR_PALETTE, RoomConfig, RoomError};

/// Generates a fresh random player id (21 alphanumeric characters).
pub(crate) fn new_player_id() -> PlayerId {
    let id = rand::rng()
        .sample_iter(Alphanumeric)
        .take(PlayerId::LEN)
        .map(char::from)
        .collect();
    PlayerId(id)
}

/// The result of settling a dice roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub dice1: u8,
    pub dice2: u8,
    /// Snake-eyes bonus credited to the roller; 0 when the rule is off,
    /// the roll wasn't double ones, or the roller is not a member.
    pub bonus: i64,
    pub is_snake_eyes: bool,
}

/// The result of removing a player from a room.
#[derive(Debug, Clone)]
pub struct PlayerRemoved {
    /// The player as they were at the moment of removal.
    pub player: Player,
    /// Set when the removed player was host and authority transferred
    /// to the earliest-joined remaining member.
    pub new_host: Option<PlayerId>,
}

/// One isolated play session.
///
/// Join order is significant: `players` is an ordered sequence, and host
/// succession always promotes the earliest-joined survivor — a
/// deterministic rule, never an election or hash-map iteration order.
pub struct Room {
    code: RoomCode,
    host_id: PlayerId,
    players: Vec<Player>,
    game_state: GameState,
    config: RoomConfig,
    created_at: Instant,
    created_at_ms: u64,
}

impl Room {
    /// Creates a room with `host` as its sole member.
    ///
    /// `board_properties` is the opaque board payload supplied at
    /// creation; it is forwarded verbatim to every joiner.
    pub(crate) fn new(
        code: RoomCode,
        host: Player,
        board_properties: Option<serde_json::Value>,
        config: RoomConfig,
        created_at_ms: u64,
    ) -> Self {
        let mut game_state = GameState::default();
        if let Some(properties) = board_properties {
            game_state.properties = properties;
        }
        Self {
            code,
            host_id: host.id.clone(),
            players: vec![host],
            game_state,
            config,
            created_at: Instant::now(),
            created_at_ms,
        }
    }

    // -- Accessors --------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host_id(&self) -> &PlayerId {
        &self.host_id
    }

    /// All members in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.game_state.phase
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    /// Ids of all members in join order.
    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.iter().map(|p| &p.id)
    }

    /// How long this room has existed as of `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Full serialization of the room's current state.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            host_id: self.host_id.clone(),
            players: self.players.clone(),
            game_state: self.game_state.clone(),
            created_at: self.created_at_ms,
        }
    }

    // -- Operations -------------------------------------------------------

    /// Adds a new player at the end of join order.
    ///
    /// Rejects the join when the game already started or the room is at
    /// capacity. The requested color is honored only if nobody in the
    /// room already has it.
    ///
    /// # Errors
    /// [`RoomError::GameInProgress`] or [`RoomError::RoomFull`].
    pub fn add_player(
        &mut self,
        name: String,
        color: Option<String>,
        token_url: Option<String>,
    ) -> Result<&Player, RoomError> {
        if !self.game_state.phase.is_joinable() {
            return Err(RoomError::GameInProgress);
        }
        if self.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.code.clone()));
        }

        let color = self.assign_color(color);
        let player =
            Player::new(new_player_id(), name, color, token_url, false);
        self.players.push(player);

        // Just pushed, so last() cannot be empty.
        Ok(self.players.last().expect("just inserted"))
    }

    /// Picks the joiner's color: their request if unused, else the first
    /// unused palette entry, else the palette's first color.
    fn assign_color(&self, requested: Option<String>) -> String {
        if let Some(color) = requested {
            if !self.color_taken(&color) {
                return color;
            }
        }
        COLOR_PALETTE
            .iter()
            .find(|c| !self.color_taken(c))
            .unwrap_or(&COLOR_PALETTE[0])
            .to_string()
    }

    fn color_taken(&self, color: &str) -> bool {
        self.players.iter().any(|p| p.color == color)
    }

    /// Removes a player, transferring host authority if they held it.
    ///
    /// Returns `None` if the id is not a member (removal is idempotent).
    /// The caller is responsible for deleting the room once it is empty.
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<PlayerRemoved> {
        let index = self.players.iter().position(|p| &p.id == id)?;
        let player = self.players.remove(index);

        let mut new_host = None;
        if player.is_host {
            if let Some(successor) = self.players.first_mut() {
                successor.is_host = true;
                self.host_id = successor.id.clone();
                new_host = Some(successor.id.clone());
            }
        }

        Some(PlayerRemoved { player, new_host })
    }

    /// Shallow-merges `patch` into the shared game state.
    ///
    /// This is a relay, not a rules engine: no field-level validation.
    pub fn update_game_state(&mut self, patch: GameStatePatch) -> &GameState {
        self.game_state.apply(patch);
        &self.game_state
    }

    /// Shallow-merges house-rule changes. Host only.
    ///
    /// # Errors
    /// [`RoomError::NotHost`] — the room's rules are unchanged.
    pub fn update_rules(
        &mut self,
        requester: &PlayerId,
        patch: RulesPatch,
    ) -> Result<CustomRules, RoomError> {
        if requester != &self.host_id {
            return Err(RoomError::NotHost("change rules"));
        }
        self.game_state.custom_rules.apply(patch);
        Ok(self.game_state.custom_rules)
    }

    /// Moves the room from lobby to playing. Host only, and only with
    /// at least the configured minimum of players present.
    ///
    /// # Errors
    /// [`RoomError::NotHost`] or [`RoomError::NotEnoughPlayers`] —
    /// the phase is unchanged on failure.
    pub fn start(&mut self, requester: &PlayerId) -> Result<&GameState, RoomError> {
        if requester != &self.host_id {
            return Err(RoomError::NotHost("start the game"));
        }
        if self.players.len() < self.config.min_players_to_start {
            return Err(RoomError::NotEnoughPlayers(
                self.config.min_players_to_start,
            ));
        }
        self.game_state.phase = Phase::Playing;
        Ok(&self.game_state)
    }

    /// Rolls two independent dice and settles the result.
    pub fn roll_dice(&mut self, roller: &PlayerId) -> DiceRoll {
        let mut rng = rand::rng();
        let dice1 = rng.random_range(1..=6);
        let dice2 = rng.random_range(1..=6);
        self.settle_roll(roller, dice1, dice2)
    }

    /// Records a rolled pair and applies the snake-eyes bonus.
    ///
    /// The bonus is credited iff both dice are 1, the configured bonus
    /// is positive, and the roller is a member of this room.
    pub fn settle_roll(
        &mut self,
        roller: &PlayerId,
        dice1: u8,
        dice2: u8,
    ) -> DiceRoll {
        let is_snake_eyes = dice1 == 1 && dice2 == 1;
        let configured = self.game_state.custom_rules.snake_eyes_bonus;

        let mut bonus = 0;
        if is_snake_eyes && configured > 0 {
            if let Some(player) = self.player_mut(roller) {
                player.money += configured;
                bonus = configured;
            }
        }

        self.game_state.dice_values = (dice1, dice2);

        DiceRoll {
            dice1,
            dice2,
            bonus,
            is_snake_eyes,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use boardroom_protocol::RulesPatch;

    fn test_room() -> Room {
        let host = Player::new(
            PlayerId("host".into()),
            "Alice".into(),
            "#FF0000".into(),
            None,
            true,
        );
        Room::new(
            RoomCode("AB12CD".into()),
            host,
            None,
            RoomConfig::default(),
            0,
        )
    }

    fn pid(id: &str) -> PlayerId {
        PlayerId(id.into())
    }

    // =====================================================================
    // Color assignment
    // =====================================================================

    #[test]
    fn test_assign_color_honors_unused_request() {
        let mut room = test_room();
        let player = room
            .add_player("Bob".into(), Some("#123456".into()), None)
            .unwrap();
        assert_eq!(player.color, "#123456");
    }

    #[test]
    fn test_assign_color_falls_back_when_request_taken() {
        // The host already holds #FF0000 (the palette's first entry),
        // so a joiner asking for it gets the first unused entry instead.
        let mut room = test_room();
        let player = room
            .add_player("Bob".into(), Some("#FF0000".into()), None)
            .unwrap();
        assert_eq!(player.color, "#0000FF");
    }

    #[test]
    fn test_assign_color_fills_palette_without_duplicates() {
        let mut room = test_room();
        for i in 0..7 {
            room.add_player(format!("P{i}"), None, None).unwrap();
        }
        assert_eq!(room.player_count(), 8);
        let colors: Vec<_> =
            room.players().iter().map(|p| p.color.clone()).collect();
        // All 8 palette entries are taken, each exactly once.
        for c in COLOR_PALETTE {
            assert_eq!(colors.iter().filter(|x| *x == c).count(), 1);
        }
    }

    #[test]
    fn test_assign_color_last_resort_is_first_palette_entry() {
        // The fallback-to-first-entry branch only fires once every
        // palette color is held, which needs a capacity above the
        // palette size.
        let host = Player::new(
            pid("host"),
            "Alice".into(),
            "#FF0000".into(),
            None,
            true,
        );
        let mut room = Room::new(
            RoomCode("AB12CD".into()),
            host,
            None,
            RoomConfig {
                max_players: 10,
                ..RoomConfig::default()
            },
            0,
        );
        for i in 0..7 {
            room.add_player(format!("P{i}"), None, None).unwrap();
        }
        // Every palette entry is now taken; the next joiner gets the
        // palette's first color again.
        let player =
            room.add_player("Overflow".into(), None, None).unwrap();
        assert_eq!(player.color, "#FF0000");
    }

    // =====================================================================
    // Join checks
    // =====================================================================

    #[test]
    fn test_add_player_rejects_when_full() {
        let mut room = test_room();
        for i in 0..7 {
            room.add_player(format!("P{i}"), None, None).unwrap();
        }

        let result = room.add_player("Ninth".into(), None, None);

        assert!(matches!(result, Err(RoomError::RoomFull(_))));
        assert_eq!(room.player_count(), 8, "failed join must not mutate");
    }

    #[test]
    fn test_add_player_rejects_after_start() {
        let mut room = test_room();
        room.add_player("Bob".into(), None, None).unwrap();
        room.start(&pid("host")).unwrap();

        let result = room.add_player("Carol".into(), None, None);

        assert!(matches!(result, Err(RoomError::GameInProgress)));
        assert_eq!(room.player_count(), 2);
    }

    #[test]
    fn test_add_player_generates_unique_ids() {
        let mut room = test_room();
        for i in 0..7 {
            room.add_player(format!("P{i}"), None, None).unwrap();
        }
        let mut ids: Vec<_> =
            room.players().iter().map(|p| p.id.clone()).collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_exactly_one_host_after_joins() {
        let mut room = test_room();
        for i in 0..5 {
            room.add_player(format!("P{i}"), None, None).unwrap();
        }
        let hosts =
            room.players().iter().filter(|p| p.is_host).count();
        assert_eq!(hosts, 1);
        assert_eq!(room.host_id(), &pid("host"));
    }

    // =====================================================================
    // Host succession
    // =====================================================================

    #[test]
    fn test_remove_host_promotes_earliest_joined() {
        let mut room = test_room();
        let bob = room
            .add_player("Bob".into(), None, None)
            .unwrap()
            .id
            .clone();
        room.add_player("Carol".into(), None, None).unwrap();

        let removed = room.remove_player(&pid("host")).unwrap();

        assert_eq!(removed.new_host.as_ref(), Some(&bob));
        assert_eq!(room.host_id(), &bob);
        let hosts =
            room.players().iter().filter(|p| p.is_host).count();
        assert_eq!(hosts, 1);
    }

    #[test]
    fn test_remove_non_host_keeps_host() {
        let mut room = test_room();
        let bob = room
            .add_player("Bob".into(), None, None)
            .unwrap()
            .id
            .clone();

        let removed = room.remove_player(&bob).unwrap();

        assert!(removed.new_host.is_none());
        assert_eq!(room.host_id(), &pid("host"));
    }

    #[test]
    fn test_remove_unknown_player_is_noop() {
        let mut room = test_room();
        assert!(room.remove_player(&pid("ghost")).is_none());
        assert_eq!(room.player_count(), 1);
    }

    #[test]
    fn test_remove_last_player_leaves_room_empty() {
        let mut room = test_room();
        let removed = room.remove_player(&pid("host")).unwrap();
        assert!(removed.new_host.is_none());
        assert!(room.is_empty());
    }

    // =====================================================================
    // Dice
    // =====================================================================

    #[test]
    fn test_roll_dice_stays_in_range() {
        let mut room = test_room();
        for _ in 0..1_000 {
            let roll = room.roll_dice(&pid("host"));
            assert!((1..=6).contains(&roll.dice1));
            assert!((1..=6).contains(&roll.dice2));
            assert_eq!(
                room.game_state().dice_values,
                (roll.dice1, roll.dice2)
            );
        }
    }

    #[test]
    fn test_snake_eyes_credits_configured_bonus() {
        let mut room = test_room();
        room.update_rules(
            &pid("host"),
            RulesPatch {
                snake_eyes_bonus: Some(500),
                ..RulesPatch::default()
            },
        )
        .unwrap();

        let roll = room.settle_roll(&pid("host"), 1, 1);

        assert!(roll.is_snake_eyes);
        assert_eq!(roll.bonus, 500);
        assert_eq!(room.player(&pid("host")).unwrap().money, 2000);
    }

    #[test]
    fn test_snake_eyes_without_bonus_rule_credits_nothing() {
        let mut room = test_room();

        let roll = room.settle_roll(&pid("host"), 1, 1);

        assert!(roll.is_snake_eyes);
        assert_eq!(roll.bonus, 0);
        assert_eq!(room.player(&pid("host")).unwrap().money, 1500);
    }

    #[test]
    fn test_non_snake_eyes_never_credits_bonus() {
        let mut room = test_room();
        room.update_rules(
            &pid("host"),
            RulesPatch {
                snake_eyes_bonus: Some(500),
                ..RulesPatch::default()
            },
        )
        .unwrap();

        let roll = room.settle_roll(&pid("host"), 1, 2);

        assert!(!roll.is_snake_eyes);
        assert_eq!(roll.bonus, 0);
        assert_eq!(room.player(&pid("host")).unwrap().money, 1500);
    }

    #[test]
    fn test_settle_roll_updates_dice_values() {
        let mut room = test_room();
        room.settle_roll(&pid("host"), 4, 6);
        assert_eq!(room.game_state().dice_values, (4, 6));
    }

    // =====================================================================
    // Rules and start authorization
    // =====================================================================

    #[test]
    fn test_update_rules_rejects_non_host() {
        let mut room = test_room();
        let bob = room
            .add_player("Bob".into(), None, None)
            .unwrap()
            .id
            .clone();

        let result = room.update_rules(
            &bob,
            RulesPatch {
                fast_build: Some(true),
                ..RulesPatch::default()
            },
        );

        assert!(matches!(result, Err(RoomError::NotHost(_))));
        assert!(
            !room.game_state().custom_rules.fast_build,
            "failed update must not mutate rules"
        );
    }

    #[test]
    fn test_update_rules_merges_partial_patch() {
        let mut room = test_room();
        room.update_rules(
            &pid("host"),
            RulesPatch {
                double_go_salary: Some(true),
                ..RulesPatch::default()
            },
        )
        .unwrap();
        let rules = room
            .update_rules(
                &pid("host"),
                RulesPatch {
                    snake_eyes_bonus: Some(100),
                    ..RulesPatch::default()
                },
            )
            .unwrap();

        assert!(rules.double_go_salary);
        assert_eq!(rules.snake_eyes_bonus, 100);
    }

    #[test]
    fn test_start_rejects_non_host() {
        let mut room = test_room();
        let bob = room
            .add_player("Bob".into(), None, None)
            .unwrap()
            .id
            .clone();

        let result = room.start(&bob);

        assert!(matches!(result, Err(RoomError::NotHost(_))));
        assert_eq!(room.phase(), Phase::Lobby);
    }

    #[test]
    fn test_start_rejects_solo_host() {
        let mut room = test_room();

        let result = room.start(&pid("host"));

        assert!(matches!(result, Err(RoomError::NotEnoughPlayers(2))));
        assert_eq!(room.phase(), Phase::Lobby);
    }

    #[test]
    fn test_start_with_two_players_enters_playing() {
        let mut room = test_room();
        room.add_player("Bob".into(), None, None).unwrap();

        let state = room.start(&pid("host")).unwrap();

        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(room.phase(), Phase::Playing);
    }

    // =====================================================================
    // State updates and snapshots
    // =====================================================================

    #[test]
    fn test_update_game_state_merges_and_returns_full_state() {
        let mut room = test_room();
        let state = room.update_game_state(
            boardroom_protocol::GameStatePatch {
                current_player_index: Some(1),
                ..Default::default()
            },
        );

        assert_eq!(state.current_player_index, 1);
        assert_eq!(state.dice_values, (1, 1));
    }

    #[test]
    fn test_snapshot_reflects_board_payload() {
        let host = Player::new(
            pid("host"),
            "Alice".into(),
            "#FF0000".into(),
            None,
            true,
        );
        let board = serde_json::json!([{ "id": 0, "name": "GO" }]);
        let room = Room::new(
            RoomCode("AB12CD".into()),
            host,
            Some(board.clone()),
            RoomConfig::default(),
            42,
        );

        let snapshot = room.snapshot();

        assert_eq!(snapshot.code.0, "AB12CD");
        assert_eq!(snapshot.host_id, pid("host"));
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.game_state.properties, board);
        assert_eq!(snapshot.created_at, 42);
    }
}
