//! Room policy configuration.

use std::time::Duration;

/// The display-color palette players are assigned from.
///
/// A joiner keeps their requested color if nobody in the room has it;
/// otherwise they get the first unused palette entry, falling back to
/// the palette's first color when all eight are taken.
pub const COLOR_PALETTE: [&str; 8] = [
    "#FF0000", "#0000FF", "#00FF00", "#FFFF00", "#FF00FF", "#00FFFF",
    "#FFA500", "#800080",
];

/// Policy constants for room capacity and expiry.
///
/// These are the reference values from the deployed service; none of
/// them is an invariant, so they stay configurable.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Maximum players allowed in a room.
    pub max_players: usize,

    /// Minimum players required before the host can start the game.
    pub min_players_to_start: usize,

    /// How long a room may live before the sweep evicts it,
    /// regardless of activity.
    pub retention: Duration,

    /// How often the expiry sweep runs.
    pub sweep_interval: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 8,
            min_players_to_start: 2,
            retention: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}
