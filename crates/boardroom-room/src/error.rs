//! Error types for the room layer.
//!
//! Every rejection here is terminal for exactly one command: the
//! coordinator reports it to the requesting connection and nothing else
//! happens — state is only mutated after validation passes, so there is
//! never anything to roll back.

use boardroom_protocol::RoomCode;

/// Why a room operation was rejected.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room is at capacity — no more player slots.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The room has left the lobby; joins are no longer accepted.
    #[error("game already in progress")]
    GameInProgress,

    /// A non-host player attempted a host-only action.
    #[error("only the host can {0}")]
    NotHost(&'static str),

    /// Starting the game requires more players than are present.
    #[error("need at least {0} players to start")]
    NotEnoughPlayers(usize),
}
