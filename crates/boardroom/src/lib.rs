//! # Boardroom
//!
//! The multiplayer session coordinator for a turn-based board game:
//! ephemeral rooms addressed by short shareable codes, player membership
//! with a single designated host, and real-time state relay over
//! persistent WebSocket connections.
//!
//! The coordinator is deliberately a relay, not a rules engine — it
//! enforces host authority, capacity, and phase, and otherwise forwards
//! state deltas to every member of a room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boardroom::BoardroomServer;
//!
//! # async fn run() -> Result<(), boardroom::TransportError> {
//! let server = BoardroomServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod coordinator;
mod handler;
mod server;

pub use boardroom_room::RoomConfig;
pub use boardroom_transport::TransportError;
pub use server::{BoardroomServer, BoardroomServerBuilder};
