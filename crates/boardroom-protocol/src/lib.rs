//! Wire protocol for Boardroom.
//!
//! This crate defines the "language" that game clients and the session
//! coordinator speak:
//!
//! - **Types** ([`Player`], [`GameState`], [`CustomRules`], [`RoomSnapshot`],
//!   the identity newtypes) — the data structures that travel on the wire.
//! - **Messages** ([`ClientCommand`], [`ServerEvent`]) — the tagged
//!   `{type, payload}` envelopes clients send and receive.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the
//! coordinator (rooms and connections). It doesn't know about sockets or
//! registries — it only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientCommand) → Coordinator (room ops)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ClientCommand, ServerEvent};
pub use types::{
    CustomRules, GameState, GameStatePatch, Phase, Player, PlayerId,
    RoomCode, RoomSnapshot, RulesPatch,
};
