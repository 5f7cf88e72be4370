//! Room lifecycle management for Boardroom.
//!
//! A [`Room`] is one isolated play session: its players in join order,
//! the host designation, and the shared game state. The [`RoomRegistry`]
//! is the single authority for room existence — creation with
//! collision-checked code allocation, lookup, deletion, and the periodic
//! expiry sweep.
//!
//! Rooms never communicate with each other, and nothing in this crate
//! touches the network: operations mutate state and return plain values
//! that the coordinator turns into events.
//!
//! # Key types
//!
//! - [`Room`] — players, host, shared state, and every mutating operation
//! - [`RoomRegistry`] — create/lookup/delete/sweep
//! - [`RoomConfig`] — capacity and expiry policy (tunable defaults)
//! - [`RoomError`] — why an operation was rejected

mod config;
mod error;
mod registry;
mod room;

pub use config::{COLOR_PALETTE, RoomConfig};
pub use error::RoomError;
pub use registry::{LeaveOutcome, RoomRegistry};
pub use room::{DiceRoll, PlayerRemoved, Room};
