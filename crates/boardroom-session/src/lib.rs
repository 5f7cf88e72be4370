//! Player connection tracking for Boardroom.
//!
//! This crate decouples player identity from the transport object: the
//! [`ConnectionRegistry`] maps a [`PlayerId`] to the outbound channel of
//! its live connection, and owns the send/broadcast primitives.
//!
//! Delivery is strictly best-effort. A send to an absent or closed
//! connection is silently dropped — never retried, never surfaced to the
//! sender of a broadcast — so room logic can fire events without ever
//! blocking on (or knowing about) the network.
//!
//! # How it fits in the stack
//!
//! ```text
//! Coordinator (above)  ← binds players on join, broadcasts room events
//!     ↕
//! Connection registry (this crate)  ← player id → outbound channel
//!     ↕
//! Transport (below)  ← a writer task drains each channel into a socket
//! ```

mod registry;

pub use registry::{ConnectionRegistry, EventSender};
