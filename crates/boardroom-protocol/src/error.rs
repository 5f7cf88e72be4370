//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the problem is in serialization or
//! message validity — never in networking or room management, which have
//! their own error enums in their own crates.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Covers malformed JSON, missing required payload fields, and
    /// unknown command `type` tags — the coordinator answers all of
    /// these with the same generic error event.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is invalid at the protocol level even though it
    /// deserialized cleanly.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
