//! Error types for the protocol layer.
//!
//! Each Agrodash crate defines its own error enum. A `ProtocolError` always
//! means a shape problem: a blob that would not serialize, a blob that would
//! not parse, or a value outside the closed sets this crate defines.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into a stored string).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a stored string into a Rust value).
    ///
    /// Common causes: truncated JSON, missing fields, or a role string
    /// that does not name any known [`Role`](crate::Role).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A role string did not match any known role.
    #[error("unknown role: {0:?}")]
    UnknownRole(String),
}
