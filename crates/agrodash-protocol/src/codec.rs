//! Codec trait and implementations for the persisted profile blob.
//!
//! The session store keeps the user profile as a string under the `user`
//! key in both the cookie copy and the local-storage copy. The store doesn't
//! care HOW the profile becomes a string. It just needs something that
//! implements [`Codec`]. Today that is [`JsonCodec`]; the JSON shape is the
//! only "protocol" the session layer defines, so it must stay stable for a
//! deployment.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to storable strings and decodes them back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the codec can live inside shared, lock-protected
///   session state.
/// - `'static` → it owns everything it needs.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value does
/// not borrow from the input string, so the caller may drop the raw blob
/// right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a string.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a string back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the string is malformed,
    /// truncated, or doesn't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ## Example
///
/// ```rust
/// use agrodash_protocol::{Codec, JsonCodec, Role, UserProfile};
///
/// let codec = JsonCodec;
/// let profile = UserProfile {
///     id: "u-1".into(),
///     email: "ada@example.com".into(),
///     name: "Ada".into(),
///     role: Role::Admin,
///     centers: None,
/// };
///
/// let blob = codec.encode(&profile).unwrap();
/// let decoded: UserProfile = codec.decode(&blob).unwrap();
/// assert_eq!(profile, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}
