//! Unified error type for Agrodash.

use agrodash_access::AccessError;
use agrodash_protocol::ProtocolError;
use agrodash_session::SessionError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors without ceremony.
#[derive(Debug, thiserror::Error)]
pub enum AgrodashError {
    /// Encoding or decoding a wire shape failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Session storage, validation, or login failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The navigation table is invalid.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Binding or serving failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
