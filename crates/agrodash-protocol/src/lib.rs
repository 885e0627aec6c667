//! Wire and persisted shapes for Agrodash sessions.
//!
//! This crate defines the data that crosses the boundary between the
//! dashboard and the outside world:
//!
//! - **Roles** ([`Role`]): the closed set of entitlements a user can hold.
//! - **Profiles** ([`UserProfile`], [`Center`]): the `user` blob persisted
//!   next to the bearer token.
//! - **Authentication bodies** ([`Credentials`], [`LoginResponse`],
//!   [`RoleLookupResponse`]): what the authentication service speaks.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how profiles are turned
//!   into storable strings and back.
//!
//! # Architecture
//!
//! The protocol layer sits below the session layer. It knows nothing about
//! cookies, expiry, or navigation; it only knows the shapes and how to
//! (de)serialize them.
//!
//! ```text
//! Storage (strings) → Protocol (UserProfile) → Session (token + profile)
//! ```

mod codec;
mod error;
mod role;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use role::Role;
pub use types::{
    Center, Credentials, LoginResponse, RoleLookupResponse, UserProfile,
};
