//! Role-based access filtering for Agrodash.
//!
//! Decides which dashboard sections a user may see. The decision is a pure
//! function of the user's [`Role`](agrodash_protocol::Role) and a static
//! navigation table:
//!
//! ```text
//! NavigationTable ──┐
//!                   ├──► visible_items(role, items) ──► ordered subset
//! Role ─────────────┘
//! ```
//!
//! Roles are compared by enum equality. Anything that does not parse as a
//! known role sees nothing (fail closed).

mod error;
mod filter;
mod nav;

pub use error::AccessError;
pub use filter::visible_items;
pub use nav::{NavigationItem, NavigationTable};
