//! Error types for the access layer.

/// Errors raised while building a navigation table.
///
/// Filtering itself never fails; an unknown role yields an empty menu.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// A navigation item was declared with no roles, so nobody could ever
    /// see it.
    #[error("navigation item {path:?} has an empty role set")]
    EmptyRoleSet {
        /// Path of the offending item.
        path: String,
    },

    /// Two items share a path.
    #[error("duplicate navigation path {0:?}")]
    DuplicatePath(String),

    /// An operator-provided table could not be parsed.
    #[error("invalid navigation table: {0}")]
    InvalidTable(#[from] serde_json::Error),
}
