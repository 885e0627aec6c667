//! The closed set of dashboard roles.
//!
//! The authentication service hands roles back as free-form strings, and in
//! practice the casing is inconsistent (`"ADMIN"` from one endpoint,
//! `"admin"` from another). Rather than teaching every consumer to compare
//! case-insensitively, we normalize ONCE, at the point a string enters the
//! system, into a [`Role`] value. Past that point matching is plain enum
//! equality.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// A user's role. Exactly one per session.
///
/// Serialized as the canonical SCREAMING_SNAKE_CASE spelling
/// (`"SALES_AGENT"`). Deserialization goes through [`Role::parse`], so a
/// persisted `"sales-agent"` or `" Admin "` is accepted and normalized,
/// while a string naming no role fails to decode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Full access, including user administration.
    Admin,
    /// Operations manager: orders, stock, customers, approvals.
    Manager,
    /// Finance and loan repayments.
    Accountant,
    /// Field sales: orders, sales, customers.
    SalesAgent,
    /// Warehouse stock keeping.
    Storekeeper,
    /// Staff scoped to one or more collection centers.
    CenterOperator,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Manager,
        Role::Accountant,
        Role::SalesAgent,
        Role::Storekeeper,
        Role::CenterOperator,
    ];

    /// Normalizes a raw role string into a [`Role`].
    ///
    /// Surrounding whitespace is ignored, letters are uppercased, and `-`
    /// or inner spaces become `_`. Returns `None` for empty input or a
    /// string that names no role.
    ///
    /// ```rust
    /// use agrodash_protocol::Role;
    ///
    /// assert_eq!(Role::parse("admin"), Some(Role::Admin));
    /// assert_eq!(Role::parse("Sales-Agent"), Some(Role::SalesAgent));
    /// assert_eq!(Role::parse(""), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Role> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "ACCOUNTANT" => Some(Role::Accountant),
            "SALES_AGENT" => Some(Role::SalesAgent),
            "STOREKEEPER" => Some(Role::Storekeeper),
            "CENTER_OPERATOR" => Some(Role::CenterOperator),
            _ => None,
        }
    }

    /// The canonical wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Accountant => "ACCOUNTANT",
            Role::SalesAgent => "SALES_AGENT",
            Role::Storekeeper => "STOREKEEPER",
            Role::CenterOperator => "CENTER_OPERATOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = ProtocolError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Role::parse(&raw).ok_or(ProtocolError::UnknownRole(raw))
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::str::FromStr for Role {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Role::parse(raw).ok_or_else(|| ProtocolError::UnknownRole(raw.to_string()))
    }
}
