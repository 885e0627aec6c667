//! Navigation items and the table they live in.

use std::collections::HashSet;

use agrodash_protocol::Role;
use serde::{Deserialize, Serialize};

use crate::{AccessError, visible_items};

// ---------------------------------------------------------------------------
// NavigationItem
// ---------------------------------------------------------------------------

/// One entry in the dashboard's side menu.
///
/// Fields are private so every item goes through [`NavigationItem::new`],
/// which refuses an empty role set. JSON input is validated the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawItem")]
pub struct NavigationItem {
    path: String,
    label: String,
    icon: String,
    roles: Vec<Role>,
}

/// Unvalidated shape used only for deserialization.
#[derive(Deserialize)]
struct RawItem {
    path: String,
    label: String,
    #[serde(default)]
    icon: String,
    roles: Vec<Role>,
}

impl TryFrom<RawItem> for NavigationItem {
    type Error = AccessError;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        NavigationItem::new(raw.path, raw.label, raw.icon, raw.roles)
    }
}

impl NavigationItem {
    /// Creates an item visible to `roles`. Duplicate roles are collapsed.
    ///
    /// # Errors
    /// [`AccessError::EmptyRoleSet`] if `roles` is empty.
    pub fn new(
        path: impl Into<String>,
        label: impl Into<String>,
        icon: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<Self, AccessError> {
        let path = path.into();
        let mut deduped: Vec<Role> = Vec::new();
        for role in roles {
            if !deduped.contains(&role) {
                deduped.push(role);
            }
        }
        if deduped.is_empty() {
            return Err(AccessError::EmptyRoleSet { path });
        }

        Ok(Self {
            path,
            label: label.into(),
            icon: icon.into(),
            roles: deduped,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Whether `role` may see this item.
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

// ---------------------------------------------------------------------------
// NavigationTable
// ---------------------------------------------------------------------------

/// The full, ordered menu. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationTable {
    items: Vec<NavigationItem>,
}

impl NavigationTable {
    /// Builds a table, rejecting duplicate paths.
    pub fn new(items: Vec<NavigationItem>) -> Result<Self, AccessError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.path()) {
                return Err(AccessError::DuplicatePath(item.path().to_owned()));
            }
        }
        Ok(Self { items })
    }

    /// The default agribusiness dashboard menu.
    ///
    /// | Section        | Roles                                              |
    /// |----------------|----------------------------------------------------|
    /// | Orders         | Admin, Manager, SalesAgent, CenterOperator         |
    /// | Inventory      | Admin, Manager, Storekeeper, CenterOperator        |
    /// | Finance        | Admin, Accountant                                  |
    /// | Loans          | Admin, Accountant, Manager                         |
    /// | Sales          | Admin, Manager, SalesAgent                         |
    /// | Customers      | Admin, Manager, SalesAgent                         |
    /// | Centers        | Admin, Manager                                     |
    /// | Approvals      | Admin, Manager                                     |
    /// | Administration | Admin                                              |
    pub fn dashboard() -> Self {
        use Role::*;

        let entries: [(&str, &str, &str, &[Role]); 9] = [
            (
                "/dashboard/orders",
                "Orders",
                "clipboard-list",
                &[Admin, Manager, SalesAgent, CenterOperator],
            ),
            (
                "/dashboard/inventory",
                "Inventory",
                "warehouse",
                &[Admin, Manager, Storekeeper, CenterOperator],
            ),
            ("/dashboard/finance", "Finance", "wallet", &[Admin, Accountant]),
            ("/dashboard/loans", "Loans", "hand-coins", &[Admin, Accountant, Manager]),
            ("/dashboard/sales", "Sales", "trending-up", &[Admin, Manager, SalesAgent]),
            ("/dashboard/customers", "Customers", "users", &[Admin, Manager, SalesAgent]),
            ("/dashboard/centers", "Centers", "map-pin", &[Admin, Manager]),
            ("/dashboard/approvals", "Approvals", "check-circle", &[Admin, Manager]),
            ("/dashboard/admin", "Administration", "shield", &[Admin]),
        ];

        let items = entries
            .into_iter()
            .map(|(path, label, icon, roles)| NavigationItem {
                path: path.to_owned(),
                label: label.to_owned(),
                icon: icon.to_owned(),
                roles: roles.to_vec(),
            })
            .collect();

        Self { items }
    }

    /// Loads an operator-provided table: a JSON array of
    /// `{ "path", "label", "icon", "roles": [..] }` objects.
    ///
    /// Role names are normalized the same way as everywhere else, so
    /// `"sales-agent"` and `"SALES_AGENT"` are the same role.
    pub fn from_json(json: &str) -> Result<Self, AccessError> {
        let items: Vec<NavigationItem> = serde_json::from_str(json)?;
        Self::new(items)
    }

    pub fn items(&self) -> &[NavigationItem] {
        &self.items
    }

    /// Items visible to `role`, in table order.
    pub fn visible_for_role(&self, role: Role) -> Vec<&NavigationItem> {
        visible_items(role, &self.items)
    }

    /// Items visible to a role given as raw text.
    ///
    /// Text that doesn't name a known role (including the empty string)
    /// gets an empty menu.
    pub fn visible_for(&self, raw_role: &str) -> Vec<&NavigationItem> {
        match Role::parse(raw_role) {
            Some(role) => self.visible_for_role(role),
            None => {
                tracing::debug!(role = raw_role, "unknown role, empty navigation");
                Vec::new()
            }
        }
    }

    /// Whether `role` may see the item at exactly `path`. Paths not in the
    /// table are not permitted.
    pub fn permits(&self, role: Role, path: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.path() == path && item.allows(role))
    }
}

impl Default for NavigationTable {
    fn default() -> Self {
        Self::dashboard()
    }
}
