use agrodash_protocol::Role;

use crate::NavigationItem;

/// Returns the items whose role set contains `role`, in declaration order.
///
/// Pure: no I/O, no logging, no allocation beyond the returned vector.
///
/// ```
/// use agrodash_access::{NavigationItem, visible_items};
/// use agrodash_protocol::Role;
///
/// let items = vec![
///     NavigationItem::new("/admin", "Admin", "shield", [Role::Admin]).unwrap(),
///     NavigationItem::new("/sales", "Sales", "cart", [Role::Manager]).unwrap(),
/// ];
///
/// let visible = visible_items(Role::Admin, &items);
/// assert_eq!(visible.len(), 1);
/// assert_eq!(visible[0].path(), "/admin");
/// ```
pub fn visible_items(role: Role, items: &[NavigationItem]) -> Vec<&NavigationItem> {
    items.iter().filter(|item| item.allows(role)).collect()
}
