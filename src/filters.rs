// adminx-acl/src/filters.rs
use crate::menu::MenuNode;
use crate::models::permission_model::{Action, PermissionDocument};
use crate::models::role::Role;
use crate::utils::rbac::evaluate;
use tracing::debug;

/// Returns the part of `tree` the given role may see. The input is never
/// modified and surviving siblings keep their order.
///
/// - Headers pass through untouched.
/// - Always-visible nodes (Dashboard, logout) are kept; their children are
///   still filtered.
/// - Every other node needs `read` on its own key. A hidden parent hides its
///   whole subtree; a visible parent may end up with no children.
/// - Top-level nodes are checked as modules, nested nodes as sub-items of
///   their immediate parent's key.
pub fn filter_menu(tree: &[MenuNode], document: &PermissionDocument, role: Role) -> Vec<MenuNode> {
    filter_level(tree, document, role, None)
}

/// Parses `raw_payload` (falling back to an empty document when it is
/// malformed) and filters `tree` against it.
pub fn filter_menu_raw(tree: &[MenuNode], raw_payload: &str, role: Role) -> Vec<MenuNode> {
    let document = PermissionDocument::parse_or_empty(raw_payload);
    filter_menu(tree, &document, role)
}

fn filter_level(
    nodes: &[MenuNode],
    document: &PermissionDocument,
    role: Role,
    parent_key: Option<&str>,
) -> Vec<MenuNode> {
    nodes
        .iter()
        .filter_map(|node| filter_node(node, document, role, parent_key))
        .collect()
}

fn filter_node(
    node: &MenuNode,
    document: &PermissionDocument,
    role: Role,
    parent_key: Option<&str>,
) -> Option<MenuNode> {
    let key = node.capability_key();
    if !node.is_header && !node.is_always_visible() {
        let visible = match parent_key {
            None => evaluate(role, document, key, Action::Read, None),
            Some(parent) => evaluate(role, document, parent, Action::Read, Some(key)),
        };
        if !visible {
            debug!(title = %node.title, key, "menu node hidden");
            return None;
        }
    }

    // Header sections group siblings, so their children sit at the header's own level.
    let child_parent = if node.is_header { parent_key } else { Some(key) };
    let children = node
        .children
        .as_ref()
        .map(|children| filter_level(children, document, role, child_parent));

    Some(MenuNode {
        children,
        ..node.clone()
    })
}
