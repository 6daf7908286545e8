// adminx-acl/src/menu.rs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Titles that stay visible whatever the role or permission document.
pub const ALWAYS_VISIBLE_KEYS: &[&str] = &["Dashboard"];

/// Strips every whitespace character from a menu title.
pub fn derive_key(title: &str) -> String {
    title.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Capability key of a menu node: the declared `permissionKey` when there
/// is one, otherwise the title with whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityKey {
    declared: Option<String>,
    derived: String,
}

impl CapabilityKey {
    pub fn new(title: &str, declared: Option<String>) -> Self {
        Self {
            declared: declared.filter(|key| !key.trim().is_empty()),
            derived: derive_key(title),
        }
    }

    pub fn declared(&self) -> Option<&str> {
        self.declared.as_deref()
    }

    pub fn derived(&self) -> &str {
        &self.derived
    }

    pub fn effective(&self) -> &str {
        self.declared.as_deref().unwrap_or(&self.derived)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeAction {
    Logout,
}

/// One navigable entry of the back-office sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MenuNodeDecl", into = "MenuNodeDecl")]
pub struct MenuNode {
    pub title: String,
    pub icon: Option<String>,
    pub link: Option<String>,
    pub key: CapabilityKey,
    pub is_header: bool,
    pub action: Option<NodeAction>,
    pub children: Option<Vec<MenuNode>>,
}

impl MenuNode {
    pub fn item(title: &str, icon: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            icon: Some(icon.to_string()),
            link: Some(link.to_string()),
            key: CapabilityKey::new(title, None),
            is_header: false,
            action: None,
            children: None,
        }
    }

    pub fn header(title: &str) -> Self {
        Self {
            title: title.to_string(),
            icon: None,
            link: None,
            key: CapabilityKey::new(title, None),
            is_header: true,
            action: None,
            children: None,
        }
    }

    pub fn logout(title: &str, icon: &str) -> Self {
        Self {
            title: title.to_string(),
            icon: Some(icon.to_string()),
            link: None,
            key: CapabilityKey::new(title, None),
            is_header: false,
            action: Some(NodeAction::Logout),
            children: None,
        }
    }

    pub fn with_permission_key(mut self, key: &str) -> Self {
        self.key = CapabilityKey::new(&self.title, Some(key.to_string()));
        self
    }

    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn capability_key(&self) -> &str {
        self.key.effective()
    }

    pub fn is_always_visible(&self) -> bool {
        self.action == Some(NodeAction::Logout)
            || ALWAYS_VISIBLE_KEYS
                .iter()
                .any(|key| self.key.derived() == *key || self.key.effective() == *key)
    }
}

/// Wire shape of a menu declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuNodeDecl {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_key: Option<String>,
    #[serde(default)]
    pub is_header: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<NodeAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Vec<MenuNodeDecl>>,
}

impl From<MenuNodeDecl> for MenuNode {
    fn from(decl: MenuNodeDecl) -> Self {
        Self {
            key: CapabilityKey::new(&decl.title, decl.permission_key),
            title: decl.title,
            icon: decl.icon,
            link: decl.link,
            is_header: decl.is_header,
            action: decl.action,
            children: decl
                .child
                .map(|children| children.into_iter().map(MenuNode::from).collect()),
        }
    }
}

impl From<MenuNode> for MenuNodeDecl {
    fn from(node: MenuNode) -> Self {
        Self {
            permission_key: node.key.declared().map(str::to_string),
            title: node.title,
            icon: node.icon,
            link: node.link,
            is_header: node.is_header,
            action: node.action,
            child: node
                .children
                .map(|children| children.into_iter().map(MenuNodeDecl::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derived_key_strips_all_whitespace() {
        assert_eq!(derive_key("Tax Settings"), "TaxSettings");
        assert_eq!(derive_key("  Top up\tHistory \n"), "TopupHistory");
        assert_eq!(derive_key("Member"), "Member");
    }

    #[test]
    fn test_declared_key_wins_over_derived() {
        let key = CapabilityKey::new("Tax Settings", Some("Tax".into()));
        assert_eq!(key.declared(), Some("Tax"));
        assert_eq!(key.derived(), "TaxSettings");
        assert_eq!(key.effective(), "Tax");

        let blank = CapabilityKey::new("Tax Settings", Some("  ".into()));
        assert_eq!(blank.effective(), "TaxSettings");
    }

    #[test]
    fn test_always_visible_nodes() {
        assert!(MenuNode::item("Dashboard", "home", "/dashboard").is_always_visible());
        assert!(MenuNode::logout("Sign out", "logout").is_always_visible());
        assert!(!MenuNode::item("Member", "users", "/members").is_always_visible());
    }

    #[test]
    fn test_menu_declaration_wire_shape() {
        let node: MenuNode = serde_json::from_value(json!({
            "title": "Tax Settings",
            "icon": "percent",
            "link": "/tax",
            "child": [
                {"title": "Tax Rates", "permissionKey": "TaxRate"}
            ]
        }))
        .unwrap();

        assert_eq!(node.capability_key(), "TaxSettings");
        assert!(!node.is_header);
        let children = node.children.as_ref().unwrap();
        assert_eq!(children[0].capability_key(), "TaxRate");
        assert_eq!(children[0].key.derived(), "TaxRates");

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["child"][0]["permissionKey"], "TaxRate");
        assert!(back.get("permissionKey").is_none());
        assert_eq!(back["isHeader"], false);
    }

    #[test]
    fn test_logout_action_parsed() {
        let node: MenuNode =
            serde_json::from_value(json!({"title": "Logout", "action": "logout"})).unwrap();
        assert_eq!(node.action, Some(NodeAction::Logout));
        assert!(node.is_always_visible());
    }
}
