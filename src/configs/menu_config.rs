// adminx-acl/src/configs/menu_config.rs
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use crate::error::MenuConfigError;
use crate::menu::MenuNode;

static BACKOFFICE_MENU: Lazy<Vec<MenuNode>> = Lazy::new(|| {
    vec![
        MenuNode::item("Dashboard", "home", "/adminx/dashboard"),
        MenuNode::header("Management"),
        MenuNode::item("Member", "users", "/adminx/members"),
        MenuNode::item("Category", "grid", "/adminx/categories"),
        MenuNode::item("Outlets", "store", "/adminx/outlets").with_children(vec![
            MenuNode::item("Outlet List", "list", "/adminx/outlets"),
            MenuNode::item("New Outlet", "plus", "/adminx/outlets/create"),
        ]),
        MenuNode::item("Discount", "tag", "/adminx/discounts"),
        MenuNode::header("Settings"),
        MenuNode::item("Tax Settings", "percent", "/adminx/tax"),
        MenuNode::item("Users", "shield", "/adminx/users"),
        MenuNode::item("Topup", "wallet", "/adminx/topup").with_children(vec![
            MenuNode::item("Topup Requests", "inbox", "/adminx/topup/requests"),
            MenuNode::item("Topup History", "clock", "/adminx/topup/history"),
        ]),
        MenuNode::logout("Logout", "log-out"),
    ]
});

/// Sidebar of the restaurant back-office.
pub fn default_backoffice_menu() -> Vec<MenuNode> {
    BACKOFFICE_MENU.clone()
}

pub fn load_menu_from_str(raw: &str) -> Result<Vec<MenuNode>, MenuConfigError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn load_menu_from_path(path: impl AsRef<Path>) -> Result<Vec<MenuNode>, MenuConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| MenuConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_menu_from_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_menu_shape() {
        let menu = default_backoffice_menu();
        assert_eq!(menu.first().unwrap().title, "Dashboard");
        assert!(menu.last().unwrap().is_always_visible());

        let keys: Vec<&str> = menu
            .iter()
            .filter(|n| !n.is_header)
            .map(|n| n.capability_key())
            .collect();
        assert!(keys.contains(&"TaxSettings"));
        assert!(keys.contains(&"Topup"));
    }

    #[test]
    fn test_load_menu_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"title": "Dashboard", "icon": "home", "link": "/"}},
                {{"title": "Reports", "isHeader": true}},
                {{"title": "Sales Report", "permissionKey": "Sales", "child": [{{"title": "Daily"}}]}},
                {{"title": "Logout", "action": "logout"}}
            ]"#
        )
        .unwrap();

        let menu = load_menu_from_path(file.path()).unwrap();
        assert_eq!(menu.len(), 4);
        assert!(menu[1].is_header);
        assert_eq!(menu[2].capability_key(), "Sales");
        assert_eq!(menu[2].children.as_ref().unwrap()[0].capability_key(), "Daily");
    }

    #[test]
    fn test_load_menu_errors() {
        assert!(matches!(
            load_menu_from_path("/definitely/not/here/menu.json"),
            Err(MenuConfigError::Io { .. })
        ));
        assert!(matches!(
            load_menu_from_str(r#"[{"icon": "no title"}]"#),
            Err(MenuConfigError::Invalid(_))
        ));
    }
}
