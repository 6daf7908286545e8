// adminx-acl/src/helpers/template_helper.rs
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::error;
use crate::menu::{MenuNode, NodeAction};
use crate::session::SessionView;

const NAVIGATION_TEMPLATE: &str = r#"<nav class="adminx-sidebar">
  <ul>
  {%- for item in menus %}
    {%- if item.header %}
    <li class="menu-header">{{ item.title }}</li>
    {%- elif item.logout %}
    <li><a class="logout" href="{{ item.link }}">{{ item.title }}</a></li>
    {%- else %}
    <li><a href="{{ item.link }}">{% if item.icon %}<i class="icon-{{ item.icon }}"></i> {% endif %}{{ item.title }}</a>
      {%- if item.children %}
      <ul>
        {%- for sub in item.children %}
        <li><a href="{{ sub.link }}">{{ sub.title }}</a></li>
        {%- endfor %}
      </ul>
      {%- endif %}
    </li>
    {%- endif %}
  {%- endfor %}
  </ul>
</nav>
"#;

const LOGOUT_LINK: &str = "/adminx/logout";

pub static ACL_TEMPLATES: Lazy<Arc<Tera>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template("navigation.html", NAVIGATION_TEMPLATE)
        .unwrap_or_else(|e| panic!("Failed to add navigation.html: {}", e));
    Arc::new(tera)
});

/// Flattened menu entry for templates; every field is always present.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub title: String,
    pub icon: String,
    pub link: String,
    pub header: bool,
    pub logout: bool,
    pub children: Vec<NavItem>,
}

impl From<&MenuNode> for NavItem {
    fn from(node: &MenuNode) -> Self {
        let logout = node.action == Some(NodeAction::Logout);
        let default_link = if logout { LOGOUT_LINK } else { "#" };
        Self {
            title: node.title.clone(),
            icon: node.icon.clone().unwrap_or_default(),
            link: node.link.clone().unwrap_or_else(|| default_link.to_string()),
            header: node.is_header,
            logout,
            children: node
                .children
                .iter()
                .flatten()
                .map(NavItem::from)
                .collect(),
        }
    }
}

/// Template context with the filtered menu and, when `module_key` is
/// given, the action flags used to toggle Add/Edit/Delete controls.
pub fn acl_context(view: &SessionView, tree: &[MenuNode], module_key: Option<&str>) -> Context {
    let menus: Vec<NavItem> = view.menu(tree).iter().map(NavItem::from).collect();

    let mut ctx = Context::new();
    ctx.insert("menus", &menus);
    ctx.insert("is_admin", &view.is_admin());
    ctx.insert("user_role", view.role.as_str());
    if let Some(module) = module_key {
        ctx.insert("module_key", module);
        ctx.insert("flags", &view.flags(module, None));
    }
    ctx
}

pub fn render_navigation(view: &SessionView, tree: &[MenuNode]) -> Result<String, tera::Error> {
    let tera = Arc::clone(&ACL_TEMPLATES);
    let ctx = acl_context(view, tree, None);
    tera.render("navigation.html", &ctx).map_err(|err| {
        error!("Template render error for navigation.html: {:?}", err);
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::menu_config::default_backoffice_menu;
    use crate::models::permission_model::PermissionDocument;
    use crate::models::role::Role;

    fn staff(raw: &str) -> SessionView {
        SessionView::new(Role::StaffWithPermissions, PermissionDocument::parse(raw).unwrap())
    }

    #[test]
    fn test_navigation_for_staff() {
        let view = staff(
            r#"{"Member": {}, "Topup": {"subItems": {"TopupHistory": {"read": true}}}}"#,
        );
        let html = render_navigation(&view, &default_backoffice_menu()).unwrap();

        assert!(html.contains("Dashboard"));
        assert!(html.contains(r#"href="&#x2F;adminx&#x2F;members""#));
        assert!(html.contains("Topup History"));
        assert!(!html.contains("Topup Requests"));
        assert!(!html.contains("Outlets"));
        assert!(html.contains(r#"<a class="logout" href="&#x2F;adminx&#x2F;logout">Logout</a>"#));
    }

    #[test]
    fn test_navigation_for_empty_document() {
        let html = render_navigation(&SessionView::anonymous(), &default_backoffice_menu()).unwrap();
        assert!(html.contains("Dashboard"));
        assert!(html.contains("Logout"));
        assert!(!html.contains("Member"));
        assert!(!html.contains("Tax Settings"));
    }

    #[test]
    fn test_menu_text_is_escaped() {
        let menu = vec![MenuNode::item("<b>Promo</b>", "tag", "/promo?a=1&b=\"2\"")];
        let view = SessionView::new(Role::Admin, PermissionDocument::empty());
        let html = render_navigation(&view, &menu).unwrap();

        assert!(html.contains("&lt;b&gt;Promo&lt;&#x2F;b&gt;"));
        assert!(html.contains("href=\"&#x2F;promo?a=1&amp;b=&quot;2&quot;\""));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_context_flags() {
        let view = staff(r#"{"Member": {"create": true, "update": false}}"#);
        let ctx = acl_context(&view, &default_backoffice_menu(), Some("Member"));
        let json = ctx.into_json();

        assert_eq!(json["flags"]["can_create"], true);
        assert_eq!(json["flags"]["can_update"], false);
        assert_eq!(json["flags"]["can_delete"], true);
        assert_eq!(json["is_admin"], false);
        assert_eq!(json["user_role"], "staff");
    }
}
