// adminx-acl/src/registry.rs
use crate::configs::menu_config::default_backoffice_menu;
use crate::menu::MenuNode;
use lazy_static::lazy_static;
use std::sync::{PoisonError, RwLock};

lazy_static! {
    static ref MENU_REGISTRY: RwLock<Option<Vec<MenuNode>>> = RwLock::new(None);
}

/// Register the static menu declarations for this process
pub fn register_menu(menu: Vec<MenuNode>) {
    *MENU_REGISTRY.write().unwrap_or_else(PoisonError::into_inner) = Some(menu);
}

/// The registered menu, or the built-in back-office menu when none was registered
pub fn registered_menu() -> Vec<MenuNode> {
    MENU_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(default_backoffice_menu)
}

/// Clear the registered menu (useful for testing)
pub fn clear_registry() {
    *MENU_REGISTRY.write().unwrap_or_else(PoisonError::into_inner) = None;
}
