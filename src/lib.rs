// adminx-acl/src/lib.rs

pub mod configs;
pub mod error;
pub mod filters;
pub mod helpers;
pub mod menu;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod session;
pub mod utils;

// Re-export main types for easier importing
pub use models::permission_model::{
    Action, ActionSet, CapabilityEntry, CapabilityMap, Permission, PermissionDocument,
};
pub use models::role::Role;
pub use menu::{derive_key, CapabilityKey, MenuNode, MenuNodeDecl, NodeAction};
pub use error::{AclError, MenuConfigError, PayloadError};

// Export the engine
pub use utils::rbac::{evaluate, resolve, Decision, Lookup};
pub use filters::{filter_menu, filter_menu_raw};
pub use utils::gate::{can, ActionFlags};

// Export session lifecycle
pub use session::{
    FetchTicket, PermissionSession, RawPermissions, SessionSlot, SessionView, UserProfile,
};
pub use utils::auth::{
    load_permission_session, purge_permission_session, session_view, store_permission_session,
};

// Export configuration and menu registry
pub use configs::initializer::{
    acl_initialize, load_configured_menu, setup_acl_logging, AclConfig, DEFAULT_SESSION_KEY,
};
pub use configs::menu_config::{default_backoffice_menu, load_menu_from_path, load_menu_from_str};
pub use registry::{clear_registry, register_menu, registered_menu};

// Export web integration
pub use middleware::capability_guard::{CapabilityGuard, CapabilityGuardMiddleware};
pub use helpers::template_helper::{acl_context, render_navigation, NavItem};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

pub mod prelude {
    pub use crate::{
        can,
        evaluate,
        filter_menu,
        Action,
        ActionFlags,
        AclConfig,
        CapabilityGuard,
        MenuNode,
        PermissionDocument,
        PermissionSession,
        Role,
        SessionSlot,
        SessionView,
    };
}
