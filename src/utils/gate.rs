// adminx-acl/src/utils/gate.rs
use serde::{Deserialize, Serialize};
use crate::models::permission_model::{Action, PermissionDocument};
use crate::models::role::Role;
use crate::utils::rbac::evaluate;

/// Page-level check behind "Add", "Edit" and "Delete" controls.
///
/// Goes through the same resolver as the menu so a control can never be
/// enabled for something the navigation hides.
pub fn can(
    document: &PermissionDocument,
    role: Role,
    module_key: &str,
    sub_key: Option<&str>,
    action: Action,
) -> bool {
    evaluate(role, document, module_key, action, sub_key)
}

/// All four flags for one module or sub-item, ready for a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionFlags {
    pub can_read: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl ActionFlags {
    pub fn resolve(
        document: &PermissionDocument,
        role: Role,
        module_key: &str,
        sub_key: Option<&str>,
    ) -> Self {
        let check = |action| can(document, role, module_key, sub_key, action);
        Self {
            can_read: check(Action::Read),
            can_create: check(Action::Create),
            can_update: check(Action::Update),
            can_delete: check(Action::Delete),
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Read => self.can_read,
            Action::Create => self.can_create,
            Action::Update => self.can_update,
            Action::Delete => self.can_delete,
        }
    }
}
