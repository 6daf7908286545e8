// adminx-acl/src/utils/rbac.rs
use crate::models::permission_model::{Action, Permission, PermissionDocument};
use crate::models::role::Role;
use tracing::{debug, trace};

/// How the capability entry behind a decision was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// `document[module]` or `document[module].subItems[sub]`.
    Direct,
    /// Found under some other entry's sub-items.
    SecondaryScan,
}

/// Outcome of a single capability check, before it is collapsed to a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    AdminBypass,
    Explicit { granted: bool, via: Lookup },
    /// The entry exists but is silent on the action; treated as permitted.
    Unspecified { via: Lookup },
    /// No entry matched the key; treated as denied.
    Unresolved,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        match self {
            Decision::AdminBypass => true,
            Decision::Explicit { granted, .. } => *granted,
            Decision::Unspecified { .. } => true,
            Decision::Unresolved => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Decision::AdminBypass => "admin-bypass",
            Decision::Explicit { granted: true, .. } => "granted",
            Decision::Explicit { granted: false, .. } => "denied",
            Decision::Unspecified { .. } => "unspecified",
            Decision::Unresolved => "unresolved",
        }
    }
}

/// Resolves `action` on `module_key` (or on `sub_key` below it).
///
/// Admin is checked before the document is touched, so an admin session
/// never needs a populated document. For staff:
/// - no `sub_key`: the module entry decides; a missing entry is `Unresolved`.
/// - with `sub_key`: `document[module].subItems[sub]` first, then every
///   entry's sub-items in document order (first match wins).
///
/// An absent flag on a matched entry is `Unspecified`, which permits.
pub fn resolve(
    role: Role,
    document: &PermissionDocument,
    module_key: &str,
    action: Action,
    sub_key: Option<&str>,
) -> Decision {
    if role.is_admin() {
        return Decision::AdminBypass;
    }

    let matched = match sub_key {
        None => document.get(module_key).map(|entry| (entry, Lookup::Direct)),
        Some(sub) => document
            .get(module_key)
            .and_then(|entry| entry.sub_item(sub))
            .map(|entry| (entry, Lookup::Direct))
            .or_else(|| {
                document
                    .find_sub_item(sub)
                    .map(|(_, entry)| (entry, Lookup::SecondaryScan))
            }),
    };

    let decision = match matched {
        None => Decision::Unresolved,
        Some((entry, via)) => match entry.actions.get(action) {
            Permission::Granted => Decision::Explicit { granted: true, via },
            Permission::Denied => Decision::Explicit { granted: false, via },
            Permission::Unspecified => Decision::Unspecified { via },
        },
    };

    match decision {
        Decision::Unresolved => debug!(
            module_key,
            sub_key = sub_key.unwrap_or(""),
            action = action.as_str(),
            "🔎 capability key unresolved, denying"
        ),
        _ => trace!(
            module_key,
            sub_key = sub_key.unwrap_or(""),
            action = action.as_str(),
            decision = decision.label(),
            "capability resolved"
        ),
    }

    decision
}

pub fn evaluate(
    role: Role,
    document: &PermissionDocument,
    module_key: &str,
    action: Action,
    sub_key: Option<&str>,
) -> bool {
    resolve(role, document, module_key, action, sub_key).is_allowed()
}
