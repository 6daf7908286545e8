// adminx-acl/src/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{info, warn};
use crate::configs::initializer::AclConfig;
use crate::filters::filter_menu;
use crate::menu::MenuNode;
use crate::models::permission_model::{Action, PermissionDocument};
use crate::models::role::Role;
use crate::utils::gate::{can, ActionFlags};
use crate::utils::jwt::{self, token_expiry};

/// Permission payload as the profile service returns it: either JSON text
/// stored verbatim, or an already embedded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPermissions {
    Text(String),
    Structured(Value),
}

impl Default for RawPermissions {
    fn default() -> Self {
        RawPermissions::Structured(Value::Null)
    }
}

impl RawPermissions {
    /// Malformed payloads are logged and become the empty document.
    pub fn into_document(self) -> PermissionDocument {
        match self {
            RawPermissions::Text(raw) => PermissionDocument::parse_or_empty(&raw),
            RawPermissions::Structured(value) => PermissionDocument::from_value_or_empty(value),
        }
    }
}

/// Response of the external profile fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub permissions: RawPermissions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Everything the engine needs about the signed-in staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSession {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub document: PermissionDocument,
    pub expires_at: DateTime<Utc>,
}

impl PermissionSession {
    /// Builds the session from a profile. Expiry comes from the bearer token
    /// when it carries one, otherwise `fallback_ttl` from now.
    pub fn from_profile(profile: UserProfile, fallback_ttl: Duration) -> Self {
        let role = Role::from_discriminator(&profile.role);
        let expires_at = profile
            .token
            .as_deref()
            .and_then(|token| match token_expiry(token) {
                Ok(expires_at) => Some(expires_at),
                Err(err) => {
                    warn!(user = %profile.email, error = %err, "⚠️  Could not read token expiry, using session timeout");
                    None
                }
            })
            .unwrap_or_else(|| Utc::now() + fallback_duration(fallback_ttl));

        let document = profile.permissions.into_document();
        info!(
            user = %profile.email,
            role = role.as_str(),
            modules = document.len(),
            "✅ Permission session initialised"
        );

        Self {
            user_id: profile.id,
            email: profile.email,
            role,
            document,
            expires_at,
        }
    }

    /// [`from_profile`](Self::from_profile) with the configured session timeout.
    pub fn from_profile_with_config(profile: UserProfile, config: &AclConfig) -> Self {
        Self::from_profile(profile, config.session_timeout)
    }

    pub fn is_expired(&self) -> bool {
        jwt::is_expired(self.expires_at)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            role: self.role,
            document: self.document.clone(),
        }
    }
}

fn fallback_duration(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(1))
}

/// Role plus document for one rendering pass.
///
/// The default value is the empty staff view, used whenever no document has
/// been loaded yet.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionView {
    pub role: Role,
    pub document: PermissionDocument,
}

impl SessionView {
    pub fn new(role: Role, document: PermissionDocument) -> Self {
        Self { role, document }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn menu(&self, tree: &[MenuNode]) -> Vec<MenuNode> {
        filter_menu(tree, &self.document, self.role)
    }

    pub fn can(&self, module_key: &str, sub_key: Option<&str>, action: Action) -> bool {
        can(&self.document, self.role, module_key, sub_key, action)
    }

    pub fn flags(&self, module_key: &str, sub_key: Option<&str>) -> ActionFlags {
        ActionFlags::resolve(&self.document, self.role, module_key, sub_key)
    }
}

/// Marks the start of a profile fetch; see [`SessionSlot::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    session: Option<PermissionSession>,
}

/// Holder of the current permission session.
///
/// Logging in or out bumps a generation counter, so a profile fetch that
/// was started before a logout cannot repopulate the slot afterwards.
#[derive(Debug, Default)]
pub struct SessionSlot {
    state: RwLock<SlotState>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&self) -> FetchTicket {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        FetchTicket { generation: state.generation }
    }

    /// Stores the result of a fetch. Returns `false` (and drops the session)
    /// when the slot was reset since `ticket` was taken.
    pub fn complete(&self, ticket: FetchTicket, session: PermissionSession) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation != ticket.generation {
            info!(user = %session.email, "Discarding permission fetch started before session reset");
            return false;
        }
        state.session = Some(session);
        true
    }

    pub fn init(&self, session: PermissionSession) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        state.session = Some(session);
    }

    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        if let Some(previous) = state.session.take() {
            info!(user = %previous.email, "🔒 Permission session cleared");
        }
    }

    /// The live session, or `None` when nothing is loaded. An expired
    /// session is cleared on the way out.
    pub fn current(&self) -> Option<PermissionSession> {
        let seen_generation = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            match state.session.as_ref() {
                None => return None,
                Some(session) if !session.is_expired() => return Some(session.clone()),
                Some(_) => state.generation,
            }
        };
        self.discard_expired(seen_generation);
        None
    }

    /// Drops the loaded session only if it is still the expired one seen at
    /// `seen_generation`; a login that raced in between is left alone.
    fn discard_expired(&self, seen_generation: u64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let still_expired = state
            .session
            .as_ref()
            .is_some_and(PermissionSession::is_expired);
        if state.generation != seen_generation || !still_expired {
            return;
        }
        state.generation += 1;
        if let Some(previous) = state.session.take() {
            info!(user = %previous.email, "⏰ Permission session expired");
        }
    }

    pub fn view(&self) -> SessionView {
        self.current()
            .map(|session| session.view())
            .unwrap_or_else(SessionView::anonymous)
    }
}
