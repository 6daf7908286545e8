// adminx-acl/src/utils/auth.rs
use actix_session::Session;
use actix_web::Error;
use tracing::{info, warn};
use crate::session::{PermissionSession, SessionView};

/// Stores the permission session in the cookie session on login.
pub fn store_permission_session(
    session: &Session,
    key: &str,
    permission_session: &PermissionSession,
) -> Result<(), Error> {
    session.insert(key, permission_session)?;
    Ok(())
}

/// Loads the stored permission session. Expired or unreadable entries are
/// removed and reported as absent.
pub fn load_permission_session(session: &Session, key: &str) -> Option<PermissionSession> {
    match session.get::<PermissionSession>(key) {
        Ok(Some(stored)) if !stored.is_expired() => Some(stored),
        Ok(Some(stored)) => {
            info!(user = %stored.email, "⏰ Stored permission session expired");
            session.remove(key);
            None
        }
        Ok(None) => None,
        Err(err) => {
            warn!(error = %err, "⚠️  Unreadable permission session in cookie, discarding");
            session.remove(key);
            None
        }
    }
}

/// Drops the permission session on logout.
pub fn purge_permission_session(session: &Session, key: &str) {
    if session.remove(key).is_some() {
        info!("🔒 Permission session removed from cookie session");
    }
}

pub fn session_view(session: &Session, key: &str) -> SessionView {
    load_permission_session(session, key)
        .map(|stored| stored.view())
        .unwrap_or_else(SessionView::anonymous)
}
