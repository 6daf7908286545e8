// adminx-acl/src/configs/initializer.rs
use log::{debug, info, warn};
use anyhow::Result;
use env_logger::Env;
use std::path::PathBuf;
use std::sync::Once;
use std::{env, time::Duration};
use crate::configs::menu_config::{default_backoffice_menu, load_menu_from_path};
use crate::menu::MenuNode;
use crate::registry::register_menu;

pub const DEFAULT_SESSION_KEY: &str = "adminx_acl";
const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 86400;

static LOGGING: Once = Once::new();

#[derive(Debug, Clone)]
pub struct AclConfig {
    pub environment: String,
    pub log_level: String,
    pub session_timeout: Duration,
    pub menu_path: Option<PathBuf>,
    pub session_key: String,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            session_timeout: Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS),
            menu_path: None,
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

impl AclConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let session_timeout = match lookup("SESSION_TIMEOUT") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    warn!("⚠️  SESSION_TIMEOUT '{}' is not a number of seconds, using {}", raw, DEFAULT_SESSION_TIMEOUT_SECS);
                    defaults.session_timeout
                }
            },
            None => defaults.session_timeout,
        };

        Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            session_timeout,
            menu_path: lookup("ADMINX_MENU_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            session_key: lookup("ADMINX_ACL_SESSION_KEY")
                .filter(|k| !k.trim().is_empty())
                .unwrap_or(defaults.session_key),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

pub fn setup_acl_logging(config: &AclConfig) {
    LOGGING.call_once(|| {
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or(&config.log_level))
            .format_timestamp_millis()
            .try_init();

        info!("✅ AdminX ACL logging initialized");
        info!("🔧 AdminX ACL environment: {}", config.environment);
        debug!("🔍 AdminX ACL debug logging active");
    });
}

/// Menu declarations for this process: the file at `menu_path` when set,
/// the built-in back-office menu otherwise.
pub fn load_configured_menu(config: &AclConfig) -> Result<Vec<MenuNode>> {
    match &config.menu_path {
        Some(path) => {
            let menu = load_menu_from_path(path)?;
            info!("📋 Loaded {} menu entries from {}", menu.len(), path.display());
            Ok(menu)
        }
        None => Ok(default_backoffice_menu()),
    }
}

/// Loads the configured menu into the global registry.
pub fn acl_initialize(config: &AclConfig) -> Result<usize> {
    let menu = load_configured_menu(config)?;
    let count = menu.len();
    register_menu(menu);
    info!("AdminX ACL initialized with {} top-level menu entries", count);
    Ok(count)
}
