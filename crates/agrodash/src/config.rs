//! Dashboard configuration.
//!
//! Loaded from environment variables at startup:
//!
//! - `AGRODASH_BIND`: address the HTTP server listens on (default: `127.0.0.1:3000`)
//! - `AGRODASH_AUTH_URL`: base URL of the authentication service (default: `http://127.0.0.1:8000`)
//! - `AGRODASH_LOGIN_PATH`: where unauthenticated users are sent (default: `/login`)
//! - `AGRODASH_PROTECTED_PREFIX`: root of the guarded pages (default: `/dashboard`)
//! - `AGRODASH_DEFAULT_LANDING`: where `/dashboard` lands (default: `/dashboard/orders`)
//! - `AGRODASH_COOKIE_MAX_AGE_SECS`: lifetime of the session cookies (default: `86400`)
//!
//! # Invariants
//!
//! - `guard.token_cookie` always equals `store.token_key`
//! - every configured path starts with `/`
//! - `guard.default_landing` lies below `guard.protected_prefix`
//! - `guard.login_path` lies outside it

use std::net::SocketAddr;

use agrodash_guard::{GuardConfig, RouteGuard};
use agrodash_session::StoreConfig;
use serde::Deserialize;

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

/// Everything needed to run the dashboard gate.
///
/// Also deserializable, for deployments that keep settings in a file;
/// missing fields take their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind: SocketAddr,
    pub auth_url: String,
    pub guard: GuardConfig,
    pub store: StoreConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], Self::DEFAULT_PORT)),
            auth_url: Self::DEFAULT_AUTH_URL.to_owned(),
            guard: GuardConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_AUTH_URL: &'static str = "http://127.0.0.1:8000";

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but invalid. Unset variables
    /// take their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the real environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("AGRODASH_BIND") {
            config.bind = value.parse().map_err(|_| {
                invalid("AGRODASH_BIND", format!("'{value}' is not a socket address"))
            })?;
        }

        if let Some(value) = lookup("AGRODASH_AUTH_URL") {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(
                    "AGRODASH_AUTH_URL",
                    format!("'{value}' is not an http(s) URL"),
                ));
            }
            config.auth_url = value;
        }

        if let Some(value) = lookup("AGRODASH_LOGIN_PATH") {
            config.guard.login_path = absolute_path("AGRODASH_LOGIN_PATH", value)?;
        }

        if let Some(value) = lookup("AGRODASH_PROTECTED_PREFIX") {
            config.guard.protected_prefix = absolute_path("AGRODASH_PROTECTED_PREFIX", value)?;
        }

        if let Some(value) = lookup("AGRODASH_DEFAULT_LANDING") {
            config.guard.default_landing = absolute_path("AGRODASH_DEFAULT_LANDING", value)?;
        }

        if let Some(value) = lookup("AGRODASH_COOKIE_MAX_AGE_SECS") {
            config.store.cookie_max_age_secs = match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(invalid(
                        "AGRODASH_COOKIE_MAX_AGE_SECS",
                        format!("'{value}' is not a positive number of seconds"),
                    ));
                }
            };
        }

        validate_guard(&config.guard)?;
        config.guard.token_cookie = config.store.token_key.clone();
        Ok(config)
    }
}

/// Rejects guard paths that would route nowhere or redirect in a loop.
pub(crate) fn validate_guard(config: &GuardConfig) -> Result<(), ConfigError> {
    let prefix = config.protected_prefix.trim_end_matches('/');
    if !prefix.starts_with('/') {
        return Err(invalid(
            "AGRODASH_PROTECTED_PREFIX",
            format!("'{}' must be a path below '/'", config.protected_prefix),
        ));
    }

    let guard = RouteGuard::new(config.clone());
    let landing = config.default_landing.trim_end_matches('/');
    if !guard.is_protected(landing) || landing == prefix {
        return Err(invalid(
            "AGRODASH_DEFAULT_LANDING",
            format!("'{}' is not a page below '{prefix}'", config.default_landing),
        ));
    }

    let login = &config.login_path;
    if !login.starts_with('/') || guard.is_protected(login) || login == "/logout" {
        return Err(invalid(
            "AGRODASH_LOGIN_PATH",
            format!("'{login}' is not a public route of its own"),
        ));
    }

    Ok(())
}

fn invalid(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_owned(),
        message,
    }
}

fn absolute_path(name: &str, value: String) -> Result<String, ConfigError> {
    if value.starts_with('/') {
        Ok(value)
    } else {
        Err(invalid(name, format!("'{value}' must start with '/'")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        DashboardConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_from_lookup_empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:3000");
        assert_eq!(config.auth_url, "http://127.0.0.1:8000");
        assert_eq!(config.guard.login_path, "/login");
        assert_eq!(config.guard.default_landing, "/dashboard/orders");
        assert_eq!(config.store.cookie_max_age_secs, 86_400);
    }

    #[test]
    fn test_from_lookup_overrides_applied() {
        let config = load(&[
            ("AGRODASH_BIND", "0.0.0.0:8080"),
            ("AGRODASH_AUTH_URL", "https://auth.agro.example"),
            ("AGRODASH_LOGIN_PATH", "/signin"),
            ("AGRODASH_DEFAULT_LANDING", "/dashboard/inventory"),
            ("AGRODASH_COOKIE_MAX_AGE_SECS", "3600"),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.auth_url, "https://auth.agro.example");
        assert_eq!(config.guard.login_path, "/signin");
        assert_eq!(config.guard.default_landing, "/dashboard/inventory");
        assert_eq!(config.store.cookie_max_age_secs, 3600);
    }

    #[test]
    fn test_from_lookup_token_cookie_follows_store_key() {
        let config = load(&[]).unwrap();
        assert_eq!(config.guard.token_cookie, config.store.token_key);
    }

    #[test]
    fn test_from_lookup_bad_bind_is_error() {
        let ConfigError::InvalidValue { name, .. } =
            load(&[("AGRODASH_BIND", "localhost")]).unwrap_err();
        assert_eq!(name, "AGRODASH_BIND");
    }

    #[test]
    fn test_from_lookup_bad_auth_url_is_error() {
        assert!(load(&[("AGRODASH_AUTH_URL", "auth.example")]).is_err());
    }

    #[test]
    fn test_from_lookup_relative_path_is_error() {
        assert!(load(&[("AGRODASH_LOGIN_PATH", "login")]).is_err());
    }

    #[test]
    fn test_from_lookup_zero_or_garbage_max_age_is_error() {
        assert!(load(&[("AGRODASH_COOKIE_MAX_AGE_SECS", "0")]).is_err());
        assert!(load(&[("AGRODASH_COOKIE_MAX_AGE_SECS", "a day")]).is_err());
    }

    #[test]
    fn test_from_lookup_custom_prefix_with_landing_below_it() {
        let config = load(&[
            ("AGRODASH_PROTECTED_PREFIX", "/app"),
            ("AGRODASH_DEFAULT_LANDING", "/app/orders"),
        ])
        .unwrap();

        assert_eq!(config.guard.protected_prefix, "/app");
        assert_eq!(config.guard.default_landing, "/app/orders");
    }

    #[test]
    fn test_from_lookup_landing_outside_prefix_is_error() {
        let ConfigError::InvalidValue { name, .. } =
            load(&[("AGRODASH_PROTECTED_PREFIX", "/app")]).unwrap_err();
        assert_eq!(name, "AGRODASH_DEFAULT_LANDING");
    }

    #[test]
    fn test_validate_guard_rejects_root_prefix() {
        let config = GuardConfig {
            protected_prefix: "/".into(),
            ..GuardConfig::default()
        };
        assert!(validate_guard(&config).is_err());
    }

    #[test]
    fn test_validate_guard_rejects_bare_prefix_as_landing() {
        let config = GuardConfig {
            default_landing: "/dashboard/".into(),
            ..GuardConfig::default()
        };
        assert!(validate_guard(&config).is_err());
    }

    #[test]
    fn test_validate_guard_rejects_login_inside_prefix() {
        let config = GuardConfig {
            login_path: "/dashboard/login".into(),
            ..GuardConfig::default()
        };
        assert!(validate_guard(&config).is_err());
    }

    #[test]
    fn test_validate_guard_accepts_defaults() {
        assert_eq!(validate_guard(&GuardConfig::default()), Ok(()));
    }

    #[test]
    fn test_deserialize_partial_fills_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"bind":"0.0.0.0:9000","guard":{"login_path":"/in"}}"#).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.guard.login_path, "/in");
        assert_eq!(config.auth_url, DashboardConfig::DEFAULT_AUTH_URL);
    }

    #[test]
    fn test_config_error_display() {
        let error = invalid("AGRODASH_BIND", "bad value".into());
        assert_eq!(error.to_string(), "invalid value for AGRODASH_BIND: bad value");
    }
}
