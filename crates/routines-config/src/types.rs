//! Configuration types.
//!
//! ```toml
//! [server]
//! base_url = "https://routines.example.com"
//! timeout_secs = 10
//!
//! [health]
//! poll_interval_secs = 30
//!
//! [auth]
//! token_env = "ROUTINES_TOKEN"
//! token_file = "~/.config/routines/token"
//! ```
//!
//! Every field is optional so that config layers can be merged field by
//! field. Accessors fill in defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default health poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Environment variable read for the bearer token unless configured otherwise.
pub const DEFAULT_TOKEN_ENV: &str = "ROUTINES_TOKEN";

/// Overrides `server.base_url`.
pub const API_URL_ENV: &str = "ROUTINES_API_URL";

/// Overrides `auth.token_file`.
pub const TOKEN_FILE_ENV: &str = "ROUTINES_TOKEN_FILE";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutinesConfig {
    pub server: ServerConfig,
    pub health: HealthConfig,
    pub auth: AuthConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// API base URL.
    pub base_url: Option<String>,
    /// Per-request timeout. Zero disables it.
    pub timeout_secs: Option<u64>,
}

/// `[health]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub poll_interval_secs: Option<u64>,
}

/// `[auth]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Environment variable holding the bearer token.
    pub token_env: Option<String>,
    /// File holding the bearer token. Takes precedence over `token_env`.
    pub token_file: Option<PathBuf>,
}

/// Where the bearer token should be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Env(String),
    File(PathBuf),
}

impl RoutinesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: RoutinesConfig) {
        overlay(&mut self.server.base_url, other.server.base_url);
        overlay(&mut self.server.timeout_secs, other.server.timeout_secs);
        overlay(
            &mut self.health.poll_interval_secs,
            other.health.poll_interval_secs,
        );
        overlay(&mut self.auth.token_env, other.auth.token_env);
        overlay(&mut self.auth.token_file, other.auth.token_file);
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using a custom variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.server.base_url = Some(url);
        }
        if let Some(path) = lookup(TOKEN_FILE_ENV).filter(|v| !v.is_empty()) {
            self.auth.token_file = Some(PathBuf::from(path));
        }
    }

    pub fn base_url(&self) -> &str {
        self.server.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.health
                .poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )
    }

    pub fn token_source(&self) -> TokenSource {
        match &self.auth.token_file {
            Some(path) => TokenSource::File(expand_home(path)),
            None => TokenSource::Env(
                self.auth
                    .token_env
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string()),
            ),
        }
    }
}

fn overlay<T>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &std::path::Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RoutinesConfig::new();
        assert_eq!(config.base_url(), "http://127.0.0.1:8000");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(
            config.token_source(),
            TokenSource::Env("ROUTINES_TOKEN".to_string())
        );
    }

    #[test]
    fn test_parse_toml() {
        let config = RoutinesConfig::from_toml(
            r#"
[server]
base_url = "https://api.example.com"
timeout_secs = 5

[health]
poll_interval_secs = 10

[auth]
token_file = "/run/secrets/token"
"#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "https://api.example.com");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(
            config.token_source(),
            TokenSource::File(PathBuf::from("/run/secrets/token"))
        );
    }

    #[test]
    fn test_merge_is_field_by_field() {
        let mut base = RoutinesConfig::from_toml(
            r#"
[server]
base_url = "http://base"
timeout_secs = 5
"#,
        )
        .unwrap();
        let top = RoutinesConfig::from_toml(
            r#"
[server]
base_url = "http://top"
"#,
        )
        .unwrap();

        base.merge(top);
        assert_eq!(base.base_url(), "http://top");
        assert_eq!(base.server.timeout_secs, Some(5));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RoutinesConfig::from_toml(
            r#"
[server]
base_url = "http://from-file"
"#,
        )
        .unwrap();

        config.apply_env_with(|key| match key {
            API_URL_ENV => Some("http://from-env:9000".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url(), "http://from-env:9000");
        assert!(config.auth.token_file.is_none());
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let mut config = RoutinesConfig::new();
        config.apply_env_with(|_| Some(String::new()));
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_token_file_env_beats_token_env() {
        let mut config = RoutinesConfig::from_toml(
            r#"
[auth]
token_env = "MY_TOKEN"
"#,
        )
        .unwrap();
        assert_eq!(config.token_source(), TokenSource::Env("MY_TOKEN".to_string()));

        config.apply_env_with(|key| match key {
            TOKEN_FILE_ENV => Some("/run/secrets/routines".to_string()),
            _ => None,
        });
        assert_eq!(
            config.token_source(),
            TokenSource::File(PathBuf::from("/run/secrets/routines"))
        );
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_timeout_is_passed_through() {
        let config = RoutinesConfig::from_toml("[server]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(config.timeout(), Duration::ZERO);
    }
}
