//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.handdown/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HanddownConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Full base URL; wins over scheme/host/port when set.
    pub base_url: Option<String>,
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MessagingConfig {
    pub poll_interval_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_HOST: &str = "192.168.0.134";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// Lower bound for the message poll so a typo can't hammer the backend.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

pub const ENV_BASE_URL: &str = "HANDDOWN_BASE_URL";
pub const ENV_USER_ID: &str = "HANDDOWN_USER_ID";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    /// `None` until someone logs in or passes `--user`.
    pub user_id: Option<String>,
    pub poll_interval: Duration,
}

/// Values given on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub user_id: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.handdown`, where config and identity live.
pub fn handdown_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".handdown"))
}

/// Returns the path to `~/.handdown/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    handdown_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.handdown/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `HanddownConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<HanddownConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_at(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(HanddownConfig::default())
        }
    }
}

pub fn load_config_at(path: &Path) -> Result<HanddownConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(HanddownConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: HanddownConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Handdown Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://192.168.0.134:8000"   # Or set HANDDOWN_BASE_URL; wins over the fields below
# scheme = "http"
# host = "192.168.0.134"
# port = 8000

# [messaging]
# poll_interval_ms = 1000                  # How often an open conversation is refreshed
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `stored_user_id` is the identifier saved by `handdown login`; it sits
/// below the env var and the `--user` flag.
pub fn resolve(
    config: &HanddownConfig,
    cli: &CliOverrides,
    stored_user_id: Option<String>,
) -> ResolvedConfig {
    resolve_with_env(config, cli, stored_user_id, |key| std::env::var(key).ok())
}

fn resolve_with_env(
    config: &HanddownConfig,
    cli: &CliOverrides,
    stored_user_id: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env(ENV_BASE_URL))
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| server_url(&config.server));

    // User: CLI → env → stored identity
    let user_id = cli
        .user_id
        .clone()
        .or_else(|| env(ENV_USER_ID))
        .or(stored_user_id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let poll_ms = config
        .messaging
        .poll_interval_ms
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
        .max(MIN_POLL_INTERVAL_MS);

    ResolvedConfig {
        base_url,
        user_id,
        poll_interval: Duration::from_millis(poll_ms),
    }
}

/// Builds `scheme://host:port` from the individual server fields.
fn server_url(server: &ServerConfig) -> String {
    format!(
        "{}://{}:{}",
        server.scheme.as_deref().unwrap_or(DEFAULT_SCHEME),
        server.host.as_deref().unwrap_or(DEFAULT_HOST),
        server.port.unwrap_or(DEFAULT_PORT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved =
            resolve_with_env(&HanddownConfig::default(), &CliOverrides::default(), None, no_env);
        assert_eq!(resolved.base_url, "http://192.168.0.134:8000");
        assert_eq!(resolved.user_id, None);
        assert_eq!(resolved.poll_interval, Duration::from_millis(1000));
    }

    #[test]
    fn test_server_fields_build_url() {
        let config = HanddownConfig {
            server: ServerConfig {
                host: Some("10.0.0.5".to_string()),
                port: Some(9000),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), None, no_env);
        assert_eq!(resolved.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn test_full_base_url_wins_over_fields() {
        let config = HanddownConfig {
            server: ServerConfig {
                base_url: Some("https://market.campus.edu/api".to_string()),
                host: Some("ignored".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), None, no_env);
        assert_eq!(resolved.base_url, "https://market.campus.edu/api");
    }

    #[test]
    fn test_env_beats_file_and_cli_beats_env() {
        let config = HanddownConfig {
            server: ServerConfig {
                base_url: Some("http://file:1".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            ENV_BASE_URL => Some("http://env:2".to_string()),
            ENV_USER_ID => Some("env-user".to_string()),
            _ => None,
        };

        let resolved =
            resolve_with_env(&config, &CliOverrides::default(), Some("stored".to_string()), env);
        assert_eq!(resolved.base_url, "http://env:2");
        assert_eq!(resolved.user_id.as_deref(), Some("env-user"));

        let cli = CliOverrides {
            base_url: Some("http://cli:3".to_string()),
            user_id: Some("cli-user".to_string()),
        };
        let resolved = resolve_with_env(&config, &cli, Some("stored".to_string()), env);
        assert_eq!(resolved.base_url, "http://cli:3");
        assert_eq!(resolved.user_id.as_deref(), Some("cli-user"));
    }

    #[test]
    fn test_stored_user_is_the_fallback() {
        let resolved = resolve_with_env(
            &HanddownConfig::default(),
            &CliOverrides::default(),
            Some("u42".to_string()),
            no_env,
        );
        assert_eq!(resolved.user_id.as_deref(), Some("u42"));
    }

    #[test]
    fn test_blank_user_counts_as_missing() {
        let cli = CliOverrides {
            user_id: Some("   ".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with_env(&HanddownConfig::default(), &cli, None, no_env);
        assert_eq!(resolved.user_id, None);
    }

    #[test]
    fn test_poll_interval_has_a_floor() {
        let config = HanddownConfig {
            messaging: MessagingConfig {
                poll_interval_ms: Some(5),
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), None, no_env);
        assert_eq!(resolved.poll_interval, Duration::from_millis(MIN_POLL_INTERVAL_MS));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[messaging]
poll_interval_ms = 2500
"#;
        let config: HanddownConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.messaging.poll_interval_ms, Some(2500));
        assert!(config.server.base_url.is_none());
        assert!(config.server.port.is_none());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(load_config_at(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = load_config_at(&path).unwrap();
        assert!(config.server.base_url.is_none());

        // The generated file is all comments, so it loads as defaults too.
        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.contains("poll_interval_ms"));
        assert!(load_config_at(&path).is_ok());
    }
}
