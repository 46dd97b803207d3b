//! Configuration loading and API key resolution
//!
//! Configuration is resolved in two tiers:
//! 1. Environment variables (highest priority, API key only)
//! 2. TOML config file (explicit `--config` path, or the per-user default)
//!
//! Nothing here is fatal unless the user explicitly named a config file that
//! cannot be read. An absent API key simply disables remote lookups.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the AcoustID API key
pub const ACOUSTID_API_KEY_ENV: &str = "ACOUSTID_API_KEY";

/// Directory name under the platform config dir
const APP_CONFIG_DIR: &str = "gig-preflight";

/// Bootstrap configuration read from TOML
///
/// Every field is optional; command-line arguments take precedence over
/// anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// AcoustID application API key
    #[serde(default)]
    pub acoustid_api_key: Option<String>,

    /// Path to the `fpcalc` executable
    #[serde(default)]
    pub fpcalc_path: Option<PathBuf>,

    /// Upper bound on a single `fpcalc` run, in seconds
    #[serde(default)]
    pub fingerprint_timeout_secs: Option<u64>,

    /// AcoustID request rate (requests per second)
    #[serde(default)]
    pub lookup_requests_per_second: Option<u32>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-user default config file location
///
/// `~/.config/gig-preflight/config.toml` on Linux, the equivalent
/// application-support / roaming directory elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_CONFIG_DIR).join("config.toml"))
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    Ok(toml::from_str(content)?)
}

/// Load TOML configuration
///
/// An explicitly requested file must exist and parse. Without an explicit
/// path the per-user default is tried; if it is missing or broken the
/// built-in defaults are used.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse_toml_config(&content)?;
        info!("Configuration loaded from {}", path.display());
        return Ok(config);
    }

    let Some(path) = default_config_path() else {
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    match std::fs::read_to_string(&path)
        .map_err(Error::from)
        .and_then(|content| parse_toml_config(&content))
    {
        Ok(config) => {
            info!("Configuration loaded from {}", path.display());
            Ok(config)
        }
        Err(e) => {
            warn!(
                "Ignoring unreadable default config {}: {}",
                path.display(),
                e
            );
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve the AcoustID API key
///
/// **Priority:** ENV → TOML
///
/// Returns `None` when no valid key is configured, which callers treat as
/// "lookup disabled".
pub fn resolve_acoustid_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(ACOUSTID_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .acoustid_api_key
        .as_ref()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "AcoustID API key found in both environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("AcoustID API key loaded from environment variable");
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("AcoustID API key loaded from TOML config");
        return Some(key.trim().to_string());
    }

    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
