//! Configuration resolution for Bounty.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/bounty/settings.json`)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables (`BOUNTY_*`)
//! 5. CLI arguments (applied by the binaries, highest priority)
//!
//! File layers are deep-merged as JSON, so a file only needs the keys it
//! wants to change.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::UiSettings;

/// Complete Bounty configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Presentation defaults; `no_show_timer_seconds` also drives the lifecycle.
    #[serde(default)]
    pub ui: UiSettings,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
    /// Server-side countdown interval. `0` leaves ticking to clients.
    pub tick_interval_secs: u64,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_path: None,
            log_level: "info".to_string(),
            log_json: false,
            tick_interval_secs: 0,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut merged = serde_json::to_value(Config::default())?;

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            debug!(path = %global_path.display(), "Loading global config");
            merge_json(&mut merged, read_config_file(&global_path)?);
        }
    }

    if let Some(path) = explicit {
        debug!(path = %path.display(), "Loading config file");
        merge_json(&mut merged, read_config_file(path)?);
    }

    let mut config: Config = serde_json::from_value(merged)
        .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bounty").join("settings.json"))
}

/// Get the default database path for the server.
pub fn database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("bounty").join("bounty.db"))
}

fn read_config_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Recursively overlay `overlay` onto `base`; objects merge, everything else replaces.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} has an invalid value: {raw}")))
}

/// Apply `BOUNTY_*` overrides read through `lookup`.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(val) = lookup("BOUNTY_ADDR") {
        config.server.addr = parse_env("BOUNTY_ADDR", &val)?;
    }
    if let Some(val) = lookup("BOUNTY_DATABASE_PATH") {
        config.server.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("BOUNTY_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(val) = lookup("BOUNTY_LOG_JSON") {
        config.server.log_json = parse_env("BOUNTY_LOG_JSON", &val)?;
    }
    if let Some(val) = lookup("BOUNTY_TICK_INTERVAL_SECS") {
        config.server.tick_interval_secs = parse_env("BOUNTY_TICK_INTERVAL_SECS", &val)?;
    }
    if let Some(val) = lookup("BOUNTY_ALLOWED_ORIGINS") {
        config.server.allowed_origins = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(val) = lookup("BOUNTY_NO_SHOW_TIMER_SECONDS") {
        config.ui.no_show_timer_seconds = parse_env("BOUNTY_NO_SHOW_TIMER_SECONDS", &val)?;
    }
    Ok(())
}
