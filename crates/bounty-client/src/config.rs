//! CLI configuration management.
//!
//! Persists the server URL, the saved role preference and a worker override
//! to `~/.bounty/config.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use bounty_core::model::Role;

/// Server used when nothing is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Persistent CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Role picked with `bounty role`; wins over the server default on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Worker to act as instead of the server's `currentWorkerId`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_worker_id: Option<String>,
}

impl ClientConfig {
    /// Path to the config directory: `~/.bounty/`.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".bounty"))
    }

    /// Path to the config file: `~/.bounty/config.json`.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.json"))
    }

    /// Load config from disk. Returns default if file doesn't exist or is invalid.
    pub fn load() -> Self {
        Self::config_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path =
            Self::config_path().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Configured server URL, or the local default.
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }
}
