use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Application configuration stored at `~/.mintforge/config.json`.
///
/// Pinning credentials are **never** written to the JSON config file. They are
/// stored separately via [`crate::SecretStore`] in `~/.mintforge/secrets.enc`,
/// or supplied through environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MintforgeConfig {
    // HTTP service
    pub bind_addr: String,

    // Compiler
    pub solc_path: String,

    // Pinning provider
    pub pinning_api_url: String,
    pub pinning_gateway_url: String,

    // Per-chain RPC URL overrides, keyed by chain short name (e.g. "base").
    pub rpc_overrides: HashMap<String, String>,

    // Deployment polling
    pub receipt_poll_interval_secs: u64,
    pub receipt_max_attempts: u32,

    // General
    pub log_level: String,
}

impl Default for MintforgeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8560".into(),
            solc_path: "solc".into(),
            pinning_api_url: "https://api.pinata.cloud".into(),
            pinning_gateway_url: "https://gateway.pinata.cloud".into(),
            rpc_overrides: HashMap::new(),
            receipt_poll_interval_secs: 5,
            receipt_max_attempts: 60,
            log_level: "info".into(),
        }
    }
}

impl MintforgeConfig {
    /// Returns the base config directory: `~/.mintforge/`.
    ///
    /// The `MINTFORGE_CONFIG_DIR` environment variable overrides the default,
    /// which keeps tests and CI away from the real home directory.
    pub fn base_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("MINTFORGE_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".mintforge"))
    }

    /// Returns the config file path: `~/.mintforge/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.mintforge/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Returns the deployed-contract registry path: `~/.mintforge/contracts.json`
    pub fn registry_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("contracts.json"))
    }

    /// Ensures all required directories exist.
    pub fn ensure_dirs() -> Result<()> {
        let dirs = [Self::base_dir()?, Self::logs_dir()?];
        for dir in &dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads config from disk, or creates a default one if missing.
    pub fn load() -> Result<Self> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self =
                serde_json::from_str(&content).context("Failed to parse config.json")?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Saves config to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to_path(&path)
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// The RPC URL override for a chain short name, if one is configured.
    pub fn rpc_override(&self, short_name: &str) -> Option<&str> {
        self.rpc_overrides.get(short_name).map(String::as_str)
    }
}
