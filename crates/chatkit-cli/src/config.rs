//! Loads configuration from ${CHATKIT_HOME}/config.toml with sensible
//! defaults. CHATKIT_HOME resolution order:
//! 1. CHATKIT_HOME environment variable (if set)
//! 2. ~/.config/chatkit

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Persisted CLI settings; every field optional, flags override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Chat backend base URL, e.g. `https://chat.example.com`.
    pub base_url: Option<String>,
    /// Bearer credential.
    pub token: Option<String>,
    /// Context identifier sent with every request.
    pub context_type: Option<String>,
    /// Named context parameters.
    pub params: BTreeMap<String, String>,
}

impl CliConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(CliConfig::default())
        }
    }
}

pub fn home_dir() -> PathBuf {
    if let Ok(home) = std::env::var("CHATKIT_HOME") {
        return PathBuf::from(home);
    }
    let base = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(base).join(".config").join("chatkit")
}

pub fn config_path() -> PathBuf {
    home_dir().join("config.toml")
}
