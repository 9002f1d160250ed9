//! User settings loaded from `settings.toml` in the base directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::document::write_atomic;

/// Default field of the MCP config document that holds the server map.
pub const DEFAULT_SERVERS_KEY: &str = "mcpServers";

/// Default target file written by `apply`.
pub const DEFAULT_TARGET: &str = ".mcp.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// MCP config file written by `apply` when no target is given.
    pub target: PathBuf,
    /// Top-level field of the MCP config document holding servers.
    pub servers_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target: PathBuf::from(DEFAULT_TARGET),
            servers_key: DEFAULT_SERVERS_KEY.to_string(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        if settings.servers_key.trim().is_empty() {
            anyhow::bail!("'servers_key' cannot be empty");
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        write_atomic(path, content.as_bytes())
            .with_context(|| format!("Failed to write settings file: {}", path.display()))
    }
}
