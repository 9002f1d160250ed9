//! Environment variable parsing for CLI pairs and env files.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, StoreError};

pub type EnvMap = BTreeMap<String, String>;

/// Parse a single `KEY=VALUE` pair. The value may be empty.
pub fn parse_env_pair(pair: &str) -> Result<(String, String)> {
    let Some((key, value)) = pair.split_once('=') else {
        return Err(StoreError::InvalidEnvPair {
            pair: pair.to_string(),
        });
    };
    let key = key.trim();
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(StoreError::InvalidEnvPair {
            pair: pair.to_string(),
        });
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse a list of `KEY=VALUE` pairs. Later pairs win on duplicate keys.
pub fn parse_env_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<EnvMap> {
    let mut env = EnvMap::new();
    for pair in pairs {
        let (key, value) = parse_env_pair(pair.as_ref())?;
        env.insert(key, value);
    }
    Ok(env)
}

/// Parse `.env` style content: blank lines and `#` comments are skipped, an
/// optional `export ` prefix is stripped and matching outer quotes removed.
pub fn parse_env_file_str(content: &str) -> Result<EnvMap> {
    let mut env = EnvMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = parse_env_pair(line)?;
        env.insert(key, unquote(value.trim()).to_string());
    }
    Ok(env)
}

pub fn load_env_file(path: &Path) -> Result<EnvMap> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::file(path, e))?;
    parse_env_file_str(&content)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
