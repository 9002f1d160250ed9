//! On-disk layout of the mcpm base directory.

use std::path::{Path, PathBuf};

/// Environment variable overriding the base directory.
pub const HOME_ENV: &str = "MCPM_HOME";

const TEMPLATES_DIR: &str = "servers";
const PROFILES_DIR: &str = "profiles";
const SETTINGS_FILE: &str = "settings.toml";
const RECORD_EXT: &str = "json";

/// Resolve the base directory: explicit override, then `MCPM_HOME`, then
/// the platform config directory.
pub fn resolve_base_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("mcpm");
    Ok(dir)
}

#[derive(Debug, Clone)]
pub struct StorePaths {
    base_dir: PathBuf,
}

impl StorePaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.base_dir.join(TEMPLATES_DIR)
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.base_dir.join(PROFILES_DIR)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }
}

/// Whether `name` can address a record file without escaping its directory.
/// Profiles may reference template names that were never validated.
pub fn is_record_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Path of the record named `name` inside `dir`.
pub fn record_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{RECORD_EXT}"))
}

/// Record names stored in `dir`, sorted. A missing directory has no records.
pub fn record_names(dir: &Path) -> std::io::Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_base_dir_wins() {
        let dir = resolve_base_dir(Some(PathBuf::from("/tmp/explicit"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn layout_under_base() {
        let paths = StorePaths::new("/base");
        assert_eq!(paths.templates_dir(), PathBuf::from("/base/servers"));
        assert_eq!(paths.profiles_dir(), PathBuf::from("/base/profiles"));
        assert_eq!(paths.settings_file(), PathBuf::from("/base/settings.toml"));
        assert_eq!(
            record_path(&paths.templates_dir(), "github"),
            PathBuf::from("/base/servers/github.json")
        );
    }

    #[test]
    fn record_names_skips_other_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.json"), "{}").unwrap();
        std::fs::write(temp.path().join("a.json"), "{}").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(temp.path().join("dir.json")).unwrap();

        assert_eq!(record_names(temp.path()).unwrap(), vec!["a", "b"]);
        assert!(record_names(&temp.path().join("missing")).unwrap().is_empty());
    }
}
