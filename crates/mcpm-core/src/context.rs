//! Application context shared by commands.

use std::path::{Path, PathBuf};

use crate::paths::{StorePaths, resolve_base_dir};
use crate::profile::ProfileStore;
use crate::settings::Settings;
use crate::template::TemplateStore;

/// Base directory layout plus loaded settings.
///
/// Frontends create this once and hand out stores from it.
#[derive(Debug, Clone)]
pub struct AppContext {
    paths: StorePaths,
    settings: Settings,
}

impl AppContext {
    /// Create a context rooted at `base_dir`, loading `settings.toml` if present.
    pub fn new(base_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let paths = StorePaths::new(base_dir);
        let settings = Settings::load(&paths.settings_file())?;
        Ok(Self { paths, settings })
    }

    /// Create a context from the CLI override, `MCPM_HOME`, or the platform
    /// config directory.
    pub fn with_defaults(base_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        Self::new(resolve_base_dir(base_dir)?)
    }

    /// Create a context with explicit settings (for testing).
    pub fn with_settings(base_dir: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            paths: StorePaths::new(base_dir),
            settings,
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.paths.base_dir()
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn templates(&self) -> TemplateStore {
        TemplateStore::new(self.paths.templates_dir())
    }

    pub fn profiles(&self) -> ProfileStore {
        ProfileStore::new(self.paths.profiles_dir())
    }

    /// Target file for `apply`, `explicit` taking precedence over settings.
    pub fn target_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.settings.target.clone())
    }

    pub fn servers_key(&self) -> &str {
        &self.settings.servers_key
    }
}
