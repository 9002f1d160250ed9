//! Apply command: write a resolved profile into an MCP config file.

use std::path::PathBuf;

use serde_json::Value;

use crate::context::AppContext;
use crate::error::{Result, StoreError};
use crate::mcp_config::McpConfigDocument;
use crate::resolve::{ResolvedConfig, resolve};

/// How resolved servers combine with servers already in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// The target's server map becomes exactly the profile's servers.
    #[default]
    Replace,
    /// Existing servers are kept; profile servers win on name collisions.
    Merge,
}

/// Options for the apply command
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Profile to resolve
    pub profile: String,
    /// Target file (None = settings target)
    pub target: Option<PathBuf>,
    pub mode: ApplyMode,
}

impl ApplyOptions {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            target: None,
            mode: ApplyMode::Replace,
        }
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Result of an apply operation
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub profile: String,
    pub target: PathBuf,
    pub mode: ApplyMode,
    /// Instance names written, in profile order
    pub servers: Vec<String>,
    /// Existing target entries overwritten (merge mode only)
    pub replaced: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ApplyCommand {
    ctx: AppContext,
}

impl ApplyCommand {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Resolve a profile against the template store.
    pub fn resolve(&self, profile: &str) -> Result<ResolvedConfig> {
        let profile = self.ctx.profiles().load(profile)?;
        resolve(&profile, &self.ctx.templates())
    }

    /// The document `execute` would write, without writing it.
    pub fn preview(&self, options: &ApplyOptions) -> Result<Value> {
        let (document, _, _) = self.build(options)?;
        Ok(document.to_value())
    }

    /// Resolve and write. Nothing is written if resolution fails.
    pub fn execute(&self, options: &ApplyOptions) -> Result<ApplyReport> {
        let (document, resolved, replaced) = self.build(options)?;
        document.save()?;

        tracing::info!(
            profile = %options.profile,
            target = %document.path().display(),
            servers = resolved.len(),
            "applied profile"
        );

        Ok(ApplyReport {
            profile: options.profile.clone(),
            target: document.path().to_path_buf(),
            mode: options.mode,
            servers: resolved.names(),
            replaced,
        })
    }

    fn build(
        &self,
        options: &ApplyOptions,
    ) -> Result<(McpConfigDocument, ResolvedConfig, Vec<String>)> {
        let resolved = self.resolve(&options.profile)?;
        let target = self.ctx.target_path(options.target.as_deref());

        let servers = resolved
            .to_servers_map()
            .map_err(|e| StoreError::format(&target, e))?;

        let mut document = McpConfigDocument::load(&target, self.ctx.servers_key())?;
        let replaced = match options.mode {
            ApplyMode::Replace => {
                document.replace_servers(servers);
                Vec::new()
            }
            ApplyMode::Merge => document.merge_servers(servers),
        };

        Ok((document, resolved, replaced))
    }
}
