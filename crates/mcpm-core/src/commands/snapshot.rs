//! Snapshot command: capture an MCP config file as templates plus a profile.

use std::path::PathBuf;

use crate::confirm::Confirmer;
use crate::context::AppContext;
use crate::error::{ResourceKind, Result, StoreError};
use crate::mcp_config::McpConfigDocument;
use crate::profile::{Profile, ServerRef};
use crate::template::ImportReport;
use crate::validate::validate_name;

/// Options for the snapshot command
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Profile to create
    pub profile: String,
    /// MCP config file to read (None = settings target)
    pub source: Option<PathBuf>,
    pub description: String,
    /// Servers to capture (empty = all)
    pub only: Vec<String>,
    /// Overwrite existing templates and profile without asking
    pub force: bool,
}

impl SnapshotOptions {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            source: None,
            description: String::new(),
            only: Vec::new(),
            force: false,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

#[derive(Debug)]
pub struct SnapshotReport {
    pub profile: Profile,
    pub source: PathBuf,
    pub import: ImportReport,
}

#[derive(Debug, Clone)]
pub struct SnapshotCommand {
    ctx: AppContext,
}

impl SnapshotCommand {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Import servers as templates, then create a profile referencing every
    /// template that was saved. Servers that fail to import are reported and
    /// left out of the profile.
    pub fn execute(
        &self,
        options: &SnapshotOptions,
        confirmer: &dyn Confirmer,
    ) -> Result<SnapshotReport> {
        validate_name(&options.profile, "Profile")?;
        let profiles = self.ctx.profiles();
        if profiles.exists(&options.profile) && !options.force {
            return Err(StoreError::already_exists(
                ResourceKind::Profile,
                &options.profile,
            ));
        }

        let source = self.ctx.target_path(options.source.as_deref());
        let document = McpConfigDocument::load_existing(&source, self.ctx.servers_key())?;
        let import = self.ctx.templates().import_from_document(
            &document,
            &options.only,
            options.force,
            confirmer,
        )?;

        let mut profile = Profile::new(&options.profile, &options.description);
        profile.servers = import
            .saved
            .iter()
            .map(|name| ServerRef::new(name, name))
            .collect();
        profiles.save(&profile)?;

        tracing::info!(
            profile = %profile.name,
            servers = profile.servers.len(),
            source = %source.display(),
            "captured profile snapshot"
        );

        Ok(SnapshotReport {
            profile,
            source,
            import,
        })
    }
}
