//! Template store: one JSON document per template under `servers/`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{ServerTemplate, TemplateSpec};
use crate::confirm::Confirmer;
use crate::document::{load_document, save_document};
use crate::error::{ResourceKind, Result, StoreError};
use crate::listing::{Listing, RecordFailure};
use crate::mcp_config::McpConfigDocument;
use crate::paths::{is_record_name, record_names, record_path};
use crate::validate::validate_name;

const LABEL: &str = "Template";

/// Capability for keeping profiles consistent with template changes.
///
/// Implemented by the profile store and handed to template operations that
/// need to look across profiles.
pub trait TemplateReferences {
    /// Names of profiles with at least one server referencing `template`.
    fn profiles_using(&self, template: &str) -> Result<Vec<String>>;

    /// Strip every reference to `template`; returns the profiles changed.
    fn remove_references(&self, template: &str) -> Result<Vec<String>>;

    /// Point references at `from` to `to`; returns the profiles changed.
    fn rename_references(&self, from: &str, to: &str) -> Result<Vec<String>>;
}

/// Outcome of [`TemplateStore::save_manual`].
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Created(ServerTemplate),
    Updated(ServerTemplate),
}

impl SaveOutcome {
    pub fn template(&self) -> &ServerTemplate {
        match self {
            SaveOutcome::Created(t) | SaveOutcome::Updated(t) => t,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SaveOutcome::Created(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateDeleteReport {
    pub name: String,
    /// Profiles that referenced the template at deletion time.
    pub referenced_by: Vec<String>,
    /// Profiles whose references were stripped.
    pub cleaned_profiles: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TemplateRenameReport {
    pub template: ServerTemplate,
    pub updated_profiles: Vec<String>,
}

/// Result of importing servers from an MCP config document.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub total: usize,
    pub saved: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        record_path(&self.dir, name)
    }

    pub fn exists(&self, name: &str) -> bool {
        is_record_name(name) && self.path_for(name).is_file()
    }

    pub fn load(&self, name: &str) -> Result<ServerTemplate> {
        self.try_load(name)?
            .ok_or_else(|| StoreError::not_found(ResourceKind::Template, name))
    }

    /// Load a template, `Ok(None)` when it does not exist.
    pub fn try_load(&self, name: &str) -> Result<Option<ServerTemplate>> {
        if !self.exists(name) {
            return Ok(None);
        }
        let mut template: ServerTemplate = load_document(&self.path_for(name))?;
        if template.name != name {
            tracing::debug!(key = name, stored = %template.name, "template name follows its key");
            template.name = name.to_string();
        }
        Ok(Some(template))
    }

    /// Persist a template under its own name.
    pub fn save(&self, template: &ServerTemplate) -> Result<()> {
        save_document(&self.path_for(&template.name), template)
    }

    pub fn names(&self) -> Result<Vec<String>> {
        record_names(&self.dir).map_err(|e| StoreError::file(&self.dir, e))
    }

    /// Every readable template, sorted by name. Unreadable records are
    /// reported in [`Listing::failures`].
    pub fn list(&self) -> Result<Listing<ServerTemplate>> {
        let names = self.names()?;
        Ok(Listing::collect(names, |name| self.load(name)))
    }

    /// Create a template, or update it when it already exists.
    ///
    /// Updating an existing template asks `confirmer` unless `force` is set.
    /// Creating requires a non-empty command; updating treats an empty
    /// command as "keep the current one". See [`TemplateSpec`] for the
    /// args/env update rules.
    pub fn save_manual(
        &self,
        spec: &TemplateSpec,
        force: bool,
        confirmer: &dyn Confirmer,
    ) -> Result<SaveOutcome> {
        validate_name(&spec.name, LABEL)?;

        match self.try_load(&spec.name)? {
            Some(mut existing) => {
                self.confirm_overwrite(&spec.name, force, confirmer)?;
                spec.apply_to(&mut existing);
                self.save(&existing)?;
                tracing::info!(template = %existing.name, "updated server template");
                Ok(SaveOutcome::Updated(existing))
            }
            None => {
                if spec.command.is_empty() {
                    return Err(StoreError::MissingCommand {
                        name: spec.name.clone(),
                    });
                }
                let template = spec.to_template();
                self.save(&template)?;
                tracing::info!(template = %template.name, "created server template");
                Ok(SaveOutcome::Created(template))
            }
        }
    }

    /// Update an existing template without prompting.
    pub fn update(&self, spec: &TemplateSpec) -> Result<ServerTemplate> {
        let mut template = self.load(&spec.name)?;
        spec.apply_to(&mut template);
        self.save(&template)?;
        tracing::info!(template = %template.name, "updated server template");
        Ok(template)
    }

    /// Delete a template.
    ///
    /// Profiles referencing it are reported. Without `force` the deletion is
    /// confirmed first, then stripping the references is offered separately;
    /// declining that leaves dangling references behind. With `force` both
    /// happen without prompting.
    pub fn delete(
        &self,
        name: &str,
        force: bool,
        references: &dyn TemplateReferences,
        confirmer: &dyn Confirmer,
    ) -> Result<TemplateDeleteReport> {
        if !self.exists(name) {
            return Err(StoreError::not_found(ResourceKind::Template, name));
        }

        let referenced_by = references.profiles_using(name)?;
        if !referenced_by.is_empty() {
            tracing::warn!(
                template = name,
                profiles = %referenced_by.join(", "),
                "server template is referenced by profiles"
            );
        }

        if !force && !confirmer.confirm(&format!("Delete server template '{name}'?")) {
            return Err(StoreError::Cancelled {
                action: format!("Deletion of server template '{name}'"),
            });
        }

        let path = self.path_for(name);
        std::fs::remove_file(&path).map_err(|e| StoreError::file(&path, e))?;
        tracing::info!(template = name, "deleted server template");

        let mut cleaned_profiles = Vec::new();
        if !referenced_by.is_empty() {
            let strip = force
                || confirmer.confirm(&format!(
                    "Remove references to '{name}' from {} profile(s) ({})?",
                    referenced_by.len(),
                    referenced_by.join(", ")
                ));
            if strip {
                cleaned_profiles = references.remove_references(name)?;
            }
        }

        Ok(TemplateDeleteReport {
            name: name.to_string(),
            referenced_by,
            cleaned_profiles,
        })
    }

    /// Copy `src` to `dest`. The copy gets a fresh creation time.
    pub fn copy(&self, src: &str, dest: &str, force: bool) -> Result<ServerTemplate> {
        check_pair(src, dest)?;
        validate_name(dest, LABEL)?;

        let source = self.load(src)?;
        if self.exists(dest) && !force {
            return Err(StoreError::already_exists(ResourceKind::Template, dest));
        }

        let copy = ServerTemplate {
            name: dest.to_string(),
            created_at: timestamp_after(source.created_at),
            ..source
        };
        self.save(&copy)?;
        tracing::info!(from = src, to = dest, "copied server template");
        Ok(copy)
    }

    /// Rename `old` to `new` and repoint profile references.
    pub fn rename(
        &self,
        old: &str,
        new: &str,
        force: bool,
        references: &dyn TemplateReferences,
    ) -> Result<TemplateRenameReport> {
        check_pair(old, new)?;
        validate_name(new, LABEL)?;

        let mut template = self.load(old)?;
        if self.exists(new) && !force {
            return Err(StoreError::already_exists(ResourceKind::Template, new));
        }

        let old_path = self.path_for(old);
        let new_path = self.path_for(new);
        std::fs::rename(&old_path, &new_path).map_err(|e| StoreError::file(&old_path, e))?;

        template.name = new.to_string();
        self.save(&template)?;
        tracing::info!(from = old, to = new, "renamed server template");

        let updated_profiles = references.rename_references(old, new)?;
        Ok(TemplateRenameReport {
            template,
            updated_profiles,
        })
    }

    /// Delete every template after a single aggregate confirmation.
    pub fn reset(&self, force: bool, confirmer: &dyn Confirmer) -> Result<Vec<String>> {
        let names = self.names()?;
        if names.is_empty() {
            return Ok(names);
        }

        if !force
            && !confirmer.confirm(&format!(
                "Delete all {} server templates ({})?",
                names.len(),
                names.join(", ")
            ))
        {
            return Err(StoreError::Cancelled {
                action: "Reset of server templates".to_string(),
            });
        }

        for name in &names {
            let path = self.path_for(name);
            std::fs::remove_file(&path).map_err(|e| StoreError::file(&path, e))?;
        }
        tracing::info!(count = names.len(), "deleted all server templates");
        Ok(names)
    }

    /// Save servers from an MCP config document as templates.
    ///
    /// `only` restricts the import to the named servers (empty = all). Each
    /// server is imported independently: invalid names, missing commands and
    /// declined overwrites are collected in the report instead of aborting.
    pub fn import_from_document(
        &self,
        document: &McpConfigDocument,
        only: &[String],
        force: bool,
        confirmer: &dyn Confirmer,
    ) -> Result<ImportReport> {
        let names = if only.is_empty() {
            document.server_names()
        } else {
            only.to_vec()
        };

        let mut report = ImportReport {
            total: names.len(),
            ..ImportReport::default()
        };

        for name in names {
            match self.import_one(document, &name, force, confirmer) {
                Ok(()) => report.saved.push(name),
                Err(error) => {
                    tracing::warn!(server = %name, error = %error, "skipping server during import");
                    report.failures.push(RecordFailure { name, error });
                }
            }
        }

        tracing::info!(
            saved = report.saved.len(),
            total = report.total,
            source = %document.path().display(),
            "imported server templates"
        );
        Ok(report)
    }

    fn import_one(
        &self,
        document: &McpConfigDocument,
        name: &str,
        force: bool,
        confirmer: &dyn Confirmer,
    ) -> Result<()> {
        validate_name(name, LABEL)?;
        let config = document
            .server_config(name)
            .ok_or_else(|| StoreError::not_found(ResourceKind::Server, name))??;
        if config.command.is_empty() {
            return Err(StoreError::MissingCommand {
                name: name.to_string(),
            });
        }

        let description = match self.try_load(name)? {
            Some(existing) => {
                self.confirm_overwrite(name, force, confirmer)?;
                existing.description
            }
            None => None,
        };

        let template = ServerTemplate {
            description,
            ..ServerTemplate::new(name, config)
        };
        self.save(&template)
    }

    fn confirm_overwrite(&self, name: &str, force: bool, confirmer: &dyn Confirmer) -> Result<()> {
        if force
            || confirmer.confirm(&format!(
                "Server template '{name}' already exists. Overwrite?"
            ))
        {
            return Ok(());
        }
        Err(StoreError::OverwriteCancelled {
            kind: ResourceKind::Template,
            name: name.to_string(),
        })
    }
}

/// Shared precondition checks for copy/rename style operations.
pub(crate) fn check_pair(src: &str, dest: &str) -> Result<()> {
    if src.is_empty() {
        return Err(StoreError::EmptySourceName);
    }
    if dest.is_empty() {
        return Err(StoreError::EmptyDestName);
    }
    if src == dest {
        return Err(StoreError::SameName {
            name: src.to_string(),
        });
    }
    Ok(())
}

/// Now, nudged forward if the clock has not moved past `previous`.
fn timestamp_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}
