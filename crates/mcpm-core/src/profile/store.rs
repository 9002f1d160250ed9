//! Profile store: one JSON document per profile under `profiles/`.

use std::path::{Path, PathBuf};

use super::{Profile, ServerRef, merge_server_refs};
use crate::confirm::Confirmer;
use crate::document::{load_document, save_document};
use crate::env::EnvMap;
use crate::error::{ResourceKind, Result, StoreError};
use crate::listing::Listing;
use crate::paths::{is_record_name, record_names, record_path};
use crate::template::TemplateReferences;
use crate::template::store::check_pair;
use crate::validate::validate_name;

const LABEL: &str = "Profile";

#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
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

    pub fn load(&self, name: &str) -> Result<Profile> {
        if !self.exists(name) {
            return Err(StoreError::not_found(ResourceKind::Profile, name));
        }
        let mut profile: Profile = load_document(&self.path_for(name))?;
        if profile.name != name {
            tracing::debug!(key = name, stored = %profile.name, "profile name follows its key");
            profile.name = name.to_string();
        }
        Ok(profile)
    }

    pub fn save(&self, profile: &Profile) -> Result<()> {
        save_document(&self.path_for(&profile.name), profile)
    }

    pub fn names(&self) -> Result<Vec<String>> {
        record_names(&self.dir).map_err(|e| StoreError::file(&self.dir, e))
    }

    /// Every readable profile, sorted by name.
    pub fn list(&self) -> Result<Listing<Profile>> {
        let names = self.names()?;
        Ok(Listing::collect(names, |name| self.load(name)))
    }

    /// Create an empty profile. Never overwrites an existing one.
    pub fn create(&self, name: &str, description: &str) -> Result<Profile> {
        validate_name(name, LABEL)?;
        if self.path_for(name).exists() {
            return Err(StoreError::already_exists(ResourceKind::Profile, name));
        }

        let profile = Profile::new(name, description);
        self.save(&profile)?;
        tracing::info!(profile = name, "created profile");
        Ok(profile)
    }

    pub fn set_description(&self, name: &str, description: &str) -> Result<Profile> {
        let mut profile = self.load(name)?;
        profile.description = description.to_string();
        profile.touch();
        self.save(&profile)?;
        Ok(profile)
    }

    pub fn delete(&self, name: &str, force: bool, confirmer: &dyn Confirmer) -> Result<()> {
        if !self.exists(name) {
            return Err(StoreError::not_found(ResourceKind::Profile, name));
        }
        if !force && !confirmer.confirm(&format!("Delete profile '{name}'?")) {
            return Err(StoreError::Cancelled {
                action: format!("Deletion of profile '{name}'"),
            });
        }

        let path = self.path_for(name);
        std::fs::remove_file(&path).map_err(|e| StoreError::file(&path, e))?;
        tracing::info!(profile = name, "deleted profile");
        Ok(())
    }

    pub fn rename(&self, old: &str, new: &str, force: bool) -> Result<Profile> {
        check_pair(old, new)?;
        validate_name(new, LABEL)?;

        let mut profile = self.load(old)?;
        if self.exists(new) && !force {
            return Err(StoreError::already_exists(ResourceKind::Profile, new));
        }

        let old_path = self.path_for(old);
        std::fs::rename(&old_path, self.path_for(new))
            .map_err(|e| StoreError::file(&old_path, e))?;

        profile.name = new.to_string();
        profile.touch();
        self.save(&profile)?;
        tracing::info!(from = old, to = new, "renamed profile");
        Ok(profile)
    }

    /// Append a server to a profile.
    ///
    /// `instance` defaults to the template name. The template itself is not
    /// required to exist yet.
    pub fn add_server(
        &self,
        profile_name: &str,
        template: &str,
        instance: &str,
        env_overrides: EnvMap,
    ) -> Result<Profile> {
        let mut profile = self.load(profile_name)?;
        let instance = if instance.is_empty() { template } else { instance };

        if profile.server(instance).is_some() {
            return Err(StoreError::DuplicateInstanceName {
                profile: profile_name.to_string(),
                instance: instance.to_string(),
            });
        }

        profile
            .servers
            .push(ServerRef::new(instance, template).with_env_overrides(env_overrides));
        profile.touch();
        self.save(&profile)?;
        tracing::info!(profile = profile_name, instance, template, "added server to profile");
        Ok(profile)
    }

    pub fn remove_server(&self, profile_name: &str, instance: &str) -> Result<Profile> {
        let mut profile = self.load(profile_name)?;
        let Some(index) = profile.servers.iter().position(|s| s.name == instance) else {
            return Err(StoreError::ServerRefNotFound {
                profile: profile_name.to_string(),
                instance: instance.to_string(),
            });
        };

        profile.servers.remove(index);
        profile.touch();
        self.save(&profile)?;
        tracing::info!(profile = profile_name, instance, "removed server from profile");
        Ok(profile)
    }

    /// Names of profiles with a server referencing `template`. Unreadable
    /// profiles are logged and skipped.
    pub fn find_profiles_using_template(&self, template: &str) -> Result<Vec<String>> {
        Ok(self
            .list()?
            .entries
            .into_iter()
            .filter(|p| p.references_template(template))
            .map(|p| p.name)
            .collect())
    }

    /// Drop every server referencing `template` from every profile.
    pub fn remove_template_references_from_all_profiles(
        &self,
        template: &str,
    ) -> Result<Vec<String>> {
        self.rewrite_matching(template, |profile| {
            profile.servers.retain(|s| s.template != template);
        })
    }

    /// Repoint servers referencing `from` at `to`. Instance names stay.
    pub fn rename_template_references(&self, from: &str, to: &str) -> Result<Vec<String>> {
        self.rewrite_matching(from, |profile| {
            for server in profile.servers.iter_mut().filter(|s| s.template == from) {
                server.template = to.to_string();
            }
        })
    }

    fn rewrite_matching<F>(&self, template: &str, mut rewrite: F) -> Result<Vec<String>>
    where
        F: FnMut(&mut Profile),
    {
        let mut changed = Vec::new();
        for mut profile in self.list()?.entries {
            if !profile.references_template(template) {
                continue;
            }
            rewrite(&mut profile);
            profile.touch();
            self.save(&profile)?;
            changed.push(profile.name);
        }
        if !changed.is_empty() {
            tracing::info!(template, profiles = %changed.join(", "), "updated template references");
        }
        Ok(changed)
    }

    /// Merge `sources` (in order) into a new profile `dest`.
    ///
    /// Instance names are first-wins: the earliest source (and earliest
    /// position within it) keeps the name, later duplicates are dropped.
    /// `dest` may only exist already when `force` is set.
    pub fn merge(&self, dest: &str, sources: &[String], force: bool) -> Result<Profile> {
        if sources.is_empty() {
            return Err(StoreError::NoSources);
        }
        validate_name(dest, LABEL)?;
        if self.exists(dest) && !force {
            return Err(StoreError::already_exists(ResourceKind::Profile, dest));
        }

        let loaded = sources
            .iter()
            .map(|name| self.load(name))
            .collect::<Result<Vec<_>>>()?;

        let mut merged = Profile::new(dest, format!("Merged from {}", sources.join(", ")));
        merged.servers = merge_server_refs(&loaded);
        self.save(&merged)?;

        tracing::info!(
            profile = dest,
            sources = %sources.join(", "),
            servers = merged.servers.len(),
            "merged profiles"
        );
        Ok(merged)
    }

    /// Delete every profile after a single aggregate confirmation.
    pub fn reset(&self, force: bool, confirmer: &dyn Confirmer) -> Result<Vec<String>> {
        let names = self.names()?;
        if names.is_empty() {
            return Ok(names);
        }

        if !force
            && !confirmer.confirm(&format!(
                "Delete all {} profiles ({})?",
                names.len(),
                names.join(", ")
            ))
        {
            return Err(StoreError::Cancelled {
                action: "Reset of profiles".to_string(),
            });
        }

        for name in &names {
            let path = self.path_for(name);
            std::fs::remove_file(&path).map_err(|e| StoreError::file(&path, e))?;
        }
        tracing::info!(count = names.len(), "deleted all profiles");
        Ok(names)
    }
}

impl TemplateReferences for ProfileStore {
    fn profiles_using(&self, template: &str) -> Result<Vec<String>> {
        self.find_profiles_using_template(template)
    }

    fn remove_references(&self, template: &str) -> Result<Vec<String>> {
        self.remove_template_references_from_all_profiles(template)
    }

    fn rename_references(&self, from: &str, to: &str) -> Result<Vec<String>> {
        self.rename_template_references(from, to)
    }
}
