//! Resolution of a profile into a flat server map.
//!
//! Each server reference is looked up in the template store and its env
//! overrides are layered over the template env. A reference to a missing
//! template fails the whole resolution.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::profile::{Profile, ServerRef};
use crate::template::{ServerConfig, ServerTemplate, TemplateStore};

/// Source of templates for resolution.
pub trait TemplateLookup {
    fn lookup(&self, name: &str) -> Result<Option<ServerTemplate>>;
}

impl TemplateLookup for TemplateStore {
    fn lookup(&self, name: &str) -> Result<Option<ServerTemplate>> {
        self.try_load(name)
    }
}

impl TemplateLookup for BTreeMap<String, ServerTemplate> {
    fn lookup(&self, name: &str) -> Result<Option<ServerTemplate>> {
        Ok(self.get(name).cloned())
    }
}

/// A server instance ready to be written into an MCP config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedServer {
    pub name: String,
    pub template: String,
    pub config: ServerConfig,
}

/// Instance name to resolved server, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    servers: Vec<ResolvedServer>,
}

impl ResolvedConfig {
    /// Insert a server, replacing any entry with the same instance name in
    /// place. Returns the replaced entry.
    pub fn insert(&mut self, server: ResolvedServer) -> Option<ResolvedServer> {
        match self.servers.iter_mut().find(|s| s.name == server.name) {
            Some(slot) => Some(std::mem::replace(slot, server)),
            None => {
                self.servers.push(server);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedServer> {
        self.servers.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedServer> {
        self.servers.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.servers.iter().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Render as the server map of an MCP config document.
    pub fn to_servers_map(&self) -> serde_json::Result<Map<String, Value>> {
        let mut map = Map::new();
        for server in &self.servers {
            map.insert(server.name.clone(), serde_json::to_value(&server.config)?);
        }
        Ok(map)
    }
}

/// Layer a reference's overrides over its template.
///
/// Only env is overridable: override keys replace or add, template keys not
/// mentioned are kept. Everything else comes from the template verbatim.
pub fn resolve_server(template: &ServerTemplate, server: &ServerRef) -> ResolvedServer {
    let mut config = template.config.clone();
    if let Some(env) = &server.overrides.env {
        for (key, value) in env {
            config.env.insert(key.clone(), value.clone());
        }
    }
    ResolvedServer {
        name: server.name.clone(),
        template: template.name.clone(),
        config,
    }
}

/// Resolve every server of `profile`.
///
/// Duplicate instance names (only possible in hand-edited files) resolve
/// last-wins.
pub fn resolve(profile: &Profile, templates: &dyn TemplateLookup) -> Result<ResolvedConfig> {
    let mut resolved = ResolvedConfig::default();
    for server in &profile.servers {
        let template =
            templates
                .lookup(&server.template)?
                .ok_or_else(|| StoreError::TemplateNotFound {
                    template: server.template.clone(),
                    profile: profile.name.clone(),
                })?;

        if let Some(previous) = resolved.insert(resolve_server(&template, server)) {
            tracing::warn!(
                profile = %profile.name,
                instance = %previous.name,
                "duplicate instance name in profile, later entry wins"
            );
        }
    }
    tracing::debug!(profile = %profile.name, servers = resolved.len(), "resolved profile");
    Ok(resolved)
}
