//! Profiles: named, ordered lists of references to server templates.

pub mod store;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::env::EnvMap;

pub use store::ProfileStore;

/// Per-instance changes layered over the referenced template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvMap>,
}

impl ServerOverrides {
    /// Overrides for `env`; an empty map is stored as no override.
    pub fn from_env(env: EnvMap) -> Self {
        Self {
            env: if env.is_empty() { None } else { Some(env) },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.env.as_ref().is_none_or(|env| env.is_empty())
    }
}

/// One server instance inside a profile.
///
/// `template` is a soft reference: it is not checked when written and may
/// name a template that does not (or no longer) exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRef {
    /// Instance name, the key in the resolved MCP config.
    pub name: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "ServerOverrides::is_empty")]
    pub overrides: ServerOverrides,
}

impl ServerRef {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            overrides: ServerOverrides::default(),
        }
    }

    pub fn with_env_overrides(mut self, env: EnvMap) -> Self {
        self.overrides = ServerOverrides::from_env(env);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub servers: Vec<ServerRef>,
}

impl Profile {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            servers: Vec::new(),
        }
    }

    pub fn server(&self, instance: &str) -> Option<&ServerRef> {
        self.servers.iter().find(|s| s.name == instance)
    }

    pub fn references_template(&self, template: &str) -> bool {
        self.servers.iter().any(|s| s.template == template)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Combine the server lists of `sources` in order.
///
/// The first server to claim an instance name wins; later servers with the
/// same name are dropped.
pub fn merge_server_refs<'a, I>(sources: I) -> Vec<ServerRef>
where
    I: IntoIterator<Item = &'a Profile>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for profile in sources {
        for server in &profile.servers {
            if seen.insert(server.name.clone()) {
                merged.push(server.clone());
            } else {
                tracing::debug!(
                    instance = %server.name,
                    profile = %profile.name,
                    "dropping duplicate instance during merge"
                );
            }
        }
    }
    merged
}
