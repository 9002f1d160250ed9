//! Server templates: reusable (command, args, env) definitions.

pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::env::EnvMap;

pub use store::{
    ImportReport, SaveOutcome, TemplateDeleteReport, TemplateReferences, TemplateRenameReport,
    TemplateStore,
};

/// How to launch an MCP server. Also the shape of each entry in the
/// external MCP config document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "EnvMap::is_empty")]
    pub env: EnvMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_type: Option<String>,
}

/// A named, persisted server definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub config: ServerConfig,
}

impl ServerTemplate {
    pub fn new(name: impl Into<String>, config: ServerConfig) -> Self {
        Self {
            name: name.into(),
            description: None,
            created_at: Utc::now(),
            config,
        }
    }
}

/// Input to [`TemplateStore::save_manual`].
///
/// On create, the fields become the new template. On update, `None` (and an
/// empty `command`) leave the stored value alone:
///
/// - `args`: `Some(vec![""])` clears, any other `Some` replaces wholesale.
/// - `env`: `Some(empty)` clears; otherwise each key is set, or deleted when
///   its value is the empty string. Unmentioned keys are kept.
///
/// Because of the delete-on-empty rule an env var can never be *set* to the
/// empty string through an update. Creating a template stores `env` as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSpec {
    pub name: String,
    pub command: String,
    pub args: Option<Vec<String>>,
    pub env: Option<EnvMap>,
    pub description: Option<String>,
    pub timeout: Option<u64>,
    pub env_file: Option<String>,
    pub transport_type: Option<String>,
}

impl TemplateSpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_env(mut self, env: EnvMap) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_env_file(mut self, env_file: impl Into<String>) -> Self {
        self.env_file = Some(env_file.into());
        self
    }

    pub fn with_transport_type(mut self, transport_type: impl Into<String>) -> Self {
        self.transport_type = Some(transport_type.into());
        self
    }

    /// Build a brand new template. The caller has checked `command`.
    pub(crate) fn to_template(&self) -> ServerTemplate {
        let args = match &self.args {
            Some(args) if is_clear_marker(args) => Vec::new(),
            Some(args) => args.clone(),
            None => Vec::new(),
        };
        let env = self.env.clone().unwrap_or_default();

        ServerTemplate {
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: Utc::now(),
            config: ServerConfig {
                command: self.command.clone(),
                args,
                env,
                timeout: self.timeout,
                env_file: self.env_file.clone(),
                transport_type: self.transport_type.clone(),
            },
        }
    }

    /// Apply this spec as an update to an existing template.
    pub(crate) fn apply_to(&self, template: &mut ServerTemplate) {
        if self.description.is_some() {
            template.description = self.description.clone();
        }
        apply_update(&mut template.config, self);
    }
}

fn apply_update(config: &mut ServerConfig, spec: &TemplateSpec) {
    if !spec.command.is_empty() {
        config.command = spec.command.clone();
    }

    match &spec.args {
        Some(args) if is_clear_marker(args) => config.args.clear(),
        Some(args) => config.args = args.clone(),
        None => {}
    }

    match &spec.env {
        Some(env) if env.is_empty() => config.env.clear(),
        Some(env) => {
            for (key, value) in env {
                if value.is_empty() {
                    config.env.remove(key);
                } else {
                    config.env.insert(key.clone(), value.clone());
                }
            }
        }
        None => {}
    }

    if spec.timeout.is_some() {
        config.timeout = spec.timeout;
    }
    if spec.env_file.is_some() {
        config.env_file = spec.env_file.clone();
    }
    if spec.transport_type.is_some() {
        config.transport_type = spec.transport_type.clone();
    }
}

fn is_clear_marker(args: &[String]) -> bool {
    args.len() == 1 && args[0].is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> ServerTemplate {
        let mut env = EnvMap::new();
        env.insert("A".to_string(), "1".to_string());
        env.insert("B".to_string(), "2".to_string());
        ServerTemplate::new(
            "github",
            ServerConfig {
                command: "npx".to_string(),
                args: vec!["-y".to_string(), "server-github".to_string()],
                env,
                timeout: Some(30),
                ..ServerConfig::default()
            },
        )
    }

    #[test]
    fn empty_command_keeps_existing_command() {
        let mut template = existing();
        TemplateSpec::new("github", "").apply_to(&mut template);
        assert_eq!(template.config.command, "npx");
    }

    #[test]
    fn unset_args_are_untouched_and_blank_marker_clears() {
        let mut template = existing();
        TemplateSpec::new("github", "").apply_to(&mut template);
        assert_eq!(template.config.args.len(), 2);

        TemplateSpec::new("github", "")
            .with_args([""])
            .apply_to(&mut template);
        assert!(template.config.args.is_empty());
    }

    #[test]
    fn args_replace_wholesale() {
        let mut template = existing();
        TemplateSpec::new("github", "")
            .with_args(["--stdio"])
            .apply_to(&mut template);
        assert_eq!(template.config.args, vec!["--stdio".to_string()]);
    }

    #[test]
    fn env_merges_per_key_and_deletes_on_empty_value() {
        let mut template = existing();
        let mut env = EnvMap::new();
        env.insert("A".to_string(), String::new());
        env.insert("C".to_string(), "3".to_string());
        TemplateSpec::new("github", "")
            .with_env(env)
            .apply_to(&mut template);

        let keys: Vec<_> = template.config.env.keys().cloned().collect();
        assert_eq!(keys, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(template.config.env["B"], "2");
    }

    #[test]
    fn empty_env_map_clears_env() {
        let mut template = existing();
        TemplateSpec::new("github", "")
            .with_env(EnvMap::new())
            .apply_to(&mut template);
        assert!(template.config.env.is_empty());
    }

    #[test]
    fn optional_fields_only_change_when_given() {
        let mut template = existing();
        TemplateSpec::new("github", "")
            .with_transport_type("stdio")
            .apply_to(&mut template);
        assert_eq!(template.config.timeout, Some(30));
        assert_eq!(template.config.transport_type.as_deref(), Some("stdio"));
    }

    #[test]
    fn serializes_camel_case_and_omits_empty_fields() {
        let config = ServerConfig {
            command: "uvx".to_string(),
            env_file: Some(".env".to_string()),
            ..ServerConfig::default()
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, serde_json::json!({"command": "uvx", "envFile": ".env"}));
    }
}
