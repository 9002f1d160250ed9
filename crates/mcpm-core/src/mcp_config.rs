//! Reader/writer for the external MCP config document.
//!
//! The document is a JSON object whose `servers_key` field (usually
//! `mcpServers`) maps instance names to server definitions. Other top-level
//! fields belong to the consuming tool and are carried through untouched.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::document::{load_json_map, save_document};
use crate::error::{Result, StoreError};
use crate::template::ServerConfig;

#[derive(Debug, Clone)]
pub struct McpConfigDocument {
    path: PathBuf,
    servers_key: String,
    root: Map<String, Value>,
}

impl McpConfigDocument {
    /// Load the document at `path`; a missing file is an empty document.
    pub fn load(path: &Path, servers_key: &str) -> Result<Self> {
        let root = load_json_map(path)?;
        if let Some(servers) = root.get(servers_key)
            && !servers.is_object()
        {
            return Err(StoreError::format(
                path,
                serde::de::Error::custom(format!("'{servers_key}' must be a JSON object")),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            servers_key: servers_key.to_string(),
            root,
        })
    }

    /// Load a document that must already exist.
    pub fn load_existing(path: &Path, servers_key: &str) -> Result<Self> {
        if !path.exists() {
            return Err(StoreError::file(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "MCP config file not found"),
            ));
        }
        Self::load(path, servers_key)
    }

    pub fn empty(path: &Path, servers_key: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            servers_key: servers_key.to_string(),
            root: Map::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn servers(&self) -> Map<String, Value> {
        match self.root.get(&self.servers_key) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    pub fn server_names(&self) -> Vec<String> {
        self.servers().keys().cloned().collect()
    }

    /// Decode one server entry.
    pub fn server_config(&self, name: &str) -> Option<Result<ServerConfig>> {
        let servers = match self.root.get(&self.servers_key) {
            Some(Value::Object(map)) => map,
            _ => return None,
        };
        let value = servers.get(name)?;
        Some(
            serde_json::from_value(value.clone()).map_err(|e| StoreError::format(&self.path, e)),
        )
    }

    /// Replace the server map wholesale.
    pub fn replace_servers(&mut self, servers: Map<String, Value>) {
        self.root
            .insert(self.servers_key.clone(), Value::Object(servers));
    }

    /// Insert `servers` over the existing map. Returns the names that
    /// replaced an existing entry.
    pub fn merge_servers(&mut self, servers: Map<String, Value>) -> Vec<String> {
        let mut merged = self.servers();
        let mut replaced = Vec::new();
        for (name, value) in servers {
            if merged.insert(name.clone(), value).is_some() {
                replaced.push(name);
            }
        }
        self.replace_servers(merged);
        replaced
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn save(&self) -> Result<()> {
        save_document(&self.path, &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn preserves_unrelated_top_level_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("claude.json");
        std::fs::write(
            &path,
            r#"{"theme": "dark", "mcpServers": {"old": {"command": "x"}}}"#,
        )
        .unwrap();

        let mut doc = McpConfigDocument::load(&path, "mcpServers").unwrap();
        let mut servers = Map::new();
        servers.insert("new".to_string(), json!({"command": "y"}));
        doc.replace_servers(servers);
        doc.save().unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["theme"], "dark");
        assert!(written["mcpServers"].get("old").is_none());
        assert_eq!(written["mcpServers"]["new"]["command"], "y");
    }

    #[test]
    fn merge_reports_replaced_entries() {
        let temp = TempDir::new().unwrap();
        let mut doc = McpConfigDocument::empty(&temp.path().join("x.json"), "mcpServers");
        let mut first = Map::new();
        first.insert("a".to_string(), json!({"command": "1"}));
        first.insert("b".to_string(), json!({"command": "2"}));
        doc.replace_servers(first);

        let mut second = Map::new();
        second.insert("b".to_string(), json!({"command": "20"}));
        second.insert("c".to_string(), json!({"command": "30"}));
        let replaced = doc.merge_servers(second);

        assert_eq!(replaced, vec!["b".to_string()]);
        assert_eq!(doc.server_names(), vec!["a", "b", "c"]);
        assert_eq!(doc.servers()["b"]["command"], "20");
    }

    #[test]
    fn servers_field_must_be_an_object() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, r#"{"mcpServers": []}"#).unwrap();

        let err = McpConfigDocument::load(&path, "mcpServers").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn decodes_server_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        std::fs::write(
            &path,
            r#"{"mcpServers": {"fs": {"command": "npx", "args": ["-y", "fs"], "timeout": 10}, "bad": {"command": 5}}}"#,
        )
        .unwrap();
        let doc = McpConfigDocument::load(&path, "mcpServers").unwrap();

        let fs = doc.server_config("fs").unwrap().unwrap();
        assert_eq!(fs.command, "npx");
        assert_eq!(fs.args, vec!["-y", "fs"]);
        assert_eq!(fs.timeout, Some(10));
        assert!(doc.server_config("bad").unwrap().is_err());
        assert!(doc.server_config("missing").is_none());
    }

    #[test]
    fn missing_file_is_only_an_error_when_required() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("none.json");
        assert!(McpConfigDocument::load(&path, "mcpServers").unwrap().servers().is_empty());
        assert_eq!(
            McpConfigDocument::load_existing(&path, "mcpServers")
                .unwrap_err()
                .kind(),
            ErrorKind::File
        );
    }
}
