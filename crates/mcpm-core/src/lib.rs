//! mcpm Core Library
//!
//! Server templates, profiles that reference them, and resolution of a
//! profile into the MCP config file consumed by an MCP client.

pub mod commands;
pub mod confirm;
pub mod context;
pub mod document;
pub mod env;
pub mod error;
pub mod listing;
pub mod mcp_config;
pub mod paths;
pub mod profile;
pub mod resolve;
pub mod settings;
pub mod template;
pub mod validate;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::commands::{
        ApplyCommand, ApplyMode, ApplyOptions, ApplyReport, SnapshotCommand, SnapshotOptions,
    };
    pub use crate::confirm::{Confirmer, FixedAnswer};
    pub use crate::context::AppContext;
    pub use crate::env::EnvMap;
    pub use crate::error::{ErrorKind, ResourceKind, StoreError};
    pub use crate::listing::{Listing, RecordFailure};
    pub use crate::mcp_config::McpConfigDocument;
    pub use crate::profile::{Profile, ProfileStore, ServerOverrides, ServerRef};
    pub use crate::resolve::{ResolvedConfig, ResolvedServer, resolve};
    pub use crate::settings::Settings;
    pub use crate::template::{
        SaveOutcome, ServerConfig, ServerTemplate, TemplateSpec, TemplateStore,
    };
    pub use crate::validate::validate_name;
}
