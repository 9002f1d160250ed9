//! Error taxonomy for template and profile store operations.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Which store a name belongs to, used to label errors and prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Template,
    Profile,
    /// An entry of an external MCP config document.
    Server,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Template => f.write_str("server template"),
            ResourceKind::Profile => f.write_str("profile"),
            ResourceKind::Server => f.write_str("server"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },

    #[error("{kind} '{name}' already exists (use --force to overwrite)")]
    AlreadyExists { kind: ResourceKind, name: String },

    #[error("Overwrite of {kind} '{name}' cancelled")]
    OverwriteCancelled { kind: ResourceKind, name: String },

    #[error("{action} cancelled")]
    Cancelled { action: String },

    #[error("A command is required to create server template '{name}'")]
    MissingCommand { name: String },

    #[error("{label} name cannot be empty")]
    EmptyName { label: String },

    #[error("{label} name '{name}' is too long ({len} characters, max {max})")]
    TooLong {
        label: String,
        name: String,
        len: usize,
        max: usize,
    },

    #[error(
        "{label} name '{name}' contains invalid characters (allowed: letters, digits, '_' and '-')"
    )]
    InvalidCharacters { label: String, name: String },

    #[error("{label} name '{name}' is a reserved word")]
    ReservedWord { label: String, name: String },

    #[error("Source name cannot be empty")]
    EmptySourceName,

    #[error("Destination name cannot be empty")]
    EmptyDestName,

    #[error("Source and destination are the same: '{name}'")]
    SameName { name: String },

    #[error("At least one source profile is required")]
    NoSources,

    #[error("Profile '{profile}' already has a server named '{instance}'")]
    DuplicateInstanceName { profile: String, instance: String },

    #[error("Server '{instance}' not found in profile '{profile}'")]
    ServerRefNotFound { profile: String, instance: String },

    #[error("Template '{template}' referenced by profile '{profile}' does not exist")]
    TemplateNotFound { template: String, profile: String },

    #[error("Invalid environment variable '{pair}': expected KEY=VALUE")]
    InvalidEnvPair { pair: String },

    #[error("File error at {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document at {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat discriminant of [`StoreError`], convenient for matching in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    OverwriteCancelled,
    Cancelled,
    MissingCommand,
    EmptyName,
    TooLong,
    InvalidCharacters,
    ReservedWord,
    EmptySourceName,
    EmptyDestName,
    SameName,
    NoSources,
    DuplicateInstanceName,
    ServerRefNotFound,
    TemplateNotFound,
    InvalidEnvPair,
    File,
    Format,
}

impl StoreError {
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Format {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            StoreError::OverwriteCancelled { .. } => ErrorKind::OverwriteCancelled,
            StoreError::Cancelled { .. } => ErrorKind::Cancelled,
            StoreError::MissingCommand { .. } => ErrorKind::MissingCommand,
            StoreError::EmptyName { .. } => ErrorKind::EmptyName,
            StoreError::TooLong { .. } => ErrorKind::TooLong,
            StoreError::InvalidCharacters { .. } => ErrorKind::InvalidCharacters,
            StoreError::ReservedWord { .. } => ErrorKind::ReservedWord,
            StoreError::EmptySourceName => ErrorKind::EmptySourceName,
            StoreError::EmptyDestName => ErrorKind::EmptyDestName,
            StoreError::SameName { .. } => ErrorKind::SameName,
            StoreError::NoSources => ErrorKind::NoSources,
            StoreError::DuplicateInstanceName { .. } => ErrorKind::DuplicateInstanceName,
            StoreError::ServerRefNotFound { .. } => ErrorKind::ServerRefNotFound,
            StoreError::TemplateNotFound { .. } => ErrorKind::TemplateNotFound,
            StoreError::InvalidEnvPair { .. } => ErrorKind::InvalidEnvPair,
            StoreError::File { .. } => ErrorKind::File,
            StoreError::Format { .. } => ErrorKind::Format,
        }
    }

    /// True for the "record does not exist" family, regardless of store.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::ServerRefNotFound | ErrorKind::TemplateNotFound
        )
    }
}
