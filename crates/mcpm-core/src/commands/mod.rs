//! High-level commands that span both stores and the target MCP config.
//!
//! Store-local operations live on [`TemplateStore`](crate::template::TemplateStore)
//! and [`ProfileStore`](crate::profile::ProfileStore); frontends call those
//! directly.

pub mod apply;
pub mod snapshot;

pub use apply::{ApplyCommand, ApplyMode, ApplyOptions, ApplyReport};
pub use snapshot::{SnapshotCommand, SnapshotOptions, SnapshotReport};
