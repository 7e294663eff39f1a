//! # sigvault
//!
//! Export a Signal Desktop messaging archive (conversations, contacts,
//! attachments) into a durable, human-browsable file tree, and merge it
//! additively with a previous export without ever deleting or overwriting
//! prior data.
//!
//! ## Overview
//!
//! The pipeline turns raw conversation records into, per conversation:
//! - `index.md` - a line-encoded transcript that is both human-readable
//!   and losslessly re-parseable
//! - `media/` - attachments renamed to deterministic, sortable filenames
//! - `index.html` - an optional paginated view with inline media
//!
//! The transcript encoding is the source of truth: the same parser feeds
//! the HTML renderer and the merge engine, so both always agree on message
//! boundaries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use sigvault::config::ExportConfig;
//! use sigvault::export::{ExportPaths, export};
//! use sigvault::model::ArchiveData;
//! use sigvault::report::Reporter;
//!
//! fn main() -> sigvault::Result<()> {
//!     let json = std::fs::read_to_string("data.json")?;
//!     let data: ArchiveData = serde_json::from_str(&json)?;
//!
//!     let paths = ExportPaths {
//!         attachments_root: Some(Path::new("attachments.noindex")),
//!         old: None,
//!         overwrite: false,
//!     };
//!     export(
//!         Path::new("backup"),
//!         data,
//!         &paths,
//!         &ExportConfig::new(),
//!         &Reporter::new(false),
//!     )
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`model`] - archive data types ([`ArchiveData`](model::ArchiveData),
//!   [`RawMessage`](model::RawMessage), [`Contact`](model::Contact))
//! - [`names`] - filesystem-safe, unique contact names
//! - [`attach`] - attachment naming and copying
//! - [`render`] - message → transcript line encoding
//! - [`transcript`] - transcript line → message decoding
//! - [`html`] - paginated HTML rendering
//! - [`merge`] - additive merge of old exports
//! - [`export`] - run orchestration
//! - [`config`], [`report`], [`error`], [`cli`] - supporting types

pub mod attach;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod html;
pub mod merge;
pub mod model;
pub mod names;
pub mod render;
pub mod report;
pub mod transcript;

// Re-export the main types at the crate root for convenience
pub use error::{Result, SigvaultError};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use sigvault::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ExportConfig;
    pub use crate::error::{Result, SigvaultError};
    pub use crate::export::{ExportPaths, export, list_chats};
    pub use crate::html::HtmlPaginator;
    pub use crate::merge::MergeEngine;
    pub use crate::model::{ArchiveData, Attachment, Contact, Contacts, Conversations, RawMessage};
    pub use crate::names::sanitize_names;
    pub use crate::render::{render_message, write_transcripts};
    pub use crate::report::Reporter;
    pub use crate::transcript::{ParsedMessage, TranscriptParser};
}
