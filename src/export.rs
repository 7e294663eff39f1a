//! Run orchestration.
//!
//! Ties the stages together in fixed order: destination check, name
//! sanitization, attachment planning/copying, transcript rendering,
//! optional merge with a previous export, optional HTML generation.

use std::fs;
use std::path::Path;

use crate::attach::{copy_attachments, plan_attachments};
use crate::config::ExportConfig;
use crate::error::{Result, SigvaultError};
use crate::html::{HtmlPaginator, write_style};
use crate::merge::MergeEngine;
use crate::model::ArchiveData;
use crate::names::sanitize_names;
use crate::render::write_transcripts;
use crate::report::Reporter;

/// Options for one export run that are not part of [`ExportConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExportPaths<'a> {
    /// Root of the raw attachment store, when available.
    pub attachments_root: Option<&'a Path>,
    /// A previous export to merge into this one.
    pub old: Option<&'a Path>,
    /// Reuse an existing destination directory.
    pub overwrite: bool,
}

/// Runs a complete export into `dest`.
///
/// The destination-exists check happens before anything is written; every
/// later per-item failure is diagnostic-only.
pub fn export(
    dest: &Path,
    mut data: ArchiveData,
    paths: &ExportPaths<'_>,
    config: &ExportConfig,
    reporter: &Reporter,
) -> Result<()> {
    if dest.is_dir() && !paths.overwrite {
        return Err(SigvaultError::DestinationExists(dest.to_path_buf()));
    }
    fs::create_dir_all(dest)?;

    if !config.include_empty {
        data.conversations.retain(|_, messages| !messages.is_empty());
    }

    sanitize_names(&mut data.contacts);

    reporter.note("Copying and renaming attachments");
    let planned = plan_attachments(dest, &mut data.conversations, &data.contacts, reporter)?;
    match paths.attachments_root {
        Some(root) => {
            let copied = copy_attachments(root, &planned, reporter)?;
            reporter.detail(format!("\tCopied {copied} attachments"));
        }
        None if !planned.is_empty() => {
            reporter.warn("No attachment store given; transcript references will dangle");
        }
        None => {}
    }

    reporter.note("Creating markdown files");
    write_transcripts(dest, &data.conversations, &data.contacts, config, reporter)?;

    if let Some(old) = paths.old {
        reporter.note(format!("Merging old at {} into output directory", old.display()));
        reporter.note("No existing files will be deleted or overwritten!");
        MergeEngine::new(*reporter).merge_trees(dest, old)?;
    }

    if config.html {
        reporter.note("Creating HTML files");
        write_style(dest)?;
        HtmlPaginator::new(config.messages_per_page).write_all(dest, reporter)?;
    }

    Ok(())
}

/// Sorted, `|`-separated list of chat names for `--list-chats`.
pub fn list_chats(data: &ArchiveData) -> String {
    let mut names: Vec<&str> = data
        .contacts
        .values()
        .filter_map(|c| c.name.as_deref())
        .collect();
    names.sort_unstable();
    names.join(" | ")
}
