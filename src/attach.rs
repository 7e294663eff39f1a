//! Attachment planning and copying.
//!
//! For every message attachment this module computes a deterministic
//! destination basename under the conversation's `media/` directory:
//! `{iso-timestamp-with-dashes}_{index:02}_{original-or-placeholder-name}`,
//! made filesystem-safe. Planning assigns the name into the
//! [`Attachment`](crate::model::Attachment) record (the transcript renderer
//! reads it back); copying happens afterwards and skips missing files
//! without aborting the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{Contacts, Conversations, local_datetime};
use crate::report::Reporter;

/// Placeholder used when an attachment carries no filename.
pub const PLACEHOLDER_FILE_NAME: &str = "None";

/// One attachment copy resolved during planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    /// Path relative to the attachment store root, separators normalized.
    pub source: PathBuf,
    /// Absolute destination path under the export tree.
    pub target: PathBuf,
}

/// Assigns destination names to all attachments and creates media dirs.
///
/// Returns the list of copies to perform. Attachments with unusable
/// metadata are skipped with a diagnostic; their messages degrade to plain
/// text. This is the sole place that sets `Attachment::target_name`.
pub fn plan_attachments(
    dest: &Path,
    conversations: &mut Conversations,
    contacts: &Contacts,
    reporter: &Reporter,
) -> Result<Vec<PlannedCopy>> {
    let mut planned = Vec::new();

    for (key, messages) in conversations.iter_mut() {
        let name = contacts
            .get(key)
            .and_then(|c| c.name.as_deref())
            .unwrap_or(PLACEHOLDER_FILE_NAME);
        reporter.detail(format!("\tCopying attachments for: {name}"));

        let media_dir = dest.join(name).join("media");
        fs::create_dir_all(&media_dir)?;

        for msg in messages.iter_mut() {
            if msg.attachments.is_empty() {
                continue;
            }
            let stamp = attachment_stamp(msg.timestamp, reporter);

            for (i, att) in msg.attachments.iter_mut().enumerate() {
                let Some(rel_path) = att.path.as_deref() else {
                    reporter.detail(format!("\t\tBroken attachment:\t{name}"));
                    continue;
                };
                let Some(file_name) = resolve_file_name(att.file_name.as_deref(), att.content_type.as_deref())
                else {
                    reporter.detail(format!("\t\tBroken attachment:\t{name}\t{rel_path}"));
                    continue;
                };

                let target_name = safe_basename(&format!("{stamp}_{i:02}_{file_name}"));
                // Source paths sometimes carry erroneous backslashes.
                let source = PathBuf::from(rel_path.replace('\\', "/"));
                let target = media_dir.join(&target_name);
                att.target_name = Some(target_name);
                planned.push(PlannedCopy { source, target });
            }
        }
    }

    Ok(planned)
}

/// Copies planned attachments from the store root into the export tree.
///
/// A missing source file is logged and skipped; everything else is fatal.
/// Returns the number of files actually copied.
pub fn copy_attachments(
    root: &Path,
    planned: &[PlannedCopy],
    reporter: &Reporter,
) -> Result<usize> {
    let mut copied = 0;
    for copy in planned {
        let source = root.join(&copy.source);
        match fs::copy(&source, &copy.target) {
            Ok(_) => copied += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                reporter.warn(format!(
                    "No file to copy at {}, skipping!",
                    source.display()
                ));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(copied)
}

/// Stamp of last resort when even the epoch cannot be formatted.
const FALLBACK_STAMP: &str = "1970-01-01T00-00-00.000";

/// Local ISO timestamp with millisecond precision, colons dashed.
fn attachment_stamp(timestamp: Option<i64>, reporter: &Reporter) -> String {
    let ms = timestamp.unwrap_or_else(|| {
        reporter.detail("\t\tNo timestamp on attachment message; using 1970");
        0
    });
    local_datetime(ms)
        .or_else(|| local_datetime(0))
        .map(|dt| dt.format("%Y-%m-%dT%H-%M-%S%.3f").to_string())
        .unwrap_or_else(|| FALLBACK_STAMP.to_string())
}

/// Original filename, or the placeholder; extension derived from the
/// content type when absent. `None` when the metadata cannot name a file.
fn resolve_file_name(file_name: Option<&str>, content_type: Option<&str>) -> Option<String> {
    let name = file_name.unwrap_or(PLACEHOLDER_FILE_NAME);
    if name.contains('.') {
        return Some(name.to_string());
    }
    // No extension: take the MIME subtype, or the whole type without one.
    let ct = content_type?;
    let ext = ct.split('/').nth(1).unwrap_or(ct);
    Some(format!("{name}.{ext}"))
}

/// Strips the characters that would break a filename or a markdown link.
fn safe_basename(raw: &str) -> String {
    raw.replace(' ', "_")
        .replace('/', "-")
        .replace(',', "")
        .replace(':', "-")
}
