//! Additive merge of a previous export into a fresh one.
//!
//! The old tree is read-only input; the new tree is the only one mutated,
//! and only ever additively. Conversations missing from the new export are
//! copied over verbatim; shared conversations get their media unioned
//! (never overwriting) and their transcripts deduplicated by exact record
//! text with first occurrence winning.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::report::Reporter;
use crate::transcript::{ParsedMessage, TranscriptParser};

/// Merges a previously exported tree into a freshly exported one.
pub struct MergeEngine {
    parser: TranscriptParser,
    reporter: Reporter,
}

impl MergeEngine {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            parser: TranscriptParser::new(),
            reporter,
        }
    }

    /// Merges every conversation directory of `old` into `dest`.
    ///
    /// Never deletes or overwrites anything already present under `old`.
    pub fn merge_trees(&self, dest: &Path, old: &Path) -> Result<()> {
        let mut dirs: Vec<_> = fs::read_dir(old)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        for dir_old in dirs {
            let Some(name) = dir_old.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            self.reporter.detail(format!("\tMerging {name}"));

            let dir_new = dest.join(&name);
            if dir_new.is_dir() {
                self.merge_media(&dir_new.join("media"), &dir_old.join("media"))?;
                self.merge_transcript(&dir_new.join("index.md"), &dir_old.join("index.md"))?;
            } else {
                // Conversation absent from the latest export: keep it.
                copy_dir_all(&dir_old, &dir_new)?;
            }
        }
        Ok(())
    }

    /// Copies old media files that do not already exist at the destination.
    pub fn merge_media(&self, media_new: &Path, media_old: &Path) -> Result<()> {
        if !media_old.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(media_new)?;

        for entry in fs::read_dir(media_old)? {
            let entry = entry?;
            let source = entry.path();
            if !source.is_file() {
                continue;
            }
            let target = media_new.join(entry.file_name());
            if target.exists() {
                self.reporter.warn(format!(
                    "Skipped file {} as duplicate found in new export directory!",
                    source.display()
                ));
            } else {
                fs::copy(&source, &target)?;
            }
        }
        Ok(())
    }

    /// Rewrites the new transcript as the union of old and new records.
    ///
    /// Old records come first; a record is a duplicate only when its full
    /// joined text is byte-identical to an earlier one. Missing or empty
    /// transcripts on either side make this a no-op.
    pub fn merge_transcript(&self, path_new: &Path, path_old: &Path) -> Result<()> {
        if !path_old.is_file() || !path_new.is_file() {
            self.reporter.detail("\t\tNo transcript pair to merge");
            return Ok(());
        }

        let old = self.parser.parse_file(path_old)?;
        let new = self.parser.parse_file(path_new)?;
        if old.is_empty() || new.is_empty() {
            self.reporter.detail("\t\tNo new messages for this conversation");
            return Ok(());
        }

        let merged = union_records(&old, &new);

        let mut out = fs::File::create(path_new)?;
        for record in &merged {
            out.write_all(record.as_bytes())?;
            if !record.ends_with('\n') {
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

/// First-occurrence-wins, order-preserving set union of record texts.
fn union_records(old: &[ParsedMessage], new: &[ParsedMessage]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for record in old.iter().chain(new.iter()) {
        let joined = record.joined();
        if seen.insert(joined.clone()) {
            merged.push(joined);
        }
    }
    merged
}

/// Recursively copies a directory, preserving its layout.
fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
