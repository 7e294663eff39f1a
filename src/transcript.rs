//! Transcript parsing.
//!
//! The transcript encoding is a tagged-record stream: each record's tag is
//! a fixed-shape header line and its payload runs until the next header.
//! This parser is the single source of truth for message boundaries: both
//! the HTML renderer and the merge engine consume its output, so the two
//! always agree on what a message is.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use sigvault::transcript::TranscriptParser;
//!
//! let parser = TranscriptParser::new();
//! let text = "[2024-01-15 10:30] Me: hello  \nstill the same message\n";
//! let messages = parser.parse_str(text, Path::new("index.md"))?;
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].sender_name(), "Me");
//! # Ok::<(), sigvault::SigvaultError>(())
//! ```

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::{Result, SigvaultError};

/// Header pattern: date (comma tolerated, never emitted), sender, rest.
const HEADER_PATTERN: &str = r"^(\[\d{4}-\d{2}-\d{2},? \d{2}:\d{2}\])(.*?:)(.*\n?)";

/// One decoded transcript record.
///
/// The three fields hold the raw captured text, so
/// [`joined`](Self::joined) reproduces the on-disk form byte for byte,
/// the property the merge dedup relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// `[YYYY-MM-DD HH:MM]` including brackets.
    pub header: String,
    /// Sender segment including the trailing colon.
    pub sender: String,
    /// Body, including any continuation lines with their newlines.
    pub body: String,
}

impl ParsedMessage {
    /// The record as persisted: header + sender + body.
    pub fn joined(&self) -> String {
        format!("{}{}{}", self.header, self.sender, self.body)
    }

    /// Date and time with brackets and tolerated comma stripped.
    pub fn date_time(&self) -> (String, String) {
        let inner = self
            .header
            .trim_start_matches('[')
            .trim_end_matches(']')
            .replace(',', "");
        match inner.split_once(' ') {
            Some((date, time)) => (date.to_string(), time.to_string()),
            None => (inner, String::new()),
        }
    }

    /// Sender without the enclosing padding and colon.
    pub fn sender_name(&self) -> &str {
        self.sender.trim().trim_end_matches(':').trim_end()
    }
}

/// Line scanner recovering [`ParsedMessage`] records from transcript text.
pub struct TranscriptParser {
    header: Regex,
}

impl TranscriptParser {
    pub fn new() -> Self {
        Self {
            header: Regex::new(HEADER_PATTERN).unwrap(),
        }
    }

    /// Parses a whole transcript file.
    pub fn parse_file(&self, path: &Path) -> Result<Vec<ParsedMessage>> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content, path)
    }

    /// Parses transcript text; `origin` names the source in errors.
    ///
    /// Every line either matches the header pattern and starts a new
    /// record, or is appended verbatim (newline included) to the previous
    /// record's body. A non-header first line is fatal.
    pub fn parse_str(&self, content: &str, origin: &Path) -> Result<Vec<ParsedMessage>> {
        let mut messages: Vec<ParsedMessage> = Vec::new();

        for line in content.split_inclusive('\n') {
            if let Some(caps) = self.header.captures(line) {
                messages.push(ParsedMessage {
                    header: caps[1].to_string(),
                    sender: caps[2].to_string(),
                    body: caps[3].to_string(),
                });
            } else if let Some(last) = messages.last_mut() {
                last.body.push_str(line);
            } else {
                return Err(SigvaultError::transcript(
                    origin,
                    "transcript does not begin with a message header",
                ));
            }
        }

        Ok(messages)
    }
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new()
    }
}
