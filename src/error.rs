//! Unified error types for sigvault.
//!
//! A single [`SigvaultError`] enum covers all fatal error cases. Per-item
//! problems (a missing attachment file, an unresolvable sender) are never
//! errors: they are reported through [`Reporter`](crate::report::Reporter)
//! and processing continues. Only run-aborting conditions land here.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A specialized [`Result`] type for sigvault operations.
pub type Result<T> = std::result::Result<T, SigvaultError>;

/// The error type for all sigvault operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SigvaultError {
    /// An I/O error occurred.
    ///
    /// Typically: output directory not writable, disk full, or an
    /// unreadable source tree during merge.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse the extraction data document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A transcript file violated the format precondition.
    ///
    /// Raised when a transcript does not begin with a valid
    /// `[YYYY-MM-DD HH:MM] sender:` header line.
    #[error("Invalid transcript {}: {message}", path.display())]
    Transcript {
        /// The offending transcript file.
        path: PathBuf,
        /// Description of what's wrong.
        message: String,
    },

    /// The destination directory already exists and `--overwrite` was not
    /// given. Checked before anything is written.
    #[error("Output folder '{}' already exists, didn't do anything! Use --overwrite to reuse it.", .0.display())]
    DestinationExists(PathBuf),

    /// The extraction document is structurally unusable.
    #[error("Invalid archive data: {0}")]
    InvalidData(String),
}

impl SigvaultError {
    /// Creates a [`Transcript`](SigvaultError::Transcript) error.
    pub fn transcript(path: &Path, message: impl Into<String>) -> Self {
        SigvaultError::Transcript {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_error_display() {
        let err = SigvaultError::transcript(Path::new("x/index.md"), "no header");
        let msg = err.to_string();
        assert!(msg.contains("index.md"));
        assert!(msg.contains("no header"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: SigvaultError = io_err.into();
        assert!(matches!(err, SigvaultError::Io(_)));
    }

    #[test]
    fn test_destination_exists_mentions_overwrite() {
        let err = SigvaultError::DestinationExists(PathBuf::from("out"));
        assert!(err.to_string().contains("--overwrite"));
    }
}
