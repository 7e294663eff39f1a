//! Export configuration.
//!
//! [`ExportConfig`] carries the knobs the pipeline interprets: quote
//! inclusion, HTML pagination, empty-conversation handling and verbosity.
//! Builder-style `with_*` methods keep library usage free of any CLI
//! framework types.
//!
//! # Example
//!
//! ```
//! use sigvault::config::ExportConfig;
//!
//! let config = ExportConfig::new()
//!     .with_include_quote(false)
//!     .with_messages_per_page(50);
//! assert_eq!(config.messages_per_page, 50);
//! ```

use serde::{Deserialize, Serialize};

/// Configuration for one export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Include quoted (replied-to) text in transcripts (default: true).
    pub include_quote: bool,

    /// Messages per HTML page; zero or negative puts the whole
    /// conversation on a single page (default: 100).
    pub messages_per_page: i64,

    /// Export conversations that contain no messages (default: false).
    pub include_empty: bool,

    /// Produce paginated HTML next to each transcript (default: true).
    pub html: bool,

    /// Emit per-item diagnostics (default: false).
    pub verbose: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_quote: true,
            messages_per_page: 100,
            include_empty: false,
            html: true,
            verbose: false,
        }
    }
}

impl ExportConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables quote blocks in transcripts.
    #[must_use]
    pub fn with_include_quote(mut self, include: bool) -> Self {
        self.include_quote = include;
        self
    }

    /// Sets the HTML page size; zero or negative means one page.
    #[must_use]
    pub fn with_messages_per_page(mut self, count: i64) -> Self {
        self.messages_per_page = count;
        self
    }

    /// Sets whether empty conversations get a directory at all.
    #[must_use]
    pub fn with_include_empty(mut self, include: bool) -> Self {
        self.include_empty = include;
        self
    }

    /// Enables or disables HTML output.
    #[must_use]
    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    /// Enables or disables verbose diagnostics.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::new();
        assert!(config.include_quote);
        assert_eq!(config.messages_per_page, 100);
        assert!(!config.include_empty);
        assert!(config.html);
        assert!(!config.verbose);
    }

    #[test]
    fn test_builder_chain() {
        let config = ExportConfig::new()
            .with_include_quote(false)
            .with_messages_per_page(0)
            .with_include_empty(true)
            .with_html(false)
            .with_verbose(true);
        assert!(!config.include_quote);
        assert_eq!(config.messages_per_page, 0);
        assert!(config.include_empty);
        assert!(!config.html);
        assert!(config.verbose);
    }
}
