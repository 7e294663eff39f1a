//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ExportConfig;

/// Export Signal Desktop conversations, contacts and attachments into a
/// browsable file tree, with additive incremental merge.
#[derive(Parser, Debug, Clone)]
#[command(name = "sigvault")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    sigvault backup/ --data data.json --attachments ~/Signal/attachments.noindex
    sigvault backup/ --data data.json --old previous-backup/
    sigvault backup/ --data data.json --paginate 0 --no-quote
    sigvault --data data.json --list-chats")]
pub struct Args {
    /// Output directory for the exported tree
    pub dest: Option<PathBuf>,

    /// Extraction data document (contacts + conversations JSON)
    #[arg(long, value_name = "FILE")]
    pub data: PathBuf,

    /// Root directory holding the raw attachment files
    #[arg(long, value_name = "DIR")]
    pub attachments: Option<PathBuf>,

    /// Previous export to merge into this one (never modified)
    #[arg(long, value_name = "DIR")]
    pub old: Option<PathBuf>,

    /// Reuse an existing output directory
    #[arg(short, long)]
    pub overwrite: bool,

    /// Leave quoted (replied-to) text out of transcripts
    #[arg(long)]
    pub no_quote: bool,

    /// Messages per page in HTML; 0 or less for a single page
    #[arg(short, long, default_value_t = 100, value_name = "COUNT")]
    pub paginate: i64,

    /// Skip HTML output
    #[arg(long)]
    pub no_html: bool,

    /// Also export conversations without any messages
    #[arg(long)]
    pub include_empty: bool,

    /// List available chats and exit
    #[arg(short, long)]
    pub list_chats: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds the pipeline configuration from the parsed flags.
    pub fn config(&self) -> ExportConfig {
        ExportConfig::new()
            .with_include_quote(!self.no_quote)
            .with_messages_per_page(self.paginate)
            .with_include_empty(self.include_empty)
            .with_html(!self.no_html)
            .with_verbose(self.verbose)
    }
}
