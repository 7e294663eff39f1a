//! # sigvault CLI
//!
//! Command-line interface for the sigvault library.

use std::fs;
use std::process;

use clap::Parser;

use sigvault::cli::Args;
use sigvault::export::{ExportPaths, export, list_chats};
use sigvault::model::ArchiveData;
use sigvault::report::Reporter;
use sigvault::{Result, SigvaultError};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let reporter = Reporter::new(args.verbose);

    reporter.detail(format!("Reading archive data from {}", args.data.display()));
    let data: ArchiveData = serde_json::from_str(&fs::read_to_string(&args.data)?)?;

    if args.list_chats {
        let mut data = data;
        sigvault::names::sanitize_names(&mut data.contacts);
        println!("{}", list_chats(&data));
        return Ok(());
    }

    let Some(dest) = args.dest.as_deref() else {
        return Err(SigvaultError::InvalidData(
            "missing argument 'DEST' (or pass --list-chats)".to_string(),
        ));
    };

    let paths = ExportPaths {
        attachments_root: args.attachments.as_deref(),
        old: args.old.as_deref(),
        overwrite: args.overwrite,
    };
    export(dest, data, &paths, &args.config(), &reporter)?;

    reporter.note("Done!");
    Ok(())
}
