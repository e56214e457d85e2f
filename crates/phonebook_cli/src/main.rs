//! Interactive phonebook.
//!
//! # Usage
//!
//! ```bash
//! # Use ./phonebook.json
//! phonebook
//!
//! # Custom data file with file logging
//! phonebook --file ~/contacts.json --log-dir /var/log/phonebook --log-level debug
//! ```

mod commands;
mod session;

use anyhow::Context;
use clap::Parser;
use phonebook_core::{
    default_log_level, init_logging, ContactService, JsonFileRepository, LogLevel,
};
use session::Session;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "phonebook", version, about = "Interactive contact manager backed by a JSON file")]
struct Cli {
    /// Contact file; created on first save.
    #[arg(long, env = "PHONEBOOK_FILE", default_value = "phonebook.json")]
    file: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "PHONEBOOK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "PHONEBOOK_LOG_LEVEL")]
    log_level: Option<LogLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.unwrap_or_else(default_log_level);
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let service = ContactService::open(JsonFileRepository::new(&cli.file))
        .with_context(|| format!("failed to load contacts from `{}`", cli.file.display()))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(service, stdin.lock(), stdout.lock()).run()
}
