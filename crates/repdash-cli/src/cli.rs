//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use repdash_core::DEFAULT_API_URL;

use crate::commands::auth::AuthCommand;
use crate::commands::columns::ColumnsCommand;
use crate::commands::reports::ReportsCommand;

/// Command-line client for the reporting dashboard API.
#[derive(Parser, Debug)]
#[command(name = "repdash")]
#[command(author, version = env!("REPDASH_VERSION"), about, long_about = None)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "REPDASH_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "REPDASH_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, log out and inspect the session
    Auth(AuthCommand),

    /// Manage reports
    Reports(ReportsCommand),

    /// Manage the columns of a report
    Columns(ColumnsCommand),
}
