//! Session setup shared by every command.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;
use directories::ProjectDirs;
use tracing::debug;

use repdash_core::{ApiUrl, Navigator};
use repdash_file::FileTokenStore;
use repdash_http::{
    ApiClient, ClientConfig, HttpClient, ReportsClient, SessionConfig, SessionManager,
};

use crate::cli::Cli;

/// A restored session and the clients built on it.
pub struct Context {
    pub session: SessionManager,
    pub reports: ReportsClient,
}

impl Context {
    /// Build the session from the global options and restore any stored
    /// tokens. Makes no network call.
    pub fn load(cli: &Cli) -> Result<Self> {
        let api_url = ApiUrl::new(&cli.api_url).context("Invalid API URL")?;
        let http = HttpClient::new(&ClientConfig::new(api_url))
            .context("Failed to create HTTP client")?;

        let path = match &cli.store {
            Some(path) => path.clone(),
            None => default_store_path()?,
        };
        debug!(path = %path.display(), "using session file");

        let store = Arc::new(FileTokenStore::new(path));
        let session = SessionManager::new(http, store, SessionConfig::default());
        session
            .initialize()
            .context("Failed to read stored session")?;

        let api = ApiClient::new(session.clone(), Arc::new(TerminalNavigator));
        Ok(Self {
            session,
            reports: ReportsClient::new(api),
        })
    }
}

/// Get the default session file path.
fn default_store_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "repdash").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Tells the user to log in again when the session is dropped.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        debug!(route, "session ended");
        eprintln!(
            "{} {}",
            "!".yellow(),
            "Session expired, log in again with 'repdash auth login'.".yellow()
        );
    }
}
