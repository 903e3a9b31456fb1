//! repdash-http - Session-managed HTTP client for the reporting API.
//!
//! All authenticated traffic flows through a [`SessionManager`], which owns
//! the tokens and renews them ahead of expiry, and an [`ApiClient`], which
//! replays a rejected request once after refreshing.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use repdash_core::{ApiUrl, Credentials, MemoryTokenStore, Navigator, ReportService};
//! use repdash_core::report::Page;
//! use repdash_http::{ApiClient, ClientConfig, HttpClient, ReportsClient, SessionConfig, SessionManager};
//!
//! struct Log;
//! impl Navigator for Log {
//!     fn navigate(&self, route: &str) {
//!         eprintln!("navigate to {}", route);
//!     }
//! }
//!
//! # async fn example() -> Result<(), repdash_core::Error> {
//! let http = HttpClient::new(&ClientConfig::new(ApiUrl::new("https://reports.example.com")?))?;
//! let session = SessionManager::new(http, Arc::new(MemoryTokenStore::new()), SessionConfig::default());
//! session.initialize()?;
//! session.login(&Credentials::new("a@b.com", "secret")).await?;
//!
//! let reports = ReportsClient::new(ApiClient::new(session, Arc::new(Log)));
//! for report in reports.list_reports(Page::default()).await? {
//!     println!("{}: {}", report.id, report.title);
//! }
//! # Ok(())
//! # }
//! ```

mod api;
pub mod http;
mod reports;
mod session;
mod timer;

pub use api::ApiClient;
pub use http::{ApiRequest, ClientConfig, HttpClient};
pub use reports::ReportsClient;
pub use session::{
    DEFAULT_MIN_REFRESH_DELAY, DEFAULT_REFRESH_LEEWAY, LogoutOutcome, SessionConfig,
    SessionManager, SessionStatus,
};
