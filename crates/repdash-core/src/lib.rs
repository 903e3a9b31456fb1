//! repdash-core - Core types and traits for the reporting dashboard client.
//!
//! This crate holds everything that does not touch the network: the error
//! taxonomy, credentials and token types, JWT expiry inspection, the
//! validated API URL, the storage/navigation/report traits, and the report
//! and column data shapes.

#[macro_use]
mod macros;

pub mod account;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod report;
pub mod tokens;
pub mod traits;
pub mod types;

pub use account::{SignupRequest, User, UserRole};
pub use credentials::Credentials;
pub use error::Error;
pub use memory::MemoryTokenStore;
pub use report::{Report, ReportCache, ReportColumn};
pub use tokens::{AccessToken, Claims, RefreshToken};
pub use traits::{LANDING_ROUTE, Navigator, ReportService, StorageKey, TokenStore};
pub use types::ApiUrl;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "https://localhost:8000/";

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
