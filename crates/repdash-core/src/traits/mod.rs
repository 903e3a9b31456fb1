//! Core traits at the seams between the session, storage and UI layers.

mod navigator;
mod report_service;
mod token_store;

pub use navigator::{LANDING_ROUTE, Navigator};
pub use report_service::ReportService;
pub use token_store::{StorageKey, TokenStore};
