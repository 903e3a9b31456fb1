//! HTTP transport for the reporting API.
//!
//! This module provides the leaf client the session and the authenticated
//! adapter are built on.

mod client;
pub mod endpoints;

pub use client::{ApiRequest, ClientConfig, DEFAULT_TIMEOUT, HttpClient, RequestBody};
pub(crate) use client::is_unauthorized;
