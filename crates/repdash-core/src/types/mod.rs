//! Validated value types shared by the client crates.

mod api_url;

pub use api_url::ApiUrl;
