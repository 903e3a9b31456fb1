//! repdash-file - Filesystem-backed token storage.
//!
//! Persists the session tokens in a small JSON file so a session survives
//! process restarts, the way a browser keeps them in local storage.

mod store;

pub use store::FileTokenStore;
