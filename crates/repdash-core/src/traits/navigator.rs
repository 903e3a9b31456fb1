//! Client-side navigation hook.

/// Route shown to anonymous users.
pub const LANDING_ROUTE: &str = "/";

/// Receives forced navigation when a session ends unexpectedly.
///
/// The HTTP adapter calls this after purging tokens on an unrecoverable
/// 401, so the front end can send the user back to [`LANDING_ROUTE`].
pub trait Navigator: Send + Sync {
    /// Navigate to `route`.
    fn navigate(&self, route: &str);
}
