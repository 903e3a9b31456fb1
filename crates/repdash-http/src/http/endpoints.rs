//! Backend endpoint paths and auth request/response shapes.

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Form-encoded credential exchange.
pub const LOGIN: &str = "/auth/login";

/// Account registration.
pub const SIGNUP: &str = "/auth/signup";

/// Access token renewal.
pub const REFRESH: &str = "/auth/refresh";

/// Refresh token revocation.
pub const LOGOUT: &str = "/auth/logout";

/// Report collection.
pub const REPORTS: &str = "/reports";

/// Every user's reports, newest first. Admin only.
pub const ADMIN_REPORTS: &str = "/admin/reports";

/// A single report.
pub fn report(id: i64) -> String {
    format!("{}/{}", REPORTS, id)
}

/// Columns of a report.
pub fn columns(report_id: i64) -> String {
    format!("{}/{}/columns", REPORTS, report_id)
}

/// A single column.
pub fn column(report_id: i64, column_id: i64) -> String {
    format!("{}/{}/columns/{}", REPORTS, report_id, column_id)
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body for refresh and logout.
#[derive(Serialize)]
pub struct RefreshTokenBody<'a> {
    pub refresh_token: &'a str,
}

/// Keys a refresh response may carry the new access token under, in
/// order of preference.
pub const ACCESS_TOKEN_KEYS: [&str; 3] = ["access_token", "access", "token"];

/// Pull the access token out of an auth response.
///
/// Returns the first non-empty string found under [`ACCESS_TOKEN_KEYS`].
pub fn extract_access_token(body: &Value) -> Option<&str> {
    ACCESS_TOKEN_KEYS
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .find(|token| !token.is_empty())
}

/// Pull a non-empty `refresh_token` out of an auth response.
pub fn extract_refresh_token(body: &Value) -> Option<&str> {
    body.get("refresh_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_paths() {
        assert_eq!(report(7), "/reports/7");
        assert_eq!(columns(7), "/reports/7/columns");
        assert_eq!(column(7, 3), "/reports/7/columns/3");
    }

    #[test]
    fn access_token_key_precedence() {
        let body = json!({"access": "A", "token": "T"});
        assert_eq!(extract_access_token(&body), Some("A"));

        let body = json!({"access_token": "", "access": "", "token": "T"});
        assert_eq!(extract_access_token(&body), Some("T"));

        let body = json!({"access_token": "X", "access": "A"});
        assert_eq!(extract_access_token(&body), Some("X"));

        let body = json!({"access_token": 12, "detail": "ok"});
        assert_eq!(extract_access_token(&body), None);
        assert_eq!(extract_access_token(&Value::Null), None);
    }

    #[test]
    fn refresh_token_must_be_non_empty() {
        assert_eq!(extract_refresh_token(&json!({"refresh_token": "r"})), Some("r"));
        assert_eq!(extract_refresh_token(&json!({"refresh_token": ""})), None);
        assert_eq!(extract_refresh_token(&json!({})), None);
    }
}
