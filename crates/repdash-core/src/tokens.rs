//! Bearer token types and JWT expiry inspection.

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::TokenError;

/// An access token for authenticated API requests.
///
/// Access tokens are short-lived JWTs. The client reads their `exp` claim
/// to schedule renewal but never verifies the signature; that is the
/// backend's job.
///
/// # Security
///
/// Never logged or displayed in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value.
    ///
    /// # Security
    ///
    /// Use only when constructing authorization headers or persisting.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Decode the claims this client cares about.
    pub fn claims(&self) -> Result<Claims, TokenError> {
        Claims::decode(&self.0)
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token for obtaining new access tokens.
///
/// The backend issues opaque refresh tokens; treat them as such.
///
/// # Security
///
/// Never logged or displayed in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// Claims decoded from an access token payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    /// Expiry as Unix seconds.
    pub exp: i64,
}

#[derive(Deserialize)]
struct RawClaims {
    exp: Option<serde_json::Value>,
}

impl Claims {
    /// Decode the payload segment of a three-part JWT.
    ///
    /// Padding on the payload segment is tolerated. Fractional `exp`
    /// values are truncated to whole seconds.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::Segments {
                found: segments.len(),
            });
        }

        let payload = URL_SAFE_NO_PAD
            .decode(segments[1].trim_end_matches('='))
            .map_err(|_| TokenError::Encoding)?;

        let raw: RawClaims =
            serde_json::from_slice(&payload).map_err(|e| TokenError::Payload {
                message: e.to_string(),
            })?;

        let exp = raw
            .exp
            .as_ref()
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .ok_or(TokenError::MissingExpiry)?;

        Ok(Self { exp })
    }

    /// Expiry in Unix milliseconds.
    pub fn expires_at_ms(&self) -> i64 {
        self.exp.saturating_mul(1000)
    }
}

/// Compute how long to wait before proactively refreshing.
///
/// The refresh is due `leeway` before expiry, but never sooner than
/// `floor` from now, so an expired token or a skewed clock cannot cause a
/// refresh storm.
///
/// Arithmetic saturates, so an `exp` at either end of the range still
/// yields a delay.
pub fn refresh_delay(claims: &Claims, now_ms: i64, leeway: Duration, floor: Duration) -> Duration {
    let leeway_ms = i64::try_from(leeway.as_millis()).unwrap_or(i64::MAX);
    let floor_ms = i64::try_from(floor.as_millis()).unwrap_or(i64::MAX);
    let refresh_at = claims.expires_at_ms().saturating_sub(leeway_ms);
    let until = refresh_at.saturating_sub(now_ms).max(floor_ms);
    Duration::from_millis(u64::try_from(until).unwrap_or(0))
}
