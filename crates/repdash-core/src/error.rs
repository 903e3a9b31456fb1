//! Error types for the repdash client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, backend, decoding, storage and input
//! validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for repdash operations.
///
/// Callers match on the variant to decide the fallback: transport failures
/// never end a session, while an unrecoverable 401 surfaces as
/// [`AuthError::SessionExpired`] or as the original [`ApiError`].
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (no response was received).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Session and credential errors raised on the client side.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the backend.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Response bodies that do not have the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Input validation errors (URLs, header values, report payloads).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Token store failures.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if this error carries an HTTP 401 from the backend.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Api(api) if api.is_unauthorized())
    }

    /// Returns true if no response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Returns the HTTP status code if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP client error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Client-side authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The operation needs a session but none is active.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The session could not be renewed and has been cleared.
    #[error("session expired")]
    SessionExpired,
}

/// A non-success response from the backend.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// The `detail` message from the response body, if present.
    pub detail: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self { status, detail }
    }

    /// Check if this is an authentication failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Check if the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body was not valid JSON or did not match the expected type.
    #[error("invalid response body: {message}")]
    Body { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A token that cannot be sent as an HTTP header value.
    #[error("token contains characters not allowed in an HTTP header")]
    HeaderValue,

    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    Field { field: &'static str, reason: String },

    /// A value outside an enumerated set.
    #[error("invalid {kind} '{value}', expected one of: {expected}")]
    Variant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    /// An update payload without any field set.
    #[error("update must change at least one field")]
    EmptyPatch,
}

/// Token store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// The stored data could not be parsed or serialised.
    #[error("corrupt store {path}: {message}")]
    Corrupt { path: String, message: String },

    /// A lock guarding in-memory state was poisoned.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Reasons a JWT could not be inspected for its expiry.
///
/// These never fail a session operation; the session logs them and skips
/// proactive refresh scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token does not have exactly three dot-separated segments.
    #[error("expected 3 segments, found {found}")]
    Segments { found: usize },

    /// The payload segment is not valid base64url.
    #[error("payload is not valid base64url")]
    Encoding,

    /// The payload is not a JSON object.
    #[error("payload is not a JSON object: {message}")]
    Payload { message: String },

    /// The payload has no numeric `exp` claim.
    #[error("payload has no exp claim")]
    MissingExpiry,
}
