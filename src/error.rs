//! Error taxonomy for the client core.
//!
//! Every operation in this crate fails with [`CoreError`]. The variants map
//! one-to-one onto the distinct failure classes a caller can observe:
//!
//! - [`CoreError::Request`]: transport or HTTP-level failure of a single call
//! - [`CoreError::Decode`]: a response body did not match the expected shape
//! - [`CoreError::OperationTimeout`]: a poll loop exceeded its overall budget
//! - [`CoreError::Failed`]: the server itself reported operation failure
//! - [`CoreError::Canceled`]: the operation was canceled at a suspension point
//!
//! The core performs no hidden retry: a `Request` or `Decode` error is
//! surfaced at the call where it happened.
//!
//! All variants are `Clone` so a failed [`PagedSequence`](crate::PagedSequence)
//! can replay its captured error on subsequent calls instead of pretending to
//! be exhausted.

use std::fmt;

use thiserror::Error;

/// Who initiated a cancellation.
///
/// Carried by [`CoreError::Canceled`] and
/// [`OperationState::Canceled`](crate::OperationState::Canceled) so callers
/// and `track` observers can tell their own token apart from a canceled
/// terminal state the server reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelSource {
    /// The caller's [`CancelToken`](crate::CancelToken) fired at a
    /// suspension point.
    Caller,
    /// The server reported a canceled terminal state.
    Server,
}

impl fmt::Display for CancelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Caller => f.write_str("caller"),
            Self::Server => f.write_str("server"),
        }
    }
}

/// Error returned when a single endpoint call fails at the transport or
/// HTTP level.
///
/// Covers both network failures (no status code) and non-success responses,
/// with the underlying status and body captured for diagnosis.
///
/// # Example
///
/// ```rust
/// use cloud_client_core::RequestError;
///
/// let error = RequestError {
///     code: Some(503),
///     message: "service unavailable".to_string(),
///     body: None,
///     request_id: Some("abc-123".to_string()),
/// };
///
/// assert!(error.to_string().contains("503"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("request failed{}: {message}", .code.map_or_else(String::new, |c| format!(" with status {c}")))]
pub struct RequestError {
    /// The HTTP status code, if a response was received at all.
    pub code: Option<u16>,
    /// Human-readable description of the failure.
    pub message: String,
    /// The raw response body, if one was captured.
    pub body: Option<String>,
    /// Server-side request id for error reports, if present.
    pub request_id: Option<String>,
}

impl RequestError {
    /// Creates a transport-level error with no HTTP status.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            body: None,
            request_id: None,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            code: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
            body: None,
            request_id: None,
        }
    }
}

/// Error returned when a response body cannot be parsed into the expected
/// page or result shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to decode response{}: {message}", .field.as_deref().map_or_else(String::new, |f| format!(" (field '{f}')")))]
pub struct DecodeError {
    /// Description of what failed to parse.
    pub message: String,
    /// The body field that was expected or malformed, when known.
    pub field: Option<String>,
}

impl DecodeError {
    /// Creates a decode error for a missing or malformed body field.
    #[must_use]
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            field: None,
        }
    }
}

/// Server-provided detail for an operation that reached a failure terminal
/// state.
///
/// Carries whatever the server reported: an error code, a message, and any
/// structured detail payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("operation failed{}: {message}", .code.as_deref().map_or_else(String::new, |c| format!(" ({c})")))]
pub struct FailureInfo {
    /// Server-reported error code, if any.
    pub code: Option<String>,
    /// Server-reported error message.
    pub message: String,
    /// Additional structured details from the response body.
    pub details: Option<serde_json::Value>,
}

/// Unified error type for all core operations.
///
/// Use pattern matching to distinguish failure classes at API boundaries.
///
/// # Example
///
/// ```rust,ignore
/// match sequence.next().await {
///     Ok(Some(item)) => { /* consume */ }
///     Ok(None) => { /* exhausted */ }
///     Err(CoreError::Request(e)) => eprintln!("call failed: {e}"),
///     Err(CoreError::Canceled(source)) => { /* who stopped it */ }
///     Err(other) => return Err(other.into()),
/// }
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A single endpoint call failed at the transport or HTTP level.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A response body could not be parsed into the expected shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The poll loop exceeded its configured overall timeout.
    ///
    /// Distinct from [`CoreError::Failed`], which means the server itself
    /// reported that the operation failed.
    #[error("operation did not reach a terminal state within {budget:?}")]
    OperationTimeout {
        /// The overall timeout budget that was exceeded.
        budget: std::time::Duration,
    },

    /// The server reported that the operation reached a failure state.
    #[error(transparent)]
    Failed(#[from] FailureInfo),

    /// The operation was canceled, by the caller's token at a suspension
    /// point or by the server reporting a canceled terminal state.
    #[error("operation canceled by {0}")]
    Canceled(CancelSource),
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.into())
    }
}
