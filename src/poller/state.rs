//! Operation state, handle, and result types.

use std::time::Duration;

use crate::cancel::CancelToken;
use crate::endpoint::{EndpointResponse, HttpMethod};
use crate::error::{CancelSource, FailureInfo};

/// The state of a tracked long-running operation.
///
/// `Succeeded`, `Failed`, and `Canceled` are terminal: once reached, the
/// state never changes again. `Canceled` carries its [`CancelSource`], so a
/// caller-initiated cancellation and a server-reported canceled outcome stay
/// distinguishable in `track` observers and in the returned
/// [`CoreError::Canceled`](crate::CoreError::Canceled).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationState {
    /// The server is still working; keep polling.
    Running,
    /// The operation completed successfully.
    Succeeded,
    /// The server reported that the operation failed.
    Failed(FailureInfo),
    /// The operation was canceled, by the caller's token or by the server.
    Canceled(CancelSource),
}

impl OperationState {
    /// Returns `true` for `Succeeded`, `Failed`, and `Canceled`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Status vocabulary recognized in response bodies.
///
/// Management APIs report progress through a `status` or `provisioningState`
/// field; the spellings vary per service but fall into four families.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BodyStatus {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

/// Extracts and classifies the status field of a response body, if any.
///
/// Looks at `status`, then `provisioningState`, then
/// `properties.provisioningState` (the usual embedded location).
pub(crate) fn body_status(body: &serde_json::Value) -> Option<BodyStatus> {
    let raw = body
        .get("status")
        .or_else(|| body.get("provisioningState"))
        .or_else(|| body.get("properties").and_then(|p| p.get("provisioningState")))
        .and_then(serde_json::Value::as_str)?;

    match raw.to_lowercase().as_str() {
        "inprogress" | "in_progress" | "running" | "accepted" | "pending" | "processing"
        | "creating" | "updating" | "deleting" => Some(BodyStatus::InProgress),
        "succeeded" | "success" | "completed" | "complete" => Some(BodyStatus::Succeeded),
        "failed" | "error" | "processing-error" => Some(BodyStatus::Failed),
        "canceled" | "cancelled" => Some(BodyStatus::Canceled),
        _ => None,
    }
}

/// Builds a [`FailureInfo`] from whatever error detail the body carries.
pub(crate) fn failure_from_body(body: &serde_json::Value, fallback: &str) -> FailureInfo {
    let error = body.get("error").unwrap_or(body);
    let code = error
        .get("code")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string);
    let message = error
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| fallback.to_string(), ToString::to_string);
    let details = if body.is_object() && !body.as_object().is_some_and(serde_json::Map::is_empty) {
        Some(body.clone())
    } else {
        None
    };
    FailureInfo {
        code,
        message,
        details,
    }
}

/// One in-flight long-running operation.
///
/// Owned exclusively by the call that created it; carries everything the
/// poll loop needs: the poll URL (or the origin echo), the originating verb,
/// the server's `Retry-After` hint, and the latest response body as the
/// terminal payload source.
#[derive(Debug)]
pub struct OperationHandle {
    pub(crate) state: OperationState,
    pub(crate) verb: HttpMethod,
    pub(crate) poll_url: Option<String>,
    pub(crate) origin_url: String,
    pub(crate) retry_after: Option<Duration>,
    pub(crate) last_body: serde_json::Value,
    pub(crate) cancel: Option<CancelToken>,
}

impl OperationHandle {
    /// Returns the current operation state.
    #[must_use]
    pub const fn state(&self) -> &OperationState {
        &self.state
    }

    /// Returns the HTTP verb of the originating request.
    #[must_use]
    pub const fn verb(&self) -> HttpMethod {
        self.verb
    }

    /// Returns the URL the loop polls: the poll location when the server
    /// supplied one, the origin resource URL otherwise.
    #[must_use]
    pub fn poll_target(&self) -> &str {
        self.poll_url.as_deref().unwrap_or(&self.origin_url)
    }

    /// Returns the server's latest `Retry-After` hint, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Returns the most recent response body seen for this operation.
    #[must_use]
    pub const fn last_body(&self) -> &serde_json::Value {
        &self.last_body
    }

    /// Attaches a cancellation token, honored at wait boundaries only.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn absorb_hints(&mut self, response: &EndpointResponse) {
        if let Some(hint) = response.retry_after {
            self.retry_after = Some(hint);
        }
        if let Some(location) = response.poll_location() {
            self.poll_url = Some(location.to_string());
        }
    }
}

/// Terminal payload of a successfully completed operation.
///
/// For create/update flows `payload` is the decoded resource; delete flows
/// decode to `()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollResult<T> {
    /// The final state; always terminal.
    pub state: OperationState,
    /// The decoded terminal payload.
    pub payload: T,
}
