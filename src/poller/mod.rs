//! Long-running-operation tracking.
//!
//! A management API call that cannot complete within its own
//! request/response cycle answers with 202 Accepted plus a poll location
//! (or a body-embedded provisioning state), and the client is expected to
//! poll that location until the operation reaches a terminal state.
//! [`OperationPoller`] owns that loop: it classifies the trigger response
//! into an [`OperationHandle`], then drives the handle through `Running`
//! until `Succeeded`, `Failed`, or `Canceled`, honoring `Retry-After`
//! hints, an overall timeout budget, and cooperative cancellation at wait
//! boundaries.

mod policy;
mod state;

pub use policy::PollPolicy;
pub use state::{OperationHandle, OperationState, PollResult};

use std::time::Instant;

use crate::endpoint::{Endpoint, EndpointRequest, EndpointResponse, HttpMethod};
use crate::error::{CancelSource, CoreError, RequestError};
use state::{body_status, failure_from_body, BodyStatus};

/// Drives long-running operations against one endpoint.
///
/// The poller itself is stateless between operations; each tracked
/// operation lives in its own [`OperationHandle`], so one poller can serve
/// any number of sequential operations under the same policy.
///
/// # Example
///
/// ```rust,ignore
/// let poller = OperationPoller::new(&endpoint, PollPolicy::put());
///
/// let trigger = endpoint.fetch(create_request).await?;
/// let handle = poller.begin_track(HttpMethod::Put, &trigger)?;
/// let result = poller
///     .run(handle, |body| Ok(body.clone()))
///     .await?;
/// ```
pub struct OperationPoller<E: Endpoint> {
    endpoint: E,
    policy: PollPolicy,
}

impl<E: Endpoint> OperationPoller<E> {
    /// Creates a poller over the given endpoint and policy.
    pub const fn new(endpoint: E, policy: PollPolicy) -> Self {
        Self { endpoint, policy }
    }

    /// Returns the policy this poller applies.
    #[must_use]
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Classifies the response of the triggering call into a tracked
    /// operation handle.
    ///
    /// Classification order: configured failure codes first, then an
    /// explicit poll location header, then a recognized status field in the
    /// body (polling the origin URL when still in progress), then configured
    /// success codes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Request`] when the response fits none of the
    /// above; the operation cannot be tracked.
    pub fn begin_track(
        &self,
        verb: HttpMethod,
        trigger: &EndpointResponse,
    ) -> Result<OperationHandle, CoreError> {
        let mut handle = OperationHandle {
            state: OperationState::Running,
            verb,
            poll_url: None,
            origin_url: trigger.url.clone(),
            retry_after: trigger.retry_after,
            last_body: trigger.body.clone(),
            cancel: None,
        };

        if self.policy.terminal_failure_codes.contains(&trigger.code) {
            handle.state = OperationState::Failed(failure_from_body(
                &trigger.body,
                &format!("operation rejected with status {}", trigger.code),
            ));
            return Ok(handle);
        }

        if let Some(location) = trigger.poll_location() {
            handle.poll_url = Some(location.to_string());
            return Ok(handle);
        }

        if let Some(status) = body_status(&trigger.body) {
            handle.state = Self::state_for(status, &trigger.body);
            return Ok(handle);
        }

        if self.policy.terminal_success_codes.contains(&trigger.code) {
            handle.state = OperationState::Succeeded;
            return Ok(handle);
        }

        tracing::warn!(code = trigger.code, "unclassifiable trigger response");
        Err(CoreError::Request(RequestError {
            code: Some(trigger.code),
            message: format!(
                "response with status {} carries no poll location, no recognized status field, \
                 and is not a configured terminal code",
                trigger.code
            ),
            body: Some(trigger.body.to_string()),
            request_id: trigger.request_id().map(ToString::to_string),
        }))
    }

    /// Drives the handle to completion and decodes the terminal payload.
    ///
    /// Returns `Ok` only for `Succeeded`; a server-reported failure raises
    /// [`CoreError::Failed`], cancellation raises [`CoreError::Canceled`]
    /// carrying its [`CancelSource`], and exceeding the policy's overall
    /// budget raises [`CoreError::OperationTimeout`].
    ///
    /// # Errors
    ///
    /// Also propagates [`CoreError::Request`]/[`CoreError::Decode`] from a
    /// failing poll tick immediately; the poller adds no hidden retries.
    pub async fn run<T, D>(
        &self,
        handle: OperationHandle,
        decode: D,
    ) -> Result<PollResult<T>, CoreError>
    where
        D: Fn(&serde_json::Value) -> Result<T, CoreError>,
    {
        self.drive(handle, decode, |_| {}).await
    }

    /// Like [`OperationPoller::run`], additionally invoking `on_state_change`
    /// after every poll tick.
    ///
    /// The observer is strictly serialized with polling: the next tick is
    /// not issued until the observer returns.
    ///
    /// # Errors
    ///
    /// Same as [`OperationPoller::run`].
    pub async fn track<T, D, O>(
        &self,
        handle: OperationHandle,
        decode: D,
        on_state_change: O,
    ) -> Result<PollResult<T>, CoreError>
    where
        D: Fn(&serde_json::Value) -> Result<T, CoreError>,
        O: FnMut(&OperationState),
    {
        self.drive(handle, decode, on_state_change).await
    }

    async fn drive<T, D, O>(
        &self,
        mut handle: OperationHandle,
        decode: D,
        mut observe: O,
    ) -> Result<PollResult<T>, CoreError>
    where
        D: Fn(&serde_json::Value) -> Result<T, CoreError>,
        O: FnMut(&OperationState),
    {
        let started = Instant::now();
        observe(&handle.state);

        loop {
            match &handle.state {
                OperationState::Running => {}
                OperationState::Succeeded => break,
                OperationState::Failed(info) => {
                    tracing::warn!(reason = %info, "operation failed");
                    return Err(CoreError::Failed(info.clone()));
                }
                OperationState::Canceled(source) => return Err(CoreError::Canceled(*source)),
            }

            // Wait boundary: the only place caller cancellation is honored.
            if Self::canceled(&handle) {
                handle.state = OperationState::Canceled(CancelSource::Caller);
                observe(&handle.state);
                return Err(CoreError::Canceled(CancelSource::Caller));
            }

            // The wait never exceeds what is left of the overall budget.
            let remaining = self
                .policy
                .overall_timeout
                .saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(CoreError::OperationTimeout {
                    budget: self.policy.overall_timeout,
                });
            }
            let wait = self
                .policy
                .clamp_interval(handle.retry_after.unwrap_or(self.policy.initial_retry_after))
                .min(remaining);
            tokio::time::sleep(wait).await;

            if Self::canceled(&handle) {
                handle.state = OperationState::Canceled(CancelSource::Caller);
                observe(&handle.state);
                return Err(CoreError::Canceled(CancelSource::Caller));
            }
            if started.elapsed() >= self.policy.overall_timeout {
                return Err(CoreError::OperationTimeout {
                    budget: self.policy.overall_timeout,
                });
            }

            let request = EndpointRequest::get(handle.poll_target());
            tracing::debug!(target = handle.poll_target(), "poll tick");
            let response = self.endpoint.fetch(request).await?;
            self.absorb(&mut handle, &response)?;
            observe(&handle.state);
        }

        let payload_body = if self.policy.result_from_origin {
            let finale = self
                .endpoint
                .fetch(EndpointRequest::get(handle.origin_url.clone()))
                .await?;
            if !finale.is_ok() {
                return Err(CoreError::Request(RequestError {
                    code: Some(finale.code),
                    message: format!("final resource fetch returned status {}", finale.code),
                    body: Some(finale.body.to_string()),
                    request_id: finale.request_id().map(ToString::to_string),
                }));
            }
            finale.body
        } else {
            handle.last_body.clone()
        };

        let payload = decode(&payload_body)?;
        Ok(PollResult {
            state: OperationState::Succeeded,
            payload,
        })
    }

    /// Classifies one poll response into the handle's next state.
    fn absorb(
        &self,
        handle: &mut OperationHandle,
        response: &EndpointResponse,
    ) -> Result<(), CoreError> {
        handle.absorb_hints(response);
        handle.last_body = response.body.clone();

        if self.policy.terminal_failure_codes.contains(&response.code) {
            handle.state = OperationState::Failed(failure_from_body(
                &response.body,
                &format!("poll returned status {}", response.code),
            ));
            return Ok(());
        }

        if let Some(status) = body_status(&response.body) {
            handle.state = Self::state_for(status, &response.body);
            return Ok(());
        }

        // No status field: 202 means keep waiting, any other success code
        // means the operation finished and this body is the payload.
        if response.code == 202 {
            handle.state = OperationState::Running;
            return Ok(());
        }
        if response.is_ok() || self.policy.terminal_success_codes.contains(&response.code) {
            handle.state = OperationState::Succeeded;
            return Ok(());
        }

        Err(CoreError::Request(RequestError {
            code: Some(response.code),
            message: format!("poll request returned status {}", response.code),
            body: Some(response.body.to_string()),
            request_id: response.request_id().map(ToString::to_string),
        }))
    }

    fn state_for(status: BodyStatus, body: &serde_json::Value) -> OperationState {
        match status {
            BodyStatus::InProgress => OperationState::Running,
            BodyStatus::Succeeded => OperationState::Succeeded,
            BodyStatus::Failed => OperationState::Failed(failure_from_body(
                body,
                "server reported operation failure",
            )),
            BodyStatus::Canceled => OperationState::Canceled(CancelSource::Server),
        }
    }

    fn canceled(handle: &OperationHandle) -> bool {
        handle
            .cancel
            .as_ref()
            .is_some_and(crate::cancel::CancelToken::is_canceled)
    }
}
