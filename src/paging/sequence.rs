//! The lazy page-walking sequence.

use std::collections::VecDeque;
use std::fmt;

use crate::cancel::CancelToken;
use crate::endpoint::{Endpoint, EndpointRequest};
use crate::error::{CancelSource, CoreError, RequestError};
use crate::paging::{Flow, PageDecoder};

/// Cursor state of a [`PagedSequence`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
    /// Constructed but the first page has not been requested yet.
    NotStarted,
    /// A page request is in flight.
    Fetching,
    /// A page has been loaded and may still hold unread items.
    HasPage,
    /// The last page was consumed; no further fetch will be issued.
    Exhausted,
    /// A fetch or decode failed; the captured error replays on further calls.
    Failed,
}

/// A server-side collection presented as a single lazy, forward-only
/// sequence.
///
/// Items are served from the buffered current page without I/O; crossing a
/// page boundary fetches the next page through the continuation token (a
/// suspension point). Exhaustion is inferred only from the absence of a
/// token, never from an empty page.
///
/// Not restartable: once iteration has begun, the only way back to the start
/// is to re-issue the original query via [`PagedSequence::start`]. Not
/// thread-safe by contract; create independent sequences for concurrent
/// listings.
///
/// # Example
///
/// ```rust,ignore
/// let mut deployments = PagedSequence::start_json(
///     &endpoint,
///     EndpointRequest::get("deployments"),
///     "value",
///     "nextLink",
/// )
/// .await?;
///
/// while let Some(deployment) = deployments.next().await? {
///     println!("{deployment}");
/// }
/// ```
pub struct PagedSequence<T, E: Endpoint> {
    endpoint: E,
    request: EndpointRequest,
    decoder: PageDecoder<T>,
    buffer: VecDeque<T>,
    continuation: Option<String>,
    state: CursorState,
    error: Option<CoreError>,
    cancel: Option<CancelToken>,
}

// Manual impl: the decoder closure has no Debug.
impl<T, E: Endpoint> fmt::Debug for PagedSequence<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedSequence")
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("has_continuation", &self.continuation.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, E: Endpoint> PagedSequence<T, E> {
    /// Issues the initial request and returns the sequence positioned on the
    /// first page.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Request`] if the endpoint call fails
    /// (network/4xx/5xx, with status and body captured) or
    /// [`CoreError::Decode`] if the first page body does not decode.
    pub async fn start(
        endpoint: E,
        request: EndpointRequest,
        decoder: PageDecoder<T>,
    ) -> Result<Self, CoreError> {
        let mut sequence = Self {
            endpoint,
            request: request.clone(),
            decoder,
            buffer: VecDeque::new(),
            continuation: None,
            state: CursorState::NotStarted,
            error: None,
            cancel: None,
        };
        sequence.fetch_page(request).await?;
        Ok(sequence)
    }

    /// Attaches a cancellation token, honored at page boundaries only.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the current cursor state.
    #[must_use]
    pub const fn state(&self) -> CursorState {
        self.state
    }

    /// Returns the next item.
    ///
    /// Served from the current page without I/O when unread items remain;
    /// otherwise the next page is fetched through the continuation token.
    /// Returns `Ok(None)` once exhausted; repeated calls after exhaustion
    /// issue no further requests.
    ///
    /// # Errors
    ///
    /// A page-fetch failure moves the sequence to [`CursorState::Failed`]
    /// and the captured error is returned here and on every later call.
    /// Returns [`CoreError::Canceled`] when the attached token fires at the
    /// page boundary; the token position is preserved.
    pub async fn next(&mut self) -> Result<Option<T>, CoreError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if let Some(error) = &self.error {
                return Err(error.clone());
            }
            let Some(token) = self.continuation.take() else {
                self.state = CursorState::Exhausted;
                return Ok(None);
            };
            if self.canceled() {
                self.continuation = Some(token);
                return Err(CoreError::Canceled(CancelSource::Caller));
            }
            let request = self.request.follow(&token);
            self.fetch_page(request).await?;
        }
    }

    /// Drains the sequence into a `Vec`, in page order.
    ///
    /// Convenience for small collections only: this forces full
    /// materialization, so memory grows without bound for large result sets.
    ///
    /// # Errors
    ///
    /// Propagates the first fetch or decode failure; items read before the
    /// failure are discarded.
    pub async fn collect_all(mut self) -> Result<Vec<T>, CoreError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Feeds each item to `visitor`, honoring its continue/stop signal at
    /// page boundaries.
    ///
    /// A `Flow::Stop` returned for any item of a page is sticky: the rest of
    /// the page is still delivered, but no further page is fetched and
    /// iteration ends without error. The visitor is strictly serialized with
    /// page delivery: no fetch is issued while it runs.
    ///
    /// # Errors
    ///
    /// Same failure semantics as [`PagedSequence::next`].
    pub async fn for_each_with_control<V>(&mut self, mut visitor: V) -> Result<(), CoreError>
    where
        V: FnMut(T) -> Flow,
    {
        loop {
            if let Some(error) = &self.error {
                return Err(error.clone());
            }
            let mut flow = Flow::Continue;
            while let Some(item) = self.buffer.pop_front() {
                if visitor(item) == Flow::Stop {
                    flow = Flow::Stop;
                }
            }
            if flow == Flow::Stop {
                return Ok(());
            }
            let Some(token) = self.continuation.take() else {
                self.state = CursorState::Exhausted;
                return Ok(());
            };
            if self.canceled() {
                self.continuation = Some(token);
                return Err(CoreError::Canceled(CancelSource::Caller));
            }
            let request = self.request.follow(&token);
            self.fetch_page(request).await?;
        }
    }

    fn canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_canceled)
    }

    /// Fetches and decodes one page, replacing the buffer and token.
    ///
    /// No partial page is ever exposed: the buffer is only replaced after a
    /// successful decode.
    async fn fetch_page(&mut self, request: EndpointRequest) -> Result<(), CoreError> {
        self.state = CursorState::Fetching;

        let result = async {
            let response = self.endpoint.fetch(request).await?;
            if !response.is_ok() {
                return Err(CoreError::Request(RequestError {
                    code: Some(response.code),
                    message: format!("page request returned status {}", response.code),
                    body: Some(response.body.to_string()),
                    request_id: response.request_id().map(ToString::to_string),
                }));
            }
            (self.decoder)(&response)
        }
        .await;

        match result {
            Ok(page) => {
                tracing::debug!(
                    items = page.items.len(),
                    has_continuation = page.continuation_token.is_some(),
                    "loaded page"
                );
                self.buffer = page.items.into();
                self.continuation = page.continuation_token;
                self.state = if self.buffer.is_empty() && self.continuation.is_none() {
                    CursorState::Exhausted
                } else {
                    CursorState::HasPage
                };
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "page fetch failed");
                self.state = CursorState::Failed;
                self.error = Some(error.clone());
                Err(error)
            }
        }
    }
}

impl<T: serde::de::DeserializeOwned + 'static, E: Endpoint> PagedSequence<T, E> {
    /// Starts a sequence over the common JSON page shape
    /// `{"<items_key>": [...], "<token_key>": "..."}`.
    ///
    /// # Errors
    ///
    /// Same as [`PagedSequence::start`].
    pub async fn start_json(
        endpoint: E,
        request: EndpointRequest,
        items_key: impl Into<String>,
        token_key: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let items_key = items_key.into();
        let token_key = token_key.into();
        let decoder: PageDecoder<T> = Box::new(move |response| {
            crate::paging::Page::from_body(&response.body, &items_key, &token_key)
        });
        Self::start(endpoint, request, decoder).await
    }
}
