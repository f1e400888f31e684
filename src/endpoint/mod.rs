//! The abstract endpoint collaborator the core talks to.
//!
//! This module defines the [`Endpoint`] trait plus the request and response
//! types that cross it. The core knows nothing about authentication headers,
//! domain schemas, or URL templates; the per-entity wrapper layer builds
//! opaque [`EndpointRequest`] values and hands them to a sequence or poller,
//! which drives the endpoint through this interface.
//!
//! [`HttpEndpoint`] is the production `reqwest`-backed implementation; tests
//! substitute scripted in-memory endpoints.

mod http;
#[cfg(test)]
pub(crate) mod scripted;

pub use http::HttpEndpoint;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::CoreError;

/// HTTP methods supported by the management APIs this core serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for reads and list pages.
    Get,
    /// HTTP POST method for actions and creations.
    Post,
    /// HTTP PUT method for create-or-update operations.
    Put,
    /// HTTP DELETE method for removals.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A request to be issued through an [`Endpoint`].
///
/// The `path` is either relative to the endpoint's base URL or a full
/// absolute URL (continuation tokens and poll locations arrive as absolute
/// URLs and are fetched as-is).
///
/// # Example
///
/// ```rust
/// use cloud_client_core::{EndpointRequest, HttpMethod};
///
/// let request = EndpointRequest::builder(HttpMethod::Get, "deployments")
///     .query_param("top", "50")
///     .build();
///
/// assert_eq!(request.method, HttpMethod::Get);
/// ```
#[derive(Clone, Debug)]
pub struct EndpointRequest {
    /// The HTTP method for this request.
    pub method: HttpMethod,
    /// Path relative to the endpoint base, or an absolute URL.
    pub path: String,
    /// JSON request body, if any.
    pub body: Option<serde_json::Value>,
    /// Query parameters to append to the URL.
    pub query: Option<HashMap<String, String>>,
    /// Additional headers to include in the request.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl EndpointRequest {
    /// Creates a new builder for constructing an `EndpointRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> EndpointRequestBuilder {
        EndpointRequestBuilder::new(method, path)
    }

    /// Shorthand for a plain GET of the given path or URL.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::builder(HttpMethod::Get, path).build()
    }

    /// Derives the follow-up request for an opaque continuation token or
    /// poll location, keeping this request's extra headers.
    ///
    /// The token replaces the path outright; the original query parameters
    /// are dropped because the server already folded them into the token.
    #[must_use]
    pub fn follow(&self, target: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: target.into(),
            body: None,
            query: None,
            extra_headers: self.extra_headers.clone(),
        }
    }
}

/// Builder for constructing [`EndpointRequest`] instances.
#[derive(Debug)]
pub struct EndpointRequestBuilder {
    method: HttpMethod,
    path: String,
    body: Option<serde_json::Value>,
    query: Option<HashMap<String, String>>,
    extra_headers: Option<HashMap<String, String>>,
}

impl EndpointRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: None,
            extra_headers: None,
        }
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds the [`EndpointRequest`].
    #[must_use]
    pub fn build(self) -> EndpointRequest {
        EndpointRequest {
            method: self.method,
            path: self.path,
            body: self.body,
            query: self.query,
            extra_headers: self.extra_headers,
        }
    }
}

/// A response received through an [`Endpoint`].
///
/// Header names are lowercased; headers relevant to polling (`Retry-After`,
/// the poll location) are exposed through accessors.
#[derive(Clone, Debug)]
pub struct EndpointResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed JSON response body (`{}` when the body was empty).
    pub body: serde_json::Value,
    /// The URL this response was served from.
    pub url: String,
    /// Seconds to wait before polling again (from the `Retry-After` header).
    pub retry_after: Option<Duration>,
}

impl EndpointResponse {
    /// Creates a new `EndpointResponse` with automatic header parsing.
    #[must_use]
    pub fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
        url: impl Into<String>,
    ) -> Self {
        // Only the delta-seconds form of Retry-After is recognized; an
        // HTTP-date value yields None and the poll policy default applies.
        let retry_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.parse::<f64>().ok())
            .map(Duration::from_secs_f64);

        Self {
            code,
            headers,
            body,
            url: url.into(),
            retry_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of the given header, matched case-insensitively
    /// against the lowercased header map.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the poll location for an asynchronously accepted operation.
    ///
    /// `Operation-Location` wins over the generic `Location` echo.
    #[must_use]
    pub fn poll_location(&self) -> Option<&str> {
        self.header("operation-location")
            .or_else(|| self.header("location"))
    }

    /// Returns the server request id for error reports, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }
}

/// The single abstract collaborator the core consumes.
///
/// Implementations marshal an [`EndpointRequest`] onto the wire and
/// unmarshal the reply into an [`EndpointResponse`]. Transport-level
/// failures surface as [`CoreError::Request`]; a non-2xx status is *not* an
/// error at this layer, because the poller classifies status codes itself.
#[allow(async_fn_in_trait)]
pub trait Endpoint {
    /// Issues one request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Request`] if the request could not be sent or
    /// no response was received.
    async fn fetch(&self, request: EndpointRequest) -> Result<EndpointResponse, CoreError>;
}

impl<E: Endpoint + Sync> Endpoint for &E {
    async fn fetch(&self, request: EndpointRequest) -> Result<EndpointResponse, CoreError> {
        (**self).fetch(request).await
    }
}
