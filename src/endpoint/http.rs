//! `reqwest`-backed endpoint for talking to a management API over HTTPS.
//!
//! This is the production [`Endpoint`] implementation: it joins relative
//! paths onto the configured base URL, attaches default headers (bearer
//! token, `User-Agent`, `Accept`), and marshals responses into
//! [`EndpointResponse`] values. It performs no retries of its own; the core
//! above it decides what a status code means.

use std::collections::HashMap;

use crate::config::ClientConfig;
use crate::endpoint::{Endpoint, EndpointRequest, EndpointResponse, HttpMethod};
use crate::error::{CoreError, RequestError};

/// Library version from Cargo.toml, reported in the `User-Agent` header.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP endpoint for a single management API base URL.
///
/// # Thread Safety
///
/// `HttpEndpoint` is `Send + Sync`, making it safe to share across async
/// tasks. Each paged sequence or poll loop borrows it independently.
///
/// # Example
///
/// ```rust,ignore
/// use cloud_client_core::{BaseUrl, ClientConfig, EndpointRequest, HttpEndpoint};
///
/// let config = ClientConfig::builder()
///     .base_url(BaseUrl::new("https://management.example.com").unwrap())
///     .build()
///     .unwrap();
///
/// let endpoint = HttpEndpoint::new(&config);
/// let response = endpoint.fetch(EndpointRequest::get("deployments")).await?;
/// ```
#[derive(Debug)]
pub struct HttpEndpoint {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URL (e.g. `https://management.example.com`), no trailing slash.
    base_url: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpEndpoint is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpEndpoint>();
};

impl HttpEndpoint {
    /// Creates a new HTTP endpoint from the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}Cloud Client Core v{CORE_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        if let Some(token) = config.access_token() {
            default_headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", token.as_ref()),
            );
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url().as_ref().to_string(),
            default_headers,
        }
    }

    /// Returns the base URL for this endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default headers for this endpoint.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Resolves a request path to a full URL.
    ///
    /// Absolute paths (continuation tokens, poll locations) are used as-is;
    /// everything else is joined onto the base URL.
    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Parses response headers into a lowercased `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

impl Endpoint for HttpEndpoint {
    async fn fetch(&self, request: EndpointRequest) -> Result<EndpointResponse, CoreError> {
        let url = self.resolve_url(&request.path);

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                req_builder = req_builder.header(key, value);
            }
        }
        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        tracing::debug!(method = %request.method, %url, "issuing endpoint request");

        let res = req_builder
            .send()
            .await
            .map_err(|e| CoreError::Request(RequestError::from(e)))?;

        let code = res.status().as_u16();
        let final_url = res.url().to_string();
        let headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await.unwrap_or_default();

        let body = if body_text.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&body_text)
                .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
        };

        Ok(EndpointResponse::new(code, headers, body, final_url))
    }
}
