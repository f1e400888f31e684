//! Configuration types for the HTTP endpoint binding.
//!
//! This module provides the configuration used to construct an
//! [`HttpEndpoint`](crate::endpoint::HttpEndpoint): a validated base URL,
//! an optional access token, and an optional user-agent prefix.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: the endpoint configuration struct
//! - [`ClientConfigBuilder`]: a builder for constructing [`ClientConfig`]
//! - [`BaseUrl`]: a validated service base URL newtype
//! - [`AccessToken`]: a bearer token newtype with masked debug output
//!
//! # Example
//!
//! ```rust
//! use cloud_client_core::{AccessToken, BaseUrl, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url(BaseUrl::new("https://management.example.com").unwrap())
//!     .access_token(AccessToken::new("token-value").unwrap())
//!     .user_agent_prefix("MyTool/1.0")
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;

use thiserror::Error;

/// Errors that can occur during configuration.
///
/// All configuration constructors validate on construction and fail fast
/// with a clear, actionable message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL cannot be empty.
    #[error("Base URL cannot be empty. Provide the service's management endpoint URL.")]
    EmptyBaseUrl,

    /// Base URL is not a valid absolute http(s) URL.
    #[error("Invalid base URL '{url}'. Expected an absolute http:// or https:// URL.")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Access token cannot be empty.
    #[error("Access token cannot be empty. Omit it entirely for unauthenticated endpoints.")]
    EmptyAccessToken,

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: String,
    },
}

/// A validated service base URL.
///
/// Accepts absolute `http` or `https` URLs; a trailing slash is stripped so
/// paths can be joined uniformly.
///
/// # Example
///
/// ```rust
/// use cloud_client_core::BaseUrl;
///
/// let url = BaseUrl::new("https://management.example.com/").unwrap();
/// assert_eq!(url.as_ref(), "https://management.example.com");
///
/// assert!(BaseUrl::new("ftp://example.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] if the URL is empty, or
    /// [`ConfigError::InvalidBaseUrl`] if it is not an absolute http(s) URL.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        if url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        let parsed = reqwest::Url::parse(&url)
            .map_err(|_| ConfigError::InvalidBaseUrl { url: url.clone() })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl { url });
        }
        Ok(Self(url.trim_end_matches('/').to_string()))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated bearer access token.
///
/// The token value is masked in debug output so it cannot leak through logs.
///
/// # Example
///
/// ```rust
/// use cloud_client_core::AccessToken;
///
/// let token = AccessToken::new("secret-value").unwrap();
/// assert_eq!(format!("{token:?}"), "AccessToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a new validated access token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAccessToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyAccessToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

/// Configuration for an [`HttpEndpoint`](crate::endpoint::HttpEndpoint).
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: BaseUrl,
    access_token: Option<AccessToken>,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the access token, if configured.
    #[must_use]
    pub const fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// The only required field is `base_url`.
///
/// # Example
///
/// ```rust
/// use cloud_client_core::{BaseUrl, ClientConfig};
///
/// let config = ClientConfig::builder()
///     .base_url(BaseUrl::new("https://management.example.com").unwrap())
///     .build()
///     .unwrap();
///
/// assert!(config.access_token().is_none());
/// ```
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<BaseUrl>,
    access_token: Option<AccessToken>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the bearer access token.
    #[must_use]
    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Sets a prefix for the `User-Agent` header.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` was not set.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ConfigError::MissingRequiredField {
                field: "base_url".to_string(),
            })?;

        Ok(ClientConfig {
            base_url,
            access_token: self.access_token,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let url = BaseUrl::new("https://management.example.com/").unwrap();
        assert_eq!(url.as_ref(), "https://management.example.com");
    }

    #[test]
    fn test_base_url_rejects_empty() {
        assert_eq!(BaseUrl::new(""), Err(ConfigError::EmptyBaseUrl));
    }

    #[test]
    fn test_base_url_rejects_non_http_schemes() {
        assert!(matches!(
            BaseUrl::new("ftp://example.com"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            BaseUrl::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_access_token_debug_is_masked() {
        let token = AccessToken::new("very-secret").unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("very-secret"));
        assert_eq!(debug, "AccessToken(*****)");
    }

    #[test]
    fn test_access_token_rejects_empty() {
        assert_eq!(AccessToken::new(""), Err(ConfigError::EmptyAccessToken));
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientConfig::builder().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field }) if field == "base_url"
        ));
    }

    #[test]
    fn test_builder_with_all_fields() {
        let config = ClientConfig::builder()
            .base_url(BaseUrl::new("https://management.example.com").unwrap())
            .access_token(AccessToken::new("token").unwrap())
            .user_agent_prefix("MyTool/1.0")
            .build()
            .unwrap();

        assert_eq!(config.base_url().as_ref(), "https://management.example.com");
        assert_eq!(config.access_token().unwrap().as_ref(), "token");
        assert_eq!(config.user_agent_prefix(), Some("MyTool/1.0"));
    }
}
