//! # Cloud Client Core
//!
//! Client-library core for cloud management APIs: long-running-operation
//! polling and cursor-based pagination over an abstract HTTP endpoint.
//!
//! ## Overview
//!
//! This crate provides:
//! - An [`Endpoint`] trait abstracting the HTTP transport, with a
//!   production [`HttpEndpoint`] implementation over reqwest
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Long-running-operation tracking via [`OperationPoller`], with
//!   per-verb [`PollPolicy`] presets, `Retry-After` handling, and an
//!   overall timeout budget
//! - Cursor-based pagination via [`PagedSequence`], exposing pages of
//!   decoded items behind opaque continuation tokens
//! - Cooperative cancellation via [`CancelToken`], honored at suspension
//!   points only
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cloud_client_core::{AccessToken, BaseUrl, ClientConfig, HttpEndpoint};
//!
//! let config = ClientConfig::builder()
//!     .base_url(BaseUrl::new("https://management.example.com").unwrap())
//!     .access_token(AccessToken::new("your-token").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let endpoint = HttpEndpoint::new(&config);
//! ```
//!
//! ## Tracking a Long-Running Operation
//!
//! ```rust,ignore
//! use cloud_client_core::{HttpMethod, OperationPoller, PollPolicy};
//!
//! let poller = OperationPoller::new(&endpoint, PollPolicy::put());
//!
//! let trigger = endpoint.fetch(create_request).await?;
//! let handle = poller.begin_track(HttpMethod::Put, &trigger)?;
//! let result = poller.run(handle, |body| Ok(body.clone())).await?;
//! ```
//!
//! ## Walking a Paginated Collection
//!
//! ```rust,ignore
//! use cloud_client_core::{EndpointRequest, PagedSequence};
//!
//! let request = EndpointRequest::get("servers");
//! let mut servers: PagedSequence<Server, _> =
//!     PagedSequence::start_json(&endpoint, request, "value", "nextLink").await?;
//!
//! while let Some(server) = servers.next().await? {
//!     println!("{}", server.name);
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All public types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio async runtime
//! - **Transport-agnostic core**: the poller and sequence depend only on
//!   the [`Endpoint`] trait, never on a concrete HTTP client

pub mod cancel;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod paging;
pub mod poller;

// Re-export public types at crate root for convenience
pub use cancel::CancelToken;
pub use config::{AccessToken, BaseUrl, ClientConfig, ClientConfigBuilder, ConfigError};
pub use endpoint::{
    Endpoint, EndpointRequest, EndpointRequestBuilder, EndpointResponse, HttpEndpoint, HttpMethod,
};
pub use error::{CancelSource, CoreError, DecodeError, FailureInfo, RequestError};
pub use paging::{CursorState, Flow, Page, PageDecoder, PagedSequence};
pub use poller::{OperationHandle, OperationPoller, OperationState, PollPolicy, PollResult};
