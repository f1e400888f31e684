//! Cursor-based pagination over an [`Endpoint`](crate::endpoint::Endpoint).
//!
//! A listing call returns one [`Page`] of items plus an opaque continuation
//! token; [`PagedSequence`] follows those tokens lazily, presenting the whole
//! server-side collection as a single forward-only sequence. The caller can
//! drain it item by item with `next()`, materialize it with `collect_all()`,
//! or walk it under continue/stop control with `for_each_with_control()`.

mod sequence;

pub use sequence::{CursorState, PagedSequence};

use serde::de::DeserializeOwned;

use crate::endpoint::EndpointResponse;
use crate::error::{CoreError, DecodeError};

/// One server page of a collection.
///
/// Invariant: `continuation_token` is `None` exactly when this is the last
/// page. A page with zero items but a token is legal; servers may return
/// empty intermediate pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// The items on this page, in server order.
    pub items: Vec<T>,
    /// Opaque cursor for the next page; `None` on the last page.
    pub continuation_token: Option<String>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Decodes a page from a JSON body of the common
    /// `{"<items_key>": [...], "<token_key>": "..."}` shape.
    ///
    /// A missing, null, or empty token field means the last page.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if `items_key` is absent, not an array,
    /// or its elements do not deserialize into `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloud_client_core::Page;
    /// use serde_json::json;
    ///
    /// let body = json!({"value": [1, 2, 3], "nextLink": "https://x/page2"});
    /// let page: Page<u32> = Page::from_body(&body, "value", "nextLink").unwrap();
    ///
    /// assert_eq!(page.items, vec![1, 2, 3]);
    /// assert_eq!(page.continuation_token.as_deref(), Some("https://x/page2"));
    /// ```
    pub fn from_body(
        body: &serde_json::Value,
        items_key: &str,
        token_key: &str,
    ) -> Result<Self, CoreError> {
        let raw_items = body
            .get(items_key)
            .ok_or_else(|| DecodeError::field(items_key, "missing items array"))?;
        if !raw_items.is_array() {
            return Err(DecodeError::field(items_key, "expected an array").into());
        }
        let items: Vec<T> = serde_json::from_value(raw_items.clone())
            .map_err(|e| DecodeError::field(items_key, e.to_string()))?;

        let continuation_token = body
            .get(token_key)
            .and_then(serde_json::Value::as_str)
            .filter(|token| !token.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            items,
            continuation_token,
        })
    }
}

/// Decodes an endpoint response into one page of `T`.
///
/// Generated wrappers supply one of these per list operation instead of a
/// subclass per entity type; the sequence holds it for the whole walk.
pub type PageDecoder<T> =
    Box<dyn Fn(&EndpointResponse) -> Result<Page<T>, CoreError> + Send + Sync>;

/// Caller decision after consuming items, applied at page boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep fetching further pages.
    Continue,
    /// Stop after the current page; no further fetch is issued.
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_body_decodes_items_and_token() {
        let body = json!({
            "value": [{"name": "q1"}, {"name": "q2"}],
            "nextLink": "https://x/queues?skiptoken=abc"
        });
        let page: Page<serde_json::Value> = Page::from_body(&body, "value", "nextLink").unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(
            page.continuation_token.as_deref(),
            Some("https://x/queues?skiptoken=abc")
        );
    }

    #[test]
    fn test_from_body_missing_token_means_last_page() {
        let body = json!({"value": []});
        let page: Page<serde_json::Value> = Page::from_body(&body, "value", "nextLink").unwrap();
        assert!(page.continuation_token.is_none());
    }

    #[test]
    fn test_from_body_empty_token_means_last_page() {
        let body = json!({"value": [1], "nextLink": ""});
        let page: Page<u32> = Page::from_body(&body, "value", "nextLink").unwrap();
        assert!(page.continuation_token.is_none());
    }

    #[test]
    fn test_from_body_missing_items_is_decode_error() {
        let body = json!({"nextLink": "x"});
        let result: Result<Page<u32>, _> = Page::from_body(&body, "value", "nextLink");
        assert!(matches!(result, Err(CoreError::Decode(_))));
    }

    #[test]
    fn test_from_body_non_array_items_is_decode_error() {
        let body = json!({"value": "not-an-array"});
        let result: Result<Page<u32>, _> = Page::from_body(&body, "value", "nextLink");
        assert!(matches!(result, Err(CoreError::Decode(_))));
    }

    #[test]
    fn test_from_body_wrong_element_type_is_decode_error() {
        let body = json!({"value": ["one", "two"]});
        let result: Result<Page<u32>, _> = Page::from_body(&body, "value", "nextLink");
        assert!(matches!(result, Err(CoreError::Decode(_))));
    }
}
