//! Integration tests for cursor-based pagination over a live HTTP endpoint.
//!
//! These tests run a wiremock server and verify that paged sequences walk
//! continuation tokens end to end, stop early when told to, and surface
//! failures with HTTP context attached.

use cloud_client_core::{
    AccessToken, BaseUrl, ClientConfig, CoreError, CursorState, EndpointRequest, Flow,
    HttpEndpoint, PagedSequence,
};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq, Eq)]
struct Server {
    name: String,
}

/// Creates an endpoint pointed at the given mock server.
fn endpoint_for(server: &MockServer) -> HttpEndpoint {
    let config = ClientConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .access_token(AccessToken::new("test-token").unwrap())
        .build()
        .unwrap();
    HttpEndpoint::new(&config)
}

fn page_body(names: &[&str], next: Option<String>) -> serde_json::Value {
    let items: Vec<_> = names.iter().map(|name| json!({ "name": name })).collect();
    match next {
        Some(link) => json!({ "value": items, "nextLink": link }),
        None => json!({ "value": items }),
    }
}

// ============================================================================
// Pagination Walkthrough
// ============================================================================

#[tokio::test]
async fn test_sequence_walks_all_pages_via_continuation_tokens() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            &["charlie"],
            Some(format!("{base}/servers?page=3")),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["delta"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            &["alpha", "bravo"],
            Some(format!("{base}/servers?page=2")),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = endpoint_for(&mock_server);
    let sequence: PagedSequence<Server, _> =
        PagedSequence::start_json(&endpoint, EndpointRequest::get("servers"), "value", "nextLink")
            .await
            .unwrap();

    let names: Vec<String> = sequence
        .collect_all()
        .await
        .unwrap()
        .into_iter()
        .map(|server| server.name)
        .collect();
    assert_eq!(names, vec!["alpha", "bravo", "charlie", "delta"]);
}

#[tokio::test]
async fn test_empty_intermediate_page_is_transparent() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            &[],
            Some(format!("{base}/servers?page=3")),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["bravo"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            &["alpha"],
            Some(format!("{base}/servers?page=2")),
        )))
        .mount(&mock_server)
        .await;

    let endpoint = endpoint_for(&mock_server);
    let mut sequence: PagedSequence<Server, _> =
        PagedSequence::start_json(&endpoint, EndpointRequest::get("servers"), "value", "nextLink")
            .await
            .unwrap();

    assert_eq!(sequence.next().await.unwrap().unwrap().name, "alpha");
    // The empty page 2 is consumed silently on the way to page 3.
    assert_eq!(sequence.next().await.unwrap().unwrap().name, "bravo");
    assert_eq!(sequence.next().await.unwrap(), None);
    assert_eq!(sequence.state(), CursorState::Exhausted);
}

#[tokio::test]
async fn test_early_stop_skips_remaining_page_fetches() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["charlie"], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            &["alpha", "bravo"],
            Some(format!("{base}/servers?page=2")),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = endpoint_for(&mock_server);
    let mut sequence: PagedSequence<Server, _> =
        PagedSequence::start_json(&endpoint, EndpointRequest::get("servers"), "value", "nextLink")
            .await
            .unwrap();

    let mut seen = Vec::new();
    sequence
        .for_each_with_control(|server: Server| {
            seen.push(server.name);
            Flow::Stop
        })
        .await
        .unwrap();

    // Stop is honored at the page boundary, so the buffered item is still
    // delivered but no further page is fetched.
    assert_eq!(seen, vec!["alpha", "bravo"]);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_forbidden_start_carries_http_context() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "access denied" })),
        )
        .mount(&mock_server)
        .await;

    let endpoint = endpoint_for(&mock_server);
    let result: Result<PagedSequence<Server, _>, _> =
        PagedSequence::start_json(&endpoint, EndpointRequest::get("servers"), "value", "nextLink")
            .await;

    match result.unwrap_err() {
        CoreError::Request(error) => {
            assert_eq!(error.code, Some(403));
            assert!(error.body.unwrap().contains("access denied"));
        }
        other => panic!("expected request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_page_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "not-a-list" })))
        .mount(&mock_server)
        .await;

    let endpoint = endpoint_for(&mock_server);
    let result: Result<PagedSequence<Server, _>, _> =
        PagedSequence::start_json(&endpoint, EndpointRequest::get("servers"), "value", "nextLink")
            .await;

    assert!(matches!(result.unwrap_err(), CoreError::Decode(_)));
}

// ============================================================================
// Transport Wiring
// ============================================================================

#[tokio::test]
async fn test_bearer_token_sent_on_every_page_request() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["bravo"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            &["alpha"],
            Some(format!("{base}/servers?page=2")),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = endpoint_for(&mock_server);
    let sequence: PagedSequence<Server, _> =
        PagedSequence::start_json(&endpoint, EndpointRequest::get("servers"), "value", "nextLink")
            .await
            .unwrap();

    let all = sequence.collect_all().await.unwrap();
    assert_eq!(all.len(), 2);
}
