//! Tests for the HTTP module

use super::*;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::pagination::{PageRequest, RequestExecutor};
use crate::types::{BackoffType, Method};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn requester_for(server: &MockServer) -> Requester {
    let config = ClientConfig::new(server.uri())
        .access_token("test-token")
        .no_rate_limit()
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_millis(10),
        );
    Requester::new(config).unwrap()
}

fn get(locator: &str) -> PageRequest {
    PageRequest {
        method: Method::GET,
        locator: locator.to_string(),
        url_override: None,
        params: Vec::new(),
    }
}

// ============================================================================
// Link Header Tests
// ============================================================================

#[test]
fn test_parse_link_header_canvas_style() {
    let header = r#"<https://canvas.test/api/v1/courses?page=2&per_page=10>; rel="next",<https://canvas.test/api/v1/courses?page=1&per_page=10>; rel="first",<https://canvas.test/api/v1/courses?page=5&per_page=10>; rel="last""#;
    let links = parse_link_header(header);

    assert_eq!(links.len(), 3);
    assert_eq!(
        links.get("next").map(String::as_str),
        Some("https://canvas.test/api/v1/courses?page=2&per_page=10")
    );
    assert_eq!(
        links.get("last").map(String::as_str),
        Some("https://canvas.test/api/v1/courses?page=5&per_page=10")
    );
}

#[test_case(r#"<https://a.test/x?page=2>; rel="next""# ; "double quotes")]
#[test_case("<https://a.test/x?page=2>; rel=next" ; "unquoted")]
#[test_case("<https://a.test/x?page=2>;rel='next'" ; "single quotes no space")]
#[test_case(r#"<https://a.test/x?page=2>; title="a, b"; REL="next""# ; "comma in param")]
#[test_case(r#"<https://a.test/x?page=2>; rel="next last""# ; "multiple rels")]
fn test_parse_link_header_variants(header: &str) {
    let links = parse_link_header(header);
    assert_eq!(
        links.get("next").map(String::as_str),
        Some("https://a.test/x?page=2")
    );
}

#[test_case("" ; "empty")]
#[test_case("<https://a.test/x>" ; "no params")]
#[test_case(r#"<https://a.test/x; rel="next""# ; "unterminated url")]
fn test_parse_link_header_without_next(header: &str) {
    assert!(parse_link_header(header).get("next").is_none());
}

#[test]
fn test_links_from_multiple_headers() {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.append(
        reqwest::header::LINK,
        r#"<https://a.test/1>; rel="current""#.parse().unwrap(),
    );
    headers.append(
        reqwest::header::LINK,
        r#"<https://a.test/2>; rel="next""#.parse().unwrap(),
    );

    let links = links_from_headers(&headers);
    assert_eq!(
        links.get("current").map(String::as_str),
        Some("https://a.test/1")
    );
    assert_eq!(
        links.get("next").map(String::as_str),
        Some("https://a.test/2")
    );
}

// ============================================================================
// URL Building Tests
// ============================================================================

#[test_case("courses", None, "https://canvas.test/api/v1/courses" ; "primary")]
#[test_case("/courses?page=2", None, "https://canvas.test/api/v1/courses?page=2" ; "leading slash")]
#[test_case("courses/1/quizzes", Some(NEW_QUIZZES), "https://canvas.test/api/quiz/v1/courses/1/quizzes" ; "new quizzes")]
#[test_case("", Some(GRAPHQL), "https://canvas.test/api/graphql" ; "graphql")]
#[test_case("items", Some("https://other.test/v2/"), "https://other.test/v2/items" ; "third party base")]
#[test_case("https://files.test/f/1", None, "https://files.test/f/1" ; "absolute locator")]
fn test_build_url(locator: &str, url_override: Option<&str>, expected: &str) {
    let requester = Requester::new(ClientConfig::new("https://canvas.test/")).unwrap();
    assert_eq!(requester.build_url(locator, url_override), expected);
}

#[test]
fn test_requester_prefixes_and_rate_limiter() {
    let config = ClientConfig::new("https://canvas.test/api/v1").access_token("secret-value");
    let requester = Requester::new(config).unwrap();
    assert_eq!(requester.base_url(), "https://canvas.test/api/v1/");
    assert_eq!(
        requester.new_quizzes_url(),
        "https://canvas.test/api/quiz/v1/"
    );
    assert!(requester.has_rate_limiter());
    assert!(!format!("{requester:?}").contains("secret-value"));
}

#[test]
fn test_requester_rejects_invalid_config() {
    assert!(matches!(
        Requester::new(ClientConfig::new("")),
        Err(Error::MissingConfigField { .. })
    ));
}

// ============================================================================
// Request Execution Tests
// ============================================================================

#[tokio::test]
async fn test_execute_decodes_body_and_links() {
    let server = MockServer::start().await;
    let next = format!("{}/api/v1/courses?page=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("per_page", "100"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{next}>; rel=\"next\"").as_str())
                .set_body_json(json!([{"id": 1}, {"id": 2}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let requester = requester_for(&server);
    let mut request = get("courses");
    request.params = vec![("per_page".to_string(), "100".to_string())];

    let response = requester.execute(request).await.unwrap();
    assert_eq!(response.body, json!([{"id": 1}, {"id": 2}]));
    assert_eq!(response.links.get("next"), Some(&next));
}

#[tokio::test]
async fn test_execute_repeated_query_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("include[]", "term"))
        .and(query_param("include[]", "teachers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = get("courses");
    request.params = vec![
        ("include[]".to_string(), "term".to_string()),
        ("include[]".to_string(), "teachers".to_string()),
    ];
    requester_for(&server).execute(request).await.unwrap();
}

#[tokio::test]
async fn test_execute_post_sends_form_params() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/courses/1/search"))
        .and(body_string_contains("per_page=100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let request = PageRequest {
        method: Method::POST,
        locator: "courses/1/search".to_string(),
        url_override: None,
        params: vec![("per_page".to_string(), "100".to_string())],
    };
    requester_for(&server).execute(request).await.unwrap();
}

#[tokio::test]
async fn test_execute_new_quizzes_override() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/quiz/v1/courses/1/quizzes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = get("courses/1/quizzes");
    request.url_override = Some(NEW_QUIZZES.to_string());
    requester_for(&server).execute(request).await.unwrap();
}

#[tokio::test]
async fn test_execute_empty_body_is_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let response = requester_for(&server).execute(get("empty")).await.unwrap();
    assert_eq!(response.body, serde_json::Value::Null);
    assert!(response.links.is_empty());
}

#[tokio::test]
async fn test_execute_invalid_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let requester = requester_for(&server);
    let err = requester.execute(get("broken")).await.unwrap_err();
    assert!(matches!(err, Error::JsonParse(_)));
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&server)
        .await;

    let requester = requester_for(&server);
    let err = requester.execute(get("missing")).await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not found");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_on_500() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let response = requester_for(&server).execute(get("flaky")).await.unwrap();
    assert_eq!(response.body, json!([{"id": 1}]));
}

#[tokio::test]
async fn test_retry_on_429_honours_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    requester_for(&server).execute(get("busy")).await.unwrap();
}

#[tokio::test]
async fn test_rate_limited_after_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let requester = requester_for(&server);
    let err = requester.execute(get("busy")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 0
        }
    ));
}

#[tokio::test]
async fn test_max_retries_exceeded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/down"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let requester = requester_for(&server);
    let err = requester.execute(get("down")).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(err.is_retryable());
}
