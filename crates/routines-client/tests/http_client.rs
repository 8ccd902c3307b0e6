//! HTTP behavior of the routines client against a mock server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use routines_client::monitor::poll_once;
use routines_client::{
    ComponentStatus, Error, RequestOptions, Routine, RoutineCreate, RoutineList, RoutineUpdate,
    RoutinesClient, StaticToken, TokenError, TokenProvider,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> RoutinesClient {
    RoutinesClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn authed_client(server: &MockServer, token: &str) -> RoutinesClient {
    RoutinesClient::builder()
        .base_url(server.uri())
        .token_provider(StaticToken::new(token))
        .build()
        .unwrap()
}

fn routine_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "time": "09:00 AM",
        "section_id": null,
        "created_at": "2026-10-01T08:00:00"
    })
}

/// Hands out a new token on every call.
#[derive(Debug, Default)]
struct RotatingToken {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenProvider for RotatingToken {
    async fn token(&self) -> Result<Option<String>, TokenError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(format!("token-{}", n)))
    }
}

#[derive(Debug)]
struct BrokenProvider;

#[async_trait]
impl TokenProvider for BrokenProvider {
    async fn token(&self) -> Result<Option<String>, TokenError> {
        Err(TokenError::new("identity provider unreachable"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Core request
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_success_body_is_returned_unchanged() {
    let server = MockServer::start().await;
    let body = json!({"nested": {"list": [1, 2, 3], "flag": true}, "name": "x"});
    Mock::given(method("GET"))
        .and(path("/anything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let value: serde_json::Value = client(&server)
        .request("/anything", RequestOptions::get())
        .await
        .unwrap();
    assert_eq!(value, body);
}

#[tokio::test]
async fn test_zero_timeout_still_completes_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RoutinesClient::builder()
        .base_url(server.uri())
        .timeout(Duration::ZERO)
        .build()
        .unwrap();
    let health = client.health().check().await.unwrap();
    assert!(health.is_ok());
}

#[tokio::test]
async fn test_content_type_is_always_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let health = client(&server).health().check().await.unwrap();
    assert!(health.is_ok());
}

#[tokio::test]
async fn test_caller_header_wins_on_collision() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("content-type", "text/plain"))
        .and(header("x-request-id", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let options = RequestOptions::post()
        .header(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("text/plain"),
        )
        .header(
            reqwest::header::HeaderName::from_static("x-request-id"),
            reqwest::header::HeaderValue::from_static("abc"),
        )
        .body("hello");
    let _: serde_json::Value = client(&server).request("/echo", options).await.unwrap();
}

async fn error_for(status: u16, body: &str) -> Error {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/routines/1"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;

    client(&server).routines().get(1).await.unwrap_err()
}

#[tokio::test]
async fn test_error_uses_detail() {
    let err = error_for(404, r#"{"detail":"Routine not found","message":"other"}"#).await;
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "API Error (404): Routine not found");
}

#[tokio::test]
async fn test_error_uses_message_without_detail() {
    let err = error_for(400, r#"{"message":"bad input"}"#).await;
    assert_eq!(err.to_string(), "API Error (400): bad input");
}

#[tokio::test]
async fn test_error_uses_raw_json_without_known_fields() {
    let err = error_for(409, r#"{"error":"conflict"}"#).await;
    assert_eq!(err.to_string(), r#"API Error (409): {"error":"conflict"}"#);
}

#[tokio::test]
async fn test_error_uses_raw_text() {
    let err = error_for(502, "Bad gateway from upstream").await;
    assert_eq!(err.to_string(), "API Error (502): Bad gateway from upstream");
}

#[tokio::test]
async fn test_error_uses_reason_phrase_for_empty_body() {
    let err = error_for(503, "").await;
    assert!(err.is_server_error());
    assert_eq!(err.to_string(), "API Error (503): Service Unavailable");
}

#[tokio::test]
async fn test_invalid_json_on_success_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/routines/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).routines().list(None).await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = RoutinesClient::builder().base_url(uri).build().unwrap();
    let err = client.health().check().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert!(!client.health().is_healthy().await);
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_attached_to_writes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/routines/"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({"title": "Morning run", "time": "06:30"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(routine_json(1, "Morning run")))
        .expect(1)
        .mount(&server)
        .await;

    let created = authed_client(&server, "secret")
        .routines()
        .create(&RoutineCreate::new("Morning run").with_time("06:30"))
        .await
        .unwrap();
    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/routines/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(routine_json(4, "Gone")))
        .mount(&server)
        .await;

    client(&server).routines().delete(4).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_token_failure_sends_anonymous_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/routines/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})),
        )
        .mount(&server)
        .await;

    let client = RoutinesClient::builder()
        .base_url(server.uri())
        .token_provider(BrokenProvider)
        .build()
        .unwrap();

    let err = client
        .routines()
        .create(&RoutineCreate::new("x"))
        .await
        .unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(err.to_string(), "API Error (401): Not authenticated");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_token_is_fetched_for_every_call() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/routines/2"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(routine_json(2, "first")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/routines/2"))
        .and(header("authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(routine_json(2, "second")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(RotatingToken::default());
    let client = RoutinesClient::builder()
        .base_url(server.uri())
        .shared_token_provider(provider.clone())
        .build()
        .unwrap();

    let update = RoutineUpdate {
        title: Some("renamed".to_string()),
        ..Default::default()
    };
    assert_eq!(client.routines().update(2, &update).await.unwrap().title, "first");
    assert_eq!(client.routines().update(2, &update).await.unwrap().title, "second");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_reads_do_not_ask_for_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/routines/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(routine_json(3, "Read")))
        .mount(&server)
        .await;

    let provider = Arc::new(RotatingToken::default());
    let client = RoutinesClient::builder()
        .base_url(server.uri())
        .shared_token_provider(provider.clone())
        .build()
        .unwrap();

    client.routines().get(3).await.unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Routines
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_without_limit_has_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/routines/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([routine_json(1, "a")])))
        .mount(&server)
        .await;

    let routines = client(&server).routines().list(None).await.unwrap();
    assert_eq!(routines.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_list_with_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/routines/"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let routines = client(&server).routines().list(Some(5)).await.unwrap();
    assert!(routines.is_empty());
}

#[tokio::test]
async fn test_list_own_carries_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/routines/"))
        .and(header("authorization", "Bearer me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([routine_json(8, "mine")])))
        .expect(1)
        .mount(&server)
        .await;

    let routines = authed_client(&server, "me").routines().list_own(None).await.unwrap();
    assert_eq!(routines[0].title, "mine");
}

#[tokio::test]
async fn test_create_then_delete_updates_local_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/routines/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([routine_json(1, "a"), routine_json(2, "b")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/routines/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(routine_json(3, "c")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/routines/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(routine_json(1, "a")))
        .mount(&server)
        .await;

    let client = authed_client(&server, "t");
    let mut list = RoutineList::from(client.routines().list(None).await.unwrap());

    let created = client.routines().create(&RoutineCreate::new("c")).await.unwrap();
    list.prepend(created);

    let deleted: Routine = client.routines().delete(1).await.unwrap();
    list.remove(deleted.id);

    let ids: Vec<i64> = list.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 2]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_poll_against_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/db-health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "connected",
            "database": "postgres",
            "latency_ms": 12.5,
            "rows_sampled": 1
        })))
        .mount(&server)
        .await;

    let snapshot = poll_once(&client(&server)).await;
    assert_eq!(snapshot.api, ComponentStatus::Ok);
    assert_eq!(snapshot.db, ComponentStatus::Ok);
    assert_eq!(snapshot.latency_ms, Some(12.5));
}

#[tokio::test]
async fn test_poll_skips_db_when_api_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/db-health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "connected"})))
        .expect(0)
        .mount(&server)
        .await;

    let snapshot = poll_once(&client(&server)).await;
    assert_eq!(snapshot.summary(), "API offline");
    assert_eq!(
        snapshot.error_message.as_deref(),
        Some("API Error (500): Internal Server Error")
    );
}
