//! Authorized client tests
//!
//! Bearer attachment, response classification and the session side effects
//! of an unauthorized response.

use std::time::Duration;

use assert_matches::assert_matches;
use epilink::app::session::SessionEvent;
use epilink::app::ApiRequest;
use epilink::shared::error::ApiError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{bearer, TestApi};

#[tokio::test]
async fn test_attaches_bearer_token() {
    let api = TestApi::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/feed/"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&api.server)
        .await;

    let feed: Vec<Value> = api.client.get("/feed/").await.unwrap();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_no_token_never_hits_network() {
    let api = TestApi::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api.server)
        .await;

    let result = api.client.request(ApiRequest::get("/feed/")).await;
    assert_eq!(result.unwrap_err(), ApiError::Unauthenticated);
    assert_eq!(api.request_count().await, 0);
}

#[tokio::test]
async fn test_401_clears_session_and_signals() {
    let api = TestApi::signed_in().await;
    let mut events = api.session.subscribe();
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&api.server)
        .await;

    let result = api.client.request(ApiRequest::get("/api/users/me")).await;
    assert_eq!(result.unwrap_err(), ApiError::Unauthorized { status: 401 });
    assert!(!api.session.is_present());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);

    // The next call is blocked locally.
    let result = api.client.request(ApiRequest::get("/api/users/me")).await;
    assert_eq!(result.unwrap_err(), ApiError::Unauthenticated);
    assert_eq!(api.request_count().await, 1);
}

#[tokio::test]
async fn test_403_clears_session() {
    let api = TestApi::signed_in().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&api.server)
        .await;

    let result = api.client.request(ApiRequest::get("/notifications/")).await;
    assert_eq!(result.unwrap_err(), ApiError::Unauthorized { status: 403 });
    assert!(!api.session.is_present());
}

#[tokio::test]
async fn test_other_failures_keep_session() {
    let api = TestApi::signed_in().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&api.server)
        .await;
    Mock::given(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&api.server)
        .await;
    Mock::given(path("/conflict"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already following"))
        .mount(&api.server)
        .await;

    let missing = api.client.request(ApiRequest::get("/missing")).await;
    assert_eq!(missing.unwrap_err(), ApiError::not_found("/missing"));

    let broken = api.client.request(ApiRequest::get("/broken")).await;
    assert_eq!(
        broken.unwrap_err(),
        ApiError::ServerError {
            status: 500,
            message: "boom".to_string()
        }
    );

    let conflict = api.client.request(ApiRequest::post("/conflict")).await;
    assert_matches!(conflict, Err(ApiError::Rejected { status: 409, .. }));

    assert!(api.session.is_present());
}

#[tokio::test]
async fn test_unparseable_body_is_transport_failure() {
    let api = TestApi::signed_in().await;
    Mock::given(path("/feed/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&api.server)
        .await;

    let result: Result<Vec<Value>, _> = api.client.get("/feed/").await;
    assert_matches!(result, Err(ApiError::Transport { .. }));
    assert!(api.session.is_present());
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let api = TestApi::with_timeout(Duration::from_millis(200)).await;
    api.session.set("t").unwrap();
    Mock::given(path("/feed/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&api.server)
        .await;

    let result = api.client.request(ApiRequest::get("/feed/")).await;
    assert_matches!(result, Err(ApiError::Transport { .. }));
    assert!(api.session.is_present());
}

#[tokio::test]
async fn test_query_and_json_body() {
    let api = TestApi::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("q", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&api.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages/"))
        .and(body_json(json!({"content": "hi", "recipient_id": "u2"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&api.server)
        .await;

    api.client
        .request(ApiRequest::get("/search/users").query("q", "ada"))
        .await
        .unwrap();
    let payload = api
        .client
        .request(
            ApiRequest::post("/messages/")
                .json(&json!({"content": "hi", "recipient_id": "u2"}))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(payload.status, 201);
}
