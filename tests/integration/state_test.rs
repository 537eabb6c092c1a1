//! Navigation layer integration tests
//!
//! Guarding, identity-before-directory ordering and redirects driven by the
//! server rejecting the session.

use assert_matches::assert_matches;
use epilink::app::guard::Screen;
use epilink::app::messaging::{LoadOutcome, MessagingError};
use epilink::shared::error::ApiError;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{conversation_json, identity_json, TestApi};

async fn mount_me(api: &TestApi) {
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json("u1", "ada")))
        .expect(1)
        .mount(&api.server)
        .await;
}

#[tokio::test]
async fn test_open_messages_resolves_identity_first() {
    let api = TestApi::signed_in().await;
    mount_me(&api).await;
    Mock::given(method("GET"))
        .and(path("/messages/conversations/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            conversation_json("c1", "u2", "grace")
        ])))
        .expect(2)
        .mount(&api.server)
        .await;

    let mut state = api.app_state();
    assert_eq!(state.open_messages().await, Ok(LoadOutcome::Applied));
    assert_eq!(state.current_screen(), &Screen::Messages);
    assert_eq!(state.messaging.directory.conversations().len(), 1);

    // Identity is cached for the session.
    state.open_messages().await.unwrap();

    let paths: Vec<String> = api
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/api/users/me".to_string(),
            "/messages/conversations/u1".to_string(),
            "/messages/conversations/u1".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_open_messages_without_session_redirects() {
    let api = TestApi::start().await;
    let mut state = api.app_state();

    let result = state.open_messages().await;
    assert_eq!(result, Err(MessagingError::Api(ApiError::Unauthenticated)));
    assert_eq!(state.current_screen(), &Screen::Login);
    assert_eq!(state.pending_screen(), Some(&Screen::Messages));
    assert_eq!(api.request_count().await, 0);
}

#[tokio::test]
async fn test_rejected_session_redirects_to_login() {
    let api = TestApi::signed_in().await;
    Mock::given(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&api.server)
        .await;

    let mut state = api.app_state();
    let result = state.open_messages().await;
    assert_matches!(
        result,
        Err(MessagingError::Api(ApiError::Unauthorized { status: 403 }))
    );
    assert_eq!(state.current_screen(), &Screen::Login);
    assert!(state.identity().is_none());
    assert!(!api.session.is_present());
}

#[tokio::test]
async fn test_leaving_messages_resets_thread_and_directory() {
    let api = TestApi::signed_in().await;
    mount_me(&api).await;
    Mock::given(path("/messages/conversations/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            conversation_json("c1", "u2", "grace")
        ])))
        .mount(&api.server)
        .await;
    Mock::given(path("/messages/conversations/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&api.server)
        .await;

    let mut state = api.app_state();
    state.open_messages().await.unwrap();
    state.messaging.select("c1").await.unwrap();
    assert_eq!(state.messaging.thread.active_conversation_id().as_deref(), Some("c1"));

    state.navigate(Screen::Feed);
    assert!(state.messaging.directory.conversations().is_empty());
    assert!(state.messaging.thread.active_conversation_id().is_none());
}

#[tokio::test]
async fn test_logout_drops_identity_and_guards_again() {
    let api = TestApi::signed_in().await;
    mount_me(&api).await;

    let mut state = api.app_state();
    state.navigate(Screen::Profile);
    state.resolve_identity().await.unwrap();
    assert!(state.identity().is_some());

    state.logout();
    assert!(state.identity().is_none());
    assert_eq!(state.current_screen(), &Screen::Login);
    assert_eq!(state.navigate(Screen::Profile), &Screen::Login);
}
