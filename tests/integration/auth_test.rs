//! Authentication integration tests
//!
//! OAuth handshake against the mock server and identity resolution.

use assert_matches::assert_matches;
use epilink::app::auth::{self, AuthError};
use epilink::shared::error::ApiError;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{bearer, identity_json, TestApi};

#[tokio::test]
async fn test_begin_login_strips_quotes() {
    let api = TestApi::start().await;
    Mock::given(method("GET"))
        .and(path("/api/oauth2/google/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#""https://accounts.example.com/o/oauth2/auth?client_id=abc&state=xyz""#),
        )
        .expect(1)
        .mount(&api.server)
        .await;

    let url = auth::begin_login(&api.client, "google").await.unwrap();
    assert_eq!(url.host_str(), Some("accounts.example.com"));
    assert_eq!(
        url.query_pairs().find(|(k, _)| k == "client_id").map(|(_, v)| v.into_owned()),
        Some("abc".to_string())
    );
}

#[tokio::test]
async fn test_begin_login_needs_no_session() {
    let api = TestApi::start().await;
    Mock::given(path("/api/oauth2/github/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("https://github.com/login/oauth"))
        .mount(&api.server)
        .await;

    let url = auth::begin_login(&api.client, "github").await.unwrap();
    assert_eq!(url.as_str(), "https://github.com/login/oauth");
    assert!(!api.session.is_present());
}

#[tokio::test]
async fn test_unknown_provider_is_not_found() {
    let api = TestApi::start().await;
    Mock::given(path("/api/oauth2/myspace/login"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&api.server)
        .await;

    let result = auth::begin_login(&api.client, "myspace").await;
    assert_matches!(result, Err(AuthError::Api(ApiError::NotFound { .. })));
}

#[tokio::test]
async fn test_blank_provider_makes_no_call() {
    let api = TestApi::start().await;
    assert_eq!(
        auth::begin_login(&api.client, "  ").await,
        Err(AuthError::MissingProvider)
    );
    assert_eq!(api.request_count().await, 0);
}

#[tokio::test]
async fn test_garbage_redirect_rejected() {
    let api = TestApi::start().await;
    Mock::given(path("/api/oauth2/google/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"not a url\""))
        .mount(&api.server)
        .await;

    let result = auth::begin_login(&api.client, "google").await;
    assert_eq!(result, Err(AuthError::InvalidRedirect("not a url".to_string())));
}

#[tokio::test]
async fn test_callback_then_resolve_identity() {
    let api = TestApi::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("authorization", "Bearer from-callback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json("u1", "ada")))
        .expect(1)
        .mount(&api.server)
        .await;

    auth::complete_login(&api.session, "http://localhost:3000/success?token=from-callback").unwrap();
    let me = auth::resolve_identity(&api.client).await.unwrap();

    assert_eq!(me.id, "u1");
    assert_eq!(me.display_name, "ada");
    assert_eq!(me.follower_count(), 2);
    assert_eq!(me.following_count(), 1);
}

#[tokio::test]
async fn test_resolve_identity_with_stale_token() {
    let api = TestApi::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&api.server)
        .await;

    let result = auth::resolve_identity(&api.client).await;
    assert_eq!(result.unwrap_err(), ApiError::Unauthorized { status: 401 });
    assert!(!api.session.is_present());
}
