/**
 * Authentication Module
 *
 * OAuth login handshake, login-callback handling, logout and identity
 * resolution. The provider redirect itself happens outside this crate; the
 * callback hands us the token.
 */

use reqwest::Url;
use thiserror::Error;

use crate::app::client::ApiClient;
use crate::app::session::{SessionError, SessionStore};
use crate::shared::error::ApiError;
use crate::shared::identity::Identity;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no login provider given")]
    MissingProvider,
    #[error("login callback carried no token")]
    MissingToken,
    #[error("server returned an unusable login URL: {0}")]
    InvalidRedirect(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Ask the server where to send the user for `provider`'s consent screen.
pub async fn begin_login(client: &ApiClient, provider: &str) -> Result<Url, AuthError> {
    let provider = provider.trim();
    if provider.is_empty() {
        return Err(AuthError::MissingProvider);
    }

    let body = client
        .get_public_text(&format!("/api/oauth2/{}/login", provider))
        .await?;
    let raw = serde_json::from_str::<String>(&body)
        .unwrap_or_else(|_| body.trim().trim_matches('"').to_string());

    Url::parse(&raw).map_err(|_| AuthError::InvalidRedirect(raw))
}

/// Accept the OAuth redirect (full URL or bare token) and start the session.
pub fn complete_login(session: &SessionStore, callback: &str) -> Result<(), AuthError> {
    let token = extract_token(callback).ok_or(AuthError::MissingToken)?;
    session.set(token)?;
    Ok(())
}

pub fn logout(session: &SessionStore) {
    session.clear();
}

pub async fn resolve_identity(client: &ApiClient) -> Result<Identity, ApiError> {
    let identity: Identity = client.get("/api/users/me").await?;
    tracing::info!(id = %identity.id, "[SESSION] Identity resolved");
    Ok(identity)
}

/// Token from the callback: the `token` query parameter of an absolute or
/// path-relative callback URL, otherwise the whole input as a bare token.
fn extract_token(callback: &str) -> Option<String> {
    let callback = callback.trim();
    if callback.is_empty() {
        return None;
    }
    let url = match Url::parse(callback) {
        Ok(url) => url,
        // Bare tokens never carry a query; base64 `/` and `=` are fine.
        Err(_) if !callback.contains('?') => return Some(callback.to_string()),
        Err(_) => Url::parse("http://localhost/").ok()?.join(callback).ok()?,
    };
    url.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.trim().is_empty())
}
