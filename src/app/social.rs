//! Feed, post, follow and search endpoints.
//!
//! These screens only fetch and render; there is no state to coordinate, so
//! the module is a set of thin wrappers over the authorized client.

use thiserror::Error;

use crate::app::client::{ApiClient, ApiRequest};
use crate::shared::error::ApiError;
use crate::shared::identity::Identity;
use crate::shared::post::{Comment, CreateCommentRequest, CreatePostRequest, Post};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SocialError {
    #[error("{0} must not be empty")]
    Blank(&'static str),
    #[error("invalid id: {0:?}")]
    InvalidId(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

fn require_text(field: &'static str, value: &str) -> Result<(), SocialError> {
    if value.trim().is_empty() {
        return Err(SocialError::Blank(field));
    }
    Ok(())
}

/// Ids become a single path segment; anything that would change the path
/// or start a query is refused before the request is built.
fn require_id(id: &str) -> Result<&str, SocialError> {
    let id = id.trim();
    if id.is_empty() || id.contains(|c: char| matches!(c, '/' | '?' | '#' | '%')) {
        return Err(SocialError::InvalidId(id.to_string()));
    }
    Ok(id)
}

pub async fn load_feed(client: &ApiClient) -> Result<Vec<Post>, ApiError> {
    client.get("/feed/").await
}

pub async fn create_post(
    client: &ApiClient,
    title: &str,
    content: &str,
) -> Result<Post, SocialError> {
    require_text("title", title)?;
    require_text("content", content)?;
    let request = CreatePostRequest {
        title: title.to_string(),
        content: content.to_string(),
    };
    Ok(client.post("/posts/create", &request).await?)
}

pub async fn load_post(client: &ApiClient, post_id: &str) -> Result<Post, SocialError> {
    let post_id = require_id(post_id)?;
    Ok(client.get(&format!("/posts/{}", post_id)).await?)
}

pub async fn load_comments(
    client: &ApiClient,
    post_id: &str,
) -> Result<Vec<Comment>, SocialError> {
    let post_id = require_id(post_id)?;
    Ok(client.get(&format!("/posts/{}/comments", post_id)).await?)
}

/// Post and its comments, fetched concurrently
pub async fn load_post_with_comments(
    client: &ApiClient,
    post_id: &str,
) -> Result<(Post, Vec<Comment>), SocialError> {
    futures_util::try_join!(load_post(client, post_id), load_comments(client, post_id))
}

pub async fn create_comment(
    client: &ApiClient,
    post_id: &str,
    content: &str,
) -> Result<Comment, SocialError> {
    let post_id = require_id(post_id)?;
    require_text("comment", content)?;
    let request = CreateCommentRequest {
        content: content.to_string(),
    };
    Ok(client
        .post(&format!("/posts/{}/comments", post_id), &request)
        .await?)
}

pub async fn follow(client: &ApiClient, user_id: &str) -> Result<(), SocialError> {
    let user_id = require_id(user_id)?;
    client
        .request(ApiRequest::post(format!("/follow/{}", user_id)))
        .await?;
    Ok(())
}

pub async fn unfollow(client: &ApiClient, user_id: &str) -> Result<(), SocialError> {
    let user_id = require_id(user_id)?;
    client
        .request(ApiRequest::delete(format!("/follow/{}", user_id)))
        .await?;
    Ok(())
}

pub async fn followers(client: &ApiClient, user_id: &str) -> Result<Vec<Identity>, SocialError> {
    let user_id = require_id(user_id)?;
    Ok(client.get(&format!("/follow/{}", user_id)).await?)
}

pub async fn following(client: &ApiClient, user_id: &str) -> Result<Vec<Identity>, SocialError> {
    let user_id = require_id(user_id)?;
    Ok(client.get(&format!("/follow/{}/following", user_id)).await?)
}

pub async fn search_users(client: &ApiClient, query: &str) -> Result<Vec<Identity>, SocialError> {
    require_text("query", query)?;
    let payload = client
        .request(ApiRequest::get("/search/users").query("q", query.trim()))
        .await?;
    Ok(payload.json()?)
}

pub async fn search_posts(client: &ApiClient, query: &str) -> Result<Vec<Post>, SocialError> {
    require_text("query", query)?;
    let payload = client
        .request(ApiRequest::get("/search/posts").query("q", query.trim()))
        .await?;
    Ok(payload.json()?)
}
