//! Messaging API Client
//!
//! Endpoint wrappers for conversations and messages. All calls go through
//! the authorized client; nothing here inspects status codes.

use crate::app::client::ApiClient;
use crate::shared::error::ApiError;
use crate::shared::messaging::{Conversation, Message, SendMessageRequest};

/// Conversations of `user_id`, in server order
pub async fn load_conversations(
    client: &ApiClient,
    user_id: &str,
) -> Result<Vec<Conversation>, ApiError> {
    client
        .get(&format!("/messages/conversations/{}", user_id))
        .await
}

/// Message history of one conversation, oldest first
pub async fn load_thread(
    client: &ApiClient,
    conversation_id: &str,
) -> Result<Vec<Message>, ApiError> {
    client
        .get(&format!("/messages/conversations/{}", conversation_id))
        .await
}

/// Send `content` to `recipient_id`; returns the stored message
pub async fn send_message(
    client: &ApiClient,
    content: &str,
    recipient_id: &str,
) -> Result<Message, ApiError> {
    let request = SendMessageRequest {
        content: content.to_string(),
        recipient_id: recipient_id.to_string(),
    };
    client.post("/messages/", &request).await
}
