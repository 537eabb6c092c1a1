//! Chat Message Data Structure
//!
//! Represents a message in a conversation.

use serde::{Deserialize, Serialize};

/// Represents a chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message ID
    pub id: String,
    /// Conversation this message belongs to. The server omits it on some
    /// endpoints; the thread fills it in on load.
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// User who sent the message
    pub sender_id: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
    /// Message content
    pub content: String,
    /// When the message was sent (ISO-8601 string as produced by the server)
    #[serde(alias = "created_at")]
    pub timestamp: String,
}

impl Message {
    /// Get a preview of the message (first N characters)
    pub fn preview(&self, max_len: usize) -> String {
        if self.content.chars().count() <= max_len {
            self.content.clone()
        } else {
            let mut preview: String = self
                .content
                .chars()
                .take(max_len.saturating_sub(3))
                .collect();
            preview.push_str("...");
            preview
        }
    }

    /// Parsed timestamp, tolerating the offset-less form the server emits
    pub fn sent_at(&self) -> Option<chrono::NaiveDateTime> {
        chrono::DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.naive_utc())
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
    }
}

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub content: String,
    pub recipient_id: String,
}
