//! Conversation Data Structure
//!
//! Represents a two-party conversation between the signed-in identity and
//! one participant.

use serde::{Deserialize, Serialize};

use crate::shared::identity::IdentitySummary;

/// Last message snippet shown in the conversation list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastMessage {
    pub content: String,
    #[serde(default, alias = "created_at")]
    pub timestamp: Option<String>,
}

/// Represents a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: String,
    /// The other party
    pub participant: IdentitySummary,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
}

impl Conversation {
    /// Preview text of the last message, empty when there is none
    pub fn last_message_preview(&self) -> &str {
        self.last_message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}
