//! Messaging
//!
//! Conversation list, active-thread selection, message history and sending.
//!
//! - **`api`** - endpoint wrappers
//! - **`directory`** - [`ConversationDirectory`], the conversation list
//! - **`thread`** - [`MessageThread`], the history of the selected conversation
//!
//! [`MessagingState`] ties the two together so that selecting a conversation
//! always goes through the directory and then reloads the thread.

pub mod api;
pub mod directory;
pub mod thread;

pub use directory::ConversationDirectory;
pub use thread::{MessageThread, ThreadState};

use thiserror::Error;

use crate::app::client::ApiClient;
use crate::shared::error::ApiError;
use crate::shared::identity::Identity;
use crate::shared::messaging::Message;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("message is empty")]
    BlankContent,
    #[error("no conversation selected")]
    NoConversationSelected,
    #[error("conversation is still loading")]
    ThreadNotReady,
    #[error("a message is already being sent")]
    SendInFlight,
    #[error("unknown conversation: {0}")]
    UnknownConversation(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl MessagingError {
    pub fn requires_login(&self) -> bool {
        matches!(self, MessagingError::Api(e) if e.requires_login())
    }
}

/// What happened to a load's response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer selection or a reset superseded the load
    Discarded,
}

/// The messaging screen's state
#[derive(Debug, Clone)]
pub struct MessagingState {
    pub directory: ConversationDirectory,
    pub thread: MessageThread,
}

impl MessagingState {
    pub fn new(client: ApiClient) -> Self {
        Self {
            directory: ConversationDirectory::new(client.clone()),
            thread: MessageThread::new(client),
        }
    }

    /// Load `identity`'s conversations. If the active conversation vanished
    /// from the list, its thread is dropped too.
    pub async fn load_conversations(
        &self,
        identity: &Identity,
    ) -> Result<LoadOutcome, MessagingError> {
        let outcome = self.directory.load(identity).await?;
        if outcome == LoadOutcome::Applied
            && self.directory.active_id().is_none()
            && self.thread.state() != ThreadState::Empty
        {
            self.thread.reset();
        }
        Ok(outcome)
    }

    /// Make `conversation_id` active. The previous thread is dropped before
    /// the new one starts loading.
    pub async fn select(&self, conversation_id: &str) -> Result<LoadOutcome, MessagingError> {
        let conversation = self.directory.select(conversation_id)?;
        tracing::debug!(conversation = %conversation.id, "[MESSAGING] Conversation selected");
        self.thread.select(conversation).await
    }

    pub fn clear_selection(&self) {
        self.directory.clear_selection();
        self.thread.reset();
    }

    pub async fn send(&self, content: &str) -> Result<Message, MessagingError> {
        self.thread.send(content).await
    }

    pub async fn send_draft(&self) -> Result<Message, MessagingError> {
        self.thread.send_draft().await
    }

    pub fn reset(&self) {
        self.directory.reset();
        self.thread.reset();
    }
}
