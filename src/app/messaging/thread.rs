//! Message Thread
//!
//! Holds the ordered history of exactly one selected conversation.
//!
//! ```text
//! Empty --select--> Loading --loaded--> Ready --send ok--> Ready (+1 message)
//!                      |
//!                      +--load failed--> Failed
//! ```
//!
//! Every load is tagged with the conversation id it targets and a
//! generation number. Switching conversations (or [`MessageThread::reset`])
//! bumps the generation and drops the thread back to `Empty` before the new
//! load starts, so a response that arrives for an older selection is
//! discarded instead of overwriting the current thread.
//!
//! The handle is cheap to clone; clones share state. The internal lock is
//! never held across an await point. Selection and reset are crate-private
//! and driven by [`MessagingState`](super::MessagingState), which keeps the
//! thread in step with the directory's active conversation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::api;
use super::{LoadOutcome, MessagingError};
use crate::app::client::ApiClient;
use crate::shared::error::ApiError;
use crate::shared::identity::Identity;
use crate::shared::messaging::{Conversation, Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadState {
    /// No conversation selected
    Empty,
    Loading {
        conversation: Conversation,
    },
    Ready {
        conversation: Conversation,
        messages: Vec<Message>,
    },
    Failed {
        conversation: Conversation,
        error: ApiError,
    },
}

impl ThreadState {
    pub fn conversation(&self) -> Option<&Conversation> {
        match self {
            ThreadState::Empty => None,
            ThreadState::Loading { conversation }
            | ThreadState::Ready { conversation, .. }
            | ThreadState::Failed { conversation, .. } => Some(conversation),
        }
    }
}

#[derive(Debug)]
struct ThreadInner {
    state: ThreadState,
    generation: u64,
    /// Generation of the send currently in flight
    sending: Option<u64>,
    draft: String,
}

#[derive(Debug, Clone)]
pub struct MessageThread {
    client: ApiClient,
    inner: Arc<Mutex<ThreadInner>>,
}

impl MessageThread {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            inner: Arc::new(Mutex::new(ThreadInner {
                state: ThreadState::Empty,
                generation: 0,
                sending: None,
                draft: String::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ThreadInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ThreadState {
        self.lock().state.clone()
    }

    /// Visible messages; empty unless `Ready`
    pub fn messages(&self) -> Vec<Message> {
        match &self.lock().state {
            ThreadState::Ready { messages, .. } => messages.clone(),
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.lock().state {
            ThreadState::Ready { messages, .. } => messages.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn active_conversation_id(&self) -> Option<String> {
        self.lock().state.conversation().map(|c| c.id.clone())
    }

    pub fn is_sending(&self) -> bool {
        self.lock().sending.is_some()
    }

    /// Whether `message` was sent by `identity`
    pub fn is_own(message: &Message, identity: &Identity) -> bool {
        message.sender_id == identity.id
    }

    /// Drop whatever is shown and ignore any response still in flight.
    pub(crate) fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = ThreadState::Empty;
        inner.sending = None;
        inner.draft.clear();
    }

    /// Make `conversation` the active thread and load its history.
    pub(crate) async fn select(
        &self,
        conversation: Conversation,
    ) -> Result<LoadOutcome, MessagingError> {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            if inner.state != ThreadState::Empty {
                tracing::debug!(
                    from = ?inner.state.conversation().map(|c| &c.id),
                    to = %conversation.id,
                    "[MESSAGING] Clearing previous thread"
                );
                inner.state = ThreadState::Empty;
            }
            inner.sending = None;
            inner.state = ThreadState::Loading {
                conversation: conversation.clone(),
            };
            inner.generation
        };

        let result = api::load_thread(&self.client, &conversation.id).await;

        let mut inner = self.lock();
        let still_current = inner.generation == generation
            && matches!(&inner.state, ThreadState::Loading { conversation: c } if c.id == conversation.id);
        if !still_current {
            tracing::warn!(
                conversation = %conversation.id,
                "[MESSAGING] Discarding late thread response"
            );
            return Ok(LoadOutcome::Discarded);
        }

        match result {
            Ok(mut messages) => {
                for message in &mut messages {
                    if message.conversation_id.is_none() {
                        message.conversation_id = Some(conversation.id.clone());
                    }
                }
                tracing::info!(
                    conversation = %conversation.id,
                    count = messages.len(),
                    "[MESSAGING] Thread loaded"
                );
                inner.state = ThreadState::Ready {
                    conversation,
                    messages,
                };
                Ok(LoadOutcome::Applied)
            }
            Err(error) => {
                inner.state = ThreadState::Failed {
                    conversation,
                    error: error.clone(),
                };
                Err(error.into())
            }
        }
    }

    /// Send `content` to the active conversation's participant and append
    /// the stored message to the tail of the thread.
    ///
    /// Blank content never reaches the network. On failure the thread is
    /// left unchanged.
    pub async fn send(&self, content: &str) -> Result<Message, MessagingError> {
        if content.trim().is_empty() {
            return Err(MessagingError::BlankContent);
        }

        let (conversation, generation) = {
            let mut inner = self.lock();
            let conversation = match &inner.state {
                ThreadState::Ready { conversation, .. } => conversation.clone(),
                ThreadState::Empty => return Err(MessagingError::NoConversationSelected),
                ThreadState::Loading { .. } | ThreadState::Failed { .. } => {
                    return Err(MessagingError::ThreadNotReady)
                }
            };
            if inner.sending == Some(inner.generation) {
                return Err(MessagingError::SendInFlight);
            }
            inner.sending = Some(inner.generation);
            (conversation, inner.generation)
        };
        let in_flight = SendingFlag {
            inner: Arc::clone(&self.inner),
            generation,
        };

        let result = api::send_message(&self.client, content, &conversation.participant.id).await;
        drop(in_flight);

        let mut inner = self.lock();
        let mut message = result?;
        if message.conversation_id.is_none() {
            message.conversation_id = Some(conversation.id.clone());
        }

        let current = inner.generation == generation;
        match &mut inner.state {
            ThreadState::Ready {
                conversation: active,
                messages,
            } if current && active.id == conversation.id => {
                messages.push(message.clone());
                tracing::info!(conversation = %conversation.id, id = %message.id, "[MESSAGING] Message sent");
            }
            _ => {
                tracing::debug!(
                    conversation = %conversation.id,
                    "[MESSAGING] Message sent after switching threads, not appended"
                );
            }
        }
        Ok(message)
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().draft = text.into();
    }

    /// Send the current draft. The draft is cleared only on success, so a
    /// failed send can be retried without retyping.
    pub async fn send_draft(&self) -> Result<Message, MessagingError> {
        let content = self.draft();
        let message = self.send(&content).await?;
        let mut inner = self.lock();
        if inner.draft == content {
            inner.draft.clear();
        }
        Ok(message)
    }
}

/// Releases the send slot when a send finishes or its future is dropped.
struct SendingFlag {
    inner: Arc<Mutex<ThreadInner>>,
    generation: u64,
}

impl Drop for SendingFlag {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.sending == Some(self.generation) {
            inner.sending = None;
        }
    }
}
