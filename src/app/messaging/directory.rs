//! Conversation Directory
//!
//! The signed-in identity's conversation list, in server order, plus the
//! currently active conversation id. Loading requires a resolved
//! [`Identity`]; the type makes that ordering impossible to skip.
//!
//! Mutations are crate-private: the active conversation and the visible
//! thread must change together, so callers go through
//! [`MessagingState`](super::MessagingState).

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::api;
use super::{LoadOutcome, MessagingError};
use crate::app::client::ApiClient;
use crate::shared::identity::Identity;
use crate::shared::messaging::Conversation;

#[derive(Debug, Default)]
struct DirectoryInner {
    conversations: Vec<Conversation>,
    active: Option<String>,
    generation: u64,
    loading: bool,
}

#[derive(Debug, Clone)]
pub struct ConversationDirectory {
    client: ApiClient,
    inner: Arc<Mutex<DirectoryInner>>,
}

impl ConversationDirectory {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            inner: Arc::new(Mutex::new(DirectoryInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DirectoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.lock().conversations.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn active_id(&self) -> Option<String> {
        self.lock().active.clone()
    }

    pub fn active(&self) -> Option<Conversation> {
        let inner = self.lock();
        let id = inner.active.as_ref()?;
        inner.conversations.iter().find(|c| &c.id == id).cloned()
    }

    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.lock().conversations.iter().find(|c| c.id == id).cloned()
    }

    /// Replace the list with `identity`'s conversations. Not a merge.
    pub(crate) async fn load(&self, identity: &Identity) -> Result<LoadOutcome, MessagingError> {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.loading = true;
            inner.generation
        };
        let pending = LoadingFlag {
            inner: Arc::clone(&self.inner),
            generation,
        };

        let result = api::load_conversations(&self.client, &identity.id).await;
        drop(pending);

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::warn!("[MESSAGING] Discarding late conversation list");
            return Ok(LoadOutcome::Discarded);
        }

        let conversations = result?;
        let mut seen = HashSet::new();
        inner.conversations = conversations
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();

        let active_survives = match inner.active.as_ref() {
            Some(id) => inner.conversations.iter().any(|c| &c.id == id),
            None => true,
        };
        if !active_survives {
            tracing::debug!("[MESSAGING] Active conversation no longer listed, clearing selection");
            inner.active = None;
        }

        tracing::info!(count = inner.conversations.len(), "[MESSAGING] Conversations loaded");
        Ok(LoadOutcome::Applied)
    }

    /// Mark `id` active and return it. Unknown ids leave the selection alone.
    pub(crate) fn select(&self, id: &str) -> Result<Conversation, MessagingError> {
        let mut inner = self.lock();
        let conversation = inner
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| MessagingError::UnknownConversation(id.to_string()))?;
        inner.active = Some(conversation.id.clone());
        Ok(conversation)
    }

    pub(crate) fn clear_selection(&self) {
        self.lock().active = None;
    }

    /// Forget everything and ignore any load in flight
    pub(crate) fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.conversations.clear();
        inner.active = None;
        inner.loading = false;
    }
}

/// Clears `loading` when a load finishes or its future is dropped.
struct LoadingFlag {
    inner: Arc<Mutex<DirectoryInner>>,
    generation: u64,
}

impl Drop for LoadingFlag {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.generation == self.generation {
            inner.loading = false;
        }
    }
}
