//! Notification Ledger
//!
//! Loads notifications in server order and tracks read state. The local
//! `read` flag only flips after the server confirms; a failed confirmation
//! leaves the entry untouched.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::app::client::{ApiClient, ApiRequest};
use crate::shared::error::ApiError;
use crate::shared::notification::Notification;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("unknown notification: {0}")]
    Unknown(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Default)]
struct LedgerInner {
    notifications: Vec<Notification>,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct NotificationLedger {
    client: ApiClient,
    inner: Arc<Mutex<LedgerInner>>,
}

impl NotificationLedger {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            inner: Arc::new(Mutex::new(LedgerInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.lock().notifications.iter().find(|n| n.id == id).cloned()
    }

    pub fn unread_count(&self) -> usize {
        self.lock().notifications.iter().filter(|n| !n.read).count()
    }

    /// Replace the ledger with the server's list, order preserved. A load
    /// overtaken by a newer load or a reset is discarded.
    pub async fn load(&self) -> Result<Vec<Notification>, NotificationError> {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.generation
        };
        let notifications: Vec<Notification> = self.client.get("/notifications/").await?;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::warn!("[NOTIFICATIONS] Discarding late notification list");
            return Ok(inner.notifications.clone());
        }
        tracing::info!(
            count = notifications.len(),
            unread = notifications.iter().filter(|n| !n.read).count(),
            "[NOTIFICATIONS] Loaded"
        );
        inner.notifications = notifications.clone();
        Ok(notifications)
    }

    /// Confirm with the server, then flip the local flag for `id` only.
    pub async fn mark_read(&self, id: &str) -> Result<(), NotificationError> {
        if self.get(id).is_none() {
            return Err(NotificationError::Unknown(id.to_string()));
        }

        self.client
            .request(ApiRequest::put(format!("/notifications/{}/read", id)))
            .await?;

        let mut inner = self.lock();
        if let Some(notification) = inner.notifications.iter_mut().find(|n| n.id == id) {
            notification.read = true;
            tracing::info!(id, "[NOTIFICATIONS] Marked read");
        }
        Ok(())
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.notifications.clear();
    }
}
