//! Session Store
//!
//! Owns the bearer token for the whole process. Every component that needs
//! to know whether the caller is signed in asks this store; nothing else may
//! write the token. `set` and `clear` publish a [`SessionEvent`] so that
//! independently mounted observers (the navigation layer, a profile loader)
//! converge without polling.
//!
//! The token survives restarts through a [`TokenVault`]. A present token is
//! not proof of a valid session: only a successful authorized response
//! confirms it, and any unauthorized response clears it.
//!
//! Vault I/O is synchronous. It is serialized behind its own lock and never
//! runs under the token lock, so `get` and `is_present` do not wait on disk.
//!
//! # Usage
//!
//! ```rust
//! use epilink::app::session::{SessionEvent, SessionStore};
//!
//! let session = SessionStore::in_memory();
//! let mut events = session.subscribe();
//!
//! session.set("abc").unwrap();
//! assert!(session.is_present());
//! assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedIn);
//!
//! session.clear();
//! session.clear(); // already absent, no second event
//! assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
//! assert!(events.try_recv().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of the session signal channel. Observers that fall further
/// behind than this see `Lagged` and should re-read `is_present()`.
const EVENT_CAPACITY: usize = 16;

/// Opaque bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Published on every session transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session token is empty")]
    EmptyToken,
    #[error("failed to persist session: {0}")]
    Persist(String),
    #[error("persisted session is unreadable: {0}")]
    Corrupt(String),
}

/// Storage that keeps the token across restarts
pub trait TokenVault: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<Option<SessionToken>, SessionError>;
    fn store(&self, token: &SessionToken) -> Result<(), SessionError>;
    fn erase(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    token: String,
    saved_at: String,
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FileTokenVault {
    path: PathBuf,
}

impl FileTokenVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenVault for FileTokenVault {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Corrupt(e.to_string())),
        };
        let record: SessionRecord =
            serde_json::from_str(&raw).map_err(|e| SessionError::Corrupt(e.to_string()))?;
        match SessionToken::new(record.token) {
            Ok(token) => Ok(Some(token)),
            Err(_) => Ok(None),
        }
    }

    fn store(&self, token: &SessionToken) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::Persist(e.to_string()))?;
        }
        let record = SessionRecord {
            token: token.as_str().to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
        };
        let json =
            serde_json::to_string(&record).map_err(|e| SessionError::Persist(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| SessionError::Persist(e.to_string()))
    }

    fn erase(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Persist(e.to_string())),
        }
    }
}

/// Process-local vault, used by tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryTokenVault {
    slot: Mutex<Option<SessionToken>>,
}

impl TokenVault for MemoryTokenVault {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store(&self, token: &SessionToken) -> Result<(), SessionError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn erase(&self) -> Result<(), SessionError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

struct SessionInner {
    token: RwLock<Option<SessionToken>>,
    /// Held across vault I/O; taken before `token`, never after
    vault: Mutex<Box<dyn TokenVault>>,
    events: broadcast::Sender<SessionEvent>,
}

/// Shared handle to the process-wide session
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("present", &self.is_present())
            .field("vault", &self.inner.vault)
            .finish()
    }
}

impl SessionStore {
    /// Open the store, restoring any token the vault holds
    pub fn open(vault: impl TokenVault + 'static) -> Self {
        let restored = match vault.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("[SESSION] Ignoring unreadable persisted session: {}", e);
                None
            }
        };
        if restored.is_some() {
            tracing::info!("[SESSION] Restored persisted session");
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(restored),
                vault: Mutex::new(Box::new(vault)),
                events,
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(MemoryTokenVault::default())
    }

    pub fn get(&self) -> Option<SessionToken> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_present(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Persist and install a new token. On persistence failure the previous
    /// state is kept.
    pub fn set(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = SessionToken::new(token)?;
        {
            let vault = self.lock_vault();
            vault.store(&token)?;
            *self
                .inner
                .token
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(token);
        }
        tracing::info!("[SESSION] Signed in");
        let _ = self.inner.events.send(SessionEvent::SignedIn);
        Ok(())
    }

    /// Drop the token. Idempotent; safe to race with other callers.
    pub fn clear(&self) {
        let previous = {
            let vault = self.lock_vault();
            let previous = self
                .inner
                .token
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if previous.is_some() {
                if let Err(e) = vault.erase() {
                    tracing::warn!("[SESSION] Failed to erase persisted session: {}", e);
                }
            }
            previous
        };
        if previous.is_some() {
            tracing::info!("[SESSION] Signed out");
            let _ = self.inner.events.send(SessionEvent::SignedOut);
        }
    }

    fn lock_vault(&self) -> MutexGuard<'_, Box<dyn TokenVault>> {
        self.inner.vault.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }
}
