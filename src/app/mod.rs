//! Client Module
//!
//! Session handling, the authorized HTTP client, route gating and the
//! stateful screens built on top of them.
//!
//! # Architecture
//!
//! - **`config`** - Configuration resolution (server URL, timeout, token path)
//! - **`session`** - [`SessionStore`], the only owner of the bearer token
//! - **`client`** - [`ApiClient`], attaches the token and classifies responses
//! - **`guard`** - [`RouteGuard`], allow or redirect per screen
//! - **`auth`** - OAuth handshake, login callback, logout, identity
//! - **`messaging`** - Conversation directory and message thread
//! - **`notifications`** - [`NotificationLedger`]
//! - **`social`** - Feed, post, follow and search endpoints
//! - **`state`** - [`AppState`], the navigation layer
//!
//! ```text
//! RouteGuard --reads--> SessionStore <--clears on 401/403-- ApiClient
//!                           |                                  ^
//!                      SessionEvent                            |
//!                           v                                  |
//!                       AppState --owns--> MessagingState, NotificationLedger
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod guard;
pub mod messaging;
pub mod notifications;
pub mod session;
pub mod social;
pub mod state;

// Re-export commonly used types
pub use client::{ApiClient, ApiRequest, Payload};
pub use config::Config;
pub use guard::{Access, RouteGuard, Screen};
pub use messaging::{ConversationDirectory, MessageThread, MessagingError, MessagingState};
pub use notifications::{NotificationError, NotificationLedger};
pub use session::{FileTokenVault, MemoryTokenVault, SessionEvent, SessionStore, TokenVault};
pub use state::AppState;
