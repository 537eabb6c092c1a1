//! Epilink - Client Library
//!
//! Epilink is the client side of a small social network: a feed, profiles,
//! notifications and direct messages served by a REST API behind a bearer
//! token.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types and configuration primitives
//!   - Identity, conversation, message, notification and post types
//!   - The `ApiError` failure taxonomy
//!
//! - **`app`** - The client proper
//!   - Session store with on-disk persistence
//!   - Authorized request client and route guard
//!   - Messaging, notifications and the navigation layer
//!
//! The `epilink` binary is a command-line front end over `app`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use epilink::app::{ApiClient, AppState, Config, FileTokenVault, Screen, SessionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let session = SessionStore::open(FileTokenVault::new(config.token_path()));
//! let mut state = AppState::new(ApiClient::new(config, session)?);
//!
//! if state.navigate(Screen::Messages) == &Screen::Messages {
//!     state.open_messages().await?;
//!     for conversation in state.messaging.directory.conversations() {
//!         println!("{}: {}", conversation.participant.username, conversation.last_message_preview());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Session, messaging and notification handles are `Clone` and share state
//! behind `Arc`. Locks are never held across an await point.

/// Shared types and data structures
pub mod shared;

/// Session, client, guard and screen state
pub mod app;
