//! Shared Module
//!
//! Wire types and configuration primitives used by every client component.
//! All types are designed for JSON transmission to and from the REST API.
//!
//! # Overview
//!
//! The shared module is platform-agnostic: nothing here performs I/O except
//! reading a configuration file on request.

/// Failure taxonomy for network calls
pub mod error;

/// Application configuration
pub mod config;

/// Signed-in user profile and participant summaries
pub mod identity;

/// Conversation and message types
pub mod messaging;

/// Notification types
pub mod notification;

/// Post and comment types
pub mod post;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, FileConfig};
pub use error::ApiError;
pub use identity::{Identity, IdentitySummary};
pub use messaging::{Conversation, Message};
pub use notification::{Notification, NotificationKind};
pub use post::{Comment, Post};
