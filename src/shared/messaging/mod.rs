//! Messaging Module
//!
//! Data structures for direct messaging:
//!
//! - `Conversation` - a two-party conversation
//! - `Message` - a message in a conversation
//!
//! # Usage
//!
//! ```rust
//! use epilink::shared::messaging::{Conversation, Message};
//! ```

pub mod conversation;
pub mod message;

pub use conversation::{Conversation, LastMessage};
pub use message::{Message, SendMessageRequest};
