//! Notification Data Structure

use serde::{Deserialize, Serialize};

use crate::shared::identity::IdentitySummary;

/// What triggered a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
    Reply,
    Share,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub sender: Option<IdentitySummary>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(alias = "content")]
    pub message: String,
    pub created_at: String,
    #[serde(default)]
    pub read: bool,
}
