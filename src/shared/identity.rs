//! Identity Data Structures
//!
//! The signed-in user's profile and the compact summary embedded in
//! conversations and notifications.

use serde::{Deserialize, Serialize};

/// The signed-in user's profile as returned by `/api/users/me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name
    #[serde(alias = "full_name", alias = "username")]
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL
    #[serde(default, alias = "profile_picture")]
    pub avatar: Option<String>,
    /// Ids of users following this identity
    #[serde(default)]
    pub followers: Vec<String>,
    /// Ids of users this identity follows
    #[serde(default)]
    pub following: Vec<String>,
}

impl Identity {
    pub fn follower_count(&self) -> usize {
        self.followers.len()
    }

    pub fn following_count(&self) -> usize {
        self.following.len()
    }

    /// Compact form used when this identity appears inside other records
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            id: self.id.clone(),
            username: self.display_name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Participant or sender reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentitySummary {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "full_name", alias = "display_name")]
    pub username: String,
    #[serde(default, alias = "profile_picture")]
    pub avatar: Option<String>,
}
