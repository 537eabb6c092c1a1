//! Shared Error Types
//!
//! This module defines the failure taxonomy for every call that crosses the
//! network boundary. The resource client is the only place that builds these
//! from HTTP outcomes; screens match on them to decide what to show and
//! whether to send the user back to the login screen.
//!
//! # Error Categories
//!
//! - `Unauthenticated` - no session token, the request never left the process
//! - `Unauthorized` - the server rejected the token (401/403), session cleared
//! - `NotFound` - the endpoint or resource does not exist (404)
//! - `Rejected` - any other 4xx, a local recoverable failure
//! - `ServerError` - 5xx
//! - `Transport` - network failure, timeout, or an unreadable body
//!
//! # Usage
//!
//! ```rust
//! use epilink::shared::error::ApiError;
//!
//! let error = ApiError::transport("connection reset");
//! assert!(!error.requires_login());
//! ```
use thiserror::Error;

/// Classified outcome of a failed API request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No token present; blocked before any network call
    #[error("not signed in")]
    Unauthenticated,

    /// Server rejected the bearer credential
    #[error("session rejected by server (HTTP {status})")]
    Unauthorized {
        /// 401 or 403
        status: u16,
    },

    /// Resource does not exist
    #[error("not found: {endpoint}")]
    NotFound {
        /// Endpoint path that returned 404
        endpoint: String,
    },

    /// Request refused for a reason unrelated to the session
    #[error("request rejected (HTTP {status}): {message}")]
    Rejected {
        status: u16,
        message: String,
    },

    /// Server-side failure
    #[error("server error (HTTP {status}): {message}")]
    ServerError {
        status: u16,
        message: String,
    },

    /// Network, timeout, or decoding failure
    #[error("transport failure: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },
}

impl ApiError {
    /// Create a new not-found error
    pub fn not_found(endpoint: impl Into<String>) -> Self {
        Self::NotFound {
            endpoint: endpoint.into(),
        }
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status to its category.
    pub fn from_status(status: u16, endpoint: &str, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            404 => Self::not_found(endpoint),
            500..=599 => Self::ServerError {
                status,
                message: message.into(),
            },
            _ => Self::Rejected {
                status,
                message: message.into(),
            },
        }
    }

    /// Whether the caller must be sent back to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Unauthorized { .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::transport(format!("invalid response body: {}", err))
    }
}
