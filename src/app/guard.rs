//! Route Guard
//!
//! Decides whether a screen may render. The decision is a pure function of
//! the session's presence at evaluation time and is recomputed on every
//! navigation; it never touches the network.

use std::fmt;

use crate::app::session::SessionStore;

/// Every screen the navigation layer knows about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Screen {
    /// OAuth provider selection
    Login,
    /// Landing point of the OAuth redirect, carries the token
    LoginCallback,
    Feed,
    Explore,
    Profile,
    Notifications,
    Messages,
    Post(String),
    MakePost,
}

impl Screen {
    pub fn requires_session(&self) -> bool {
        !matches!(self, Screen::Login | Screen::LoginCallback)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Login => write!(f, "/login"),
            Screen::LoginCallback => write!(f, "/success"),
            Screen::Feed => write!(f, "/"),
            Screen::Explore => write!(f, "/explore"),
            Screen::Profile => write!(f, "/profile"),
            Screen::Notifications => write!(f, "/notifications"),
            Screen::Messages => write!(f, "/messages"),
            Screen::Post(id) => write!(f, "/posts/{}", id),
            Screen::MakePost => write!(f, "/posts"),
        }
    }
}

/// Guard verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Screen),
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn authorize(&self, screen: &Screen) -> Access {
        if !screen.requires_session() || self.session.is_present() {
            return Access::Allow;
        }
        tracing::debug!(screen = %screen, "[GUARD] No session, redirecting to login");
        Access::Redirect(Screen::Login)
    }
}
