//! Navigation layer
//!
//! [`AppState`] is what a front end drives: it tracks the current screen,
//! consults the [`RouteGuard`] on every navigation and owns the screen-level
//! components. Session changes reach it through the session channel, so a
//! logout or an unauthorized response from any component lands every
//! protected screen back on the login screen.

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;

use crate::app::auth::{self, AuthError};
use crate::app::client::ApiClient;
use crate::app::guard::{Access, RouteGuard, Screen};
use crate::app::messaging::{LoadOutcome, MessagingError, MessagingState};
use crate::app::notifications::NotificationLedger;
use crate::app::session::{SessionEvent, SessionStore};
use crate::shared::error::ApiError;
use crate::shared::identity::Identity;

/// Central application state shared across screens.
#[derive(Debug)]
pub struct AppState {
    pub session: SessionStore,
    pub client: ApiClient,
    pub guard: RouteGuard,
    pub messaging: MessagingState,
    pub notifications: NotificationLedger,
    current_screen: Screen,
    /// Protected screen the user was bounced from
    pending_screen: Option<Screen>,
    identity: Option<Identity>,
    session_events: Receiver<SessionEvent>,
}

impl AppState {
    pub fn new(client: ApiClient) -> Self {
        let session = client.session().clone();
        let session_events = session.subscribe();
        let initial = if session.is_present() {
            Screen::Feed
        } else {
            Screen::Login
        };
        tracing::debug!(screen = %initial, "[GUARD] AppState initialized");

        Self {
            guard: RouteGuard::new(session.clone()),
            messaging: MessagingState::new(client.clone()),
            notifications: NotificationLedger::new(client.clone()),
            session,
            client,
            current_screen: initial,
            pending_screen: None,
            identity: None,
            session_events,
        }
    }

    pub fn current_screen(&self) -> &Screen {
        &self.current_screen
    }

    pub fn pending_screen(&self) -> Option<&Screen> {
        self.pending_screen.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Move to `screen`, or to the login screen if the guard says no.
    /// Returns the screen actually shown.
    pub fn navigate(&mut self, screen: Screen) -> &Screen {
        self.poll_session_events();

        let target = match self.guard.authorize(&screen) {
            Access::Allow => {
                self.pending_screen = None;
                screen
            }
            Access::Redirect(login) => {
                self.pending_screen = Some(screen);
                login
            }
        };

        if target != self.current_screen {
            self.leave_screen();
            tracing::debug!(from = %self.current_screen, to = %target, "[GUARD] Navigating");
            self.current_screen = target;
        }
        &self.current_screen
    }

    fn leave_screen(&self) {
        match self.current_screen {
            Screen::Messages => self.messaging.reset(),
            Screen::Notifications => self.notifications.reset(),
            _ => {}
        }
    }

    fn redirect_to_login(&mut self) {
        if !self.current_screen.requires_session() {
            return;
        }
        tracing::info!(from = %self.current_screen, "[GUARD] Session gone, redirecting to login");
        self.leave_screen();
        let from = std::mem::replace(&mut self.current_screen, Screen::Login);
        self.pending_screen = Some(from);
    }

    fn signed_out(&mut self) {
        self.identity = None;
        self.messaging.reset();
        self.notifications.reset();
        self.redirect_to_login();
    }

    /// Drain session signals without blocking.
    pub fn poll_session_events(&mut self) {
        loop {
            match self.session_events.try_recv() {
                Ok(SessionEvent::SignedOut) => {
                    tracing::debug!("[SESSION] Signed out");
                    self.signed_out();
                }
                Ok(SessionEvent::SignedIn) => {
                    tracing::debug!("[SESSION] Signed in");
                    self.identity = None;
                    if let Some(screen) = self.pending_screen.take() {
                        if self.current_screen == Screen::Login {
                            self.current_screen = screen;
                        }
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "[SESSION] Missed session events, re-reading store");
                    if !self.session.is_present() {
                        self.signed_out();
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    /// Route a failure through the navigation layer. Returns `true` if it
    /// sent the user to the login screen.
    pub fn handle_error(&mut self, error: &ApiError) -> bool {
        if !error.requires_login() {
            return false;
        }
        self.poll_session_events();
        self.signed_out();
        true
    }

    /// Signed-in identity, fetched at most once per session.
    pub async fn resolve_identity(&mut self) -> Result<Identity, ApiError> {
        self.poll_session_events();
        if let Some(identity) = &self.identity {
            return Ok(identity.clone());
        }
        match auth::resolve_identity(&self.client).await {
            Ok(identity) => {
                self.identity = Some(identity.clone());
                Ok(identity)
            }
            Err(error) => {
                self.handle_error(&error);
                Err(error)
            }
        }
    }

    /// Show the messaging screen: identity first, then its conversations.
    pub async fn open_messages(&mut self) -> Result<LoadOutcome, MessagingError> {
        if self.navigate(Screen::Messages) != &Screen::Messages {
            return Err(ApiError::Unauthenticated.into());
        }
        let identity = self.resolve_identity().await?;
        let result = self.messaging.load_conversations(&identity).await;
        if let Err(MessagingError::Api(error)) = &result {
            self.handle_error(error);
        }
        result
    }

    /// Accept the login callback and land on the screen the user wanted.
    pub fn complete_login(&mut self, callback: &str) -> Result<&Screen, AuthError> {
        let target = self.pending_screen.clone().unwrap_or(Screen::Feed);
        auth::complete_login(&self.session, callback)?;
        Ok(self.navigate(target))
    }

    pub fn logout(&mut self) {
        auth::logout(&self.session);
        self.poll_session_events();
        // Public screens stay put; make sure everything is dropped regardless.
        self.identity = None;
        self.pending_screen = None;
    }
}
