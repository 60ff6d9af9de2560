//! Client-side session lifecycle
//!
//! A [`Session`] is the bearer token plus the profile of the user it was
//! issued to. [`SessionContext`] is the single owner of that state: it is
//! created once by the host application, shared (`Arc`) with every client
//! that needs credentials, and is the only place where the persisted entries
//! are written or removed.
//!
//! Lifecycle:
//!
//! - [`SessionContext::establish`] after a successful login
//! - [`SessionContext::clear`] on logout, or by the request wrapper when the
//!   server answers `401 Unauthorized`
//!
//! Each transition is announced as a [`SessionEvent`] on a broadcast channel.
//! Hosts subscribe to decide what to do (show a login view, print a hint);
//! the library itself never navigates.

pub mod guard;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::error::Result;
use crate::models::UserInfo;
use store::{SessionStore, TOKEN_KEY, USER_KEY};

/// Capacity of the event channel. Lagging subscribers miss old events.
const EVENT_CAPACITY: usize = 16;

/// An authenticated user's token and profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// The user logged out.
    Logout,
    /// The server rejected the token.
    Unauthorized,
}

/// Session state transitions, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(UserInfo),
    LoggedOut,
    /// The server answered 401; stored credentials are already gone.
    Expired,
}

/// Owner of the persisted session entries.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Wraps a store. Existing entries (from an earlier run) are kept.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    /// Convenience constructor over an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(store::MemorySessionStore::new()))
    }

    /// Receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Persists a freshly issued session and announces it.
    pub fn establish(&self, session: Session) -> Result<()> {
        let user_json = serde_json::to_string(&session.user)?;
        self.store.set(TOKEN_KEY, &session.token)?;
        self.store.set(USER_KEY, &user_json)?;

        tracing::info!("Session established for {}", session.user.email);
        self.emit(SessionEvent::LoggedIn(session.user));
        Ok(())
    }

    /// Removes both stored entries and announces why.
    ///
    /// Clearing an already empty session still emits the event.
    pub fn clear(&self, reason: ClearReason) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;

        match reason {
            ClearReason::Logout => {
                tracing::info!("Session cleared on logout");
                self.emit(SessionEvent::LoggedOut);
            }
            ClearReason::Unauthorized => {
                tracing::warn!("Session cleared after the server rejected the token");
                self.emit(SessionEvent::Expired);
            }
        }
        Ok(())
    }

    /// The stored bearer token, if any.
    pub fn token(&self) -> Result<Option<String>> {
        self.store.get(TOKEN_KEY)
    }

    /// The stored profile. A corrupt entry reads as `None`.
    pub fn user(&self) -> Result<Option<UserInfo>> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored user: {}", e);
                Ok(None)
            }
        }
    }

    /// Both entries, when both are present and readable.
    pub fn current(&self) -> Result<Option<Session>> {
        let token = self.token()?;
        let user = self.user()?;
        Ok(token.zip(user).map(|(token, user)| Session { token, user }))
    }

    /// Whether the stored token exists and has not expired yet.
    ///
    /// Store errors count as "not authenticated".
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    /// [`Self::is_authenticated`] against a fixed clock.
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        match self.token() {
            Ok(token) => guard::is_token_valid(token.as_deref(), now),
            Err(e) => {
                tracing::warn!("Could not read stored token: {}", e);
                false
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
