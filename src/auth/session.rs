//! Auth session context shared by handle. It replaces an implicit, process-wide
//! auth hook: consumers receive an `Arc<SessionContext>`, read the current
//! session, and subscribe to changes explicitly. Only the session returned by
//! the provider is kept; tokens stay inside `SecretString`.

use super::types::{AuthEvent, Session};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

const EVENT_CAPACITY: usize = 16;

/// Receives auth state changes until dropped or unsubscribed.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Waits for the next event. Returns `None` once the context is gone.
    /// Events missed because the receiver lagged are skipped.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "auth subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Stops receiving events.
    pub fn unsubscribe(self) {
        drop(self.receiver);
    }
}

pub struct SessionContext {
    session: RwLock<Option<Session>>,
    remembered_email: RwLock<Option<String>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session: RwLock::new(None),
            remembered_email: RwLock::new(None),
            events,
        }
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Stores the session and notifies subscribers with `SignedIn`, or
    /// `TokenRefreshed` when a session was already present.
    pub async fn set_session(&self, session: Session) {
        let event = {
            let mut guard = self.session.write().await;
            let event = if guard.is_some() {
                AuthEvent::TokenRefreshed(session.clone())
            } else {
                AuthEvent::SignedIn(session.clone())
            };
            *guard = Some(session);
            event
        };
        self.publish(event);
    }

    /// Clears the session, typically on logout.
    pub async fn clear(&self) {
        let had_session = self.session.write().await.take().is_some();
        if had_session {
            self.publish(AuthEvent::SignedOut);
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.events.subscribe(),
        }
    }

    /// Keeps the verified email for the step after OTP verification.
    pub async fn remember_email(&self, email: &str) {
        *self.remembered_email.write().await = Some(email.to_string());
    }

    pub async fn remembered_email(&self) -> Option<String> {
        self.remembered_email.read().await.clone()
    }

    fn publish(&self, event: AuthEvent) {
        // No subscribers is fine; the session is still readable through `current`.
        let _ = self.events.send(event);
    }
}
