//! # Identity provider contract and event fan-out
//!
//! [`IdentityProvider`] is the capability interface the session core depends on. Any
//! backend that can answer "who is signed in", sign someone in or out, and push auth
//! events is substitutable: the in-memory [`MemoryProvider`](crate::MemoryProvider)
//! used by tests, or the server-function backed `ui::ServerIdentity` used by the app.
//!
//! Pushed events travel through an [`EventHub`]. Each call to
//! [`EventHub::subscribe`] hands out an [`AuthSubscription`] owning the receiving end
//! of an unbounded channel; dropping the subscription removes it from the hub, so a
//! remounted component never leaks a listener.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::mpsc;

use crate::error::AuthError;
use crate::user::UserInfo;

/// Authentication events pushed by the provider.
///
/// Events carry no user payload: consumers re-pull the authoritative user instead of
/// trusting whatever the event source had at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEvent {
    /// Emitted once when a session is restored at startup.
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
        };
        f.write_str(name)
    }
}

/// What a caller hands to [`IdentityProvider::sign_in`].
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { email: String, password: String },
    SignUp { email: String, password: String, name: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .finish_non_exhaustive(),
            Self::SignUp { email, name, .. } => f
                .debug_struct("SignUp")
                .field("email", email)
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}

/// Async interface to the identity provider.
pub trait IdentityProvider {
    /// The user owning the current session, `Ok(None)` when there is none.
    fn current_user(&self) -> impl Future<Output = Result<Option<UserInfo>, AuthError>>;

    fn sign_in(
        &self,
        credentials: Credentials,
    ) -> impl Future<Output = Result<UserInfo, AuthError>>;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>>;

    /// Start receiving [`AuthEvent`]s. Dropping the subscription unsubscribes.
    fn subscribe(&self) -> AuthSubscription;
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    subscribers: Vec<(u64, mpsc::UnboundedSender<AuthEvent>)>,
}

/// Fans provider events out to every live subscription.
#[derive(Clone, Debug, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push((id, tx));
        AuthSubscription {
            id,
            events: rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every subscriber. Returns how many received it.
    pub fn emit(&self, event: AuthEvent) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.retain(|(_, tx)| tx.send(event).is_ok());
        tracing::debug!(%event, subscribers = inner.subscribers.len(), "Auth event emitted");
        inner.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .len()
    }
}

/// Receiving end of an [`EventHub`] subscription.
#[derive(Debug)]
pub struct AuthSubscription {
    id: u64,
    events: mpsc::UnboundedReceiver<AuthEvent>,
    hub: Weak<Mutex<HubInner>>,
}

impl AuthSubscription {
    /// Wait for the next event. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        self.events.recv().await
    }

    /// Next already-delivered event, if any.
    pub fn try_recv(&mut self) -> Option<AuthEvent> {
        self.events.try_recv().ok()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            let mut inner = hub.lock().unwrap_or_else(PoisonError::into_inner);
            inner.subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_every_subscriber() {
        let hub = EventHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.emit(AuthEvent::SignedIn), 2);
        assert_eq!(a.try_recv(), Some(AuthEvent::SignedIn));
        assert_eq!(b.try_recv(), Some(AuthEvent::SignedIn));
        assert_eq!(a.try_recv(), None);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = EventHub::new();
        let a = hub.subscribe();
        let _b = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        a.unsubscribe();
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(hub.emit(AuthEvent::SignedOut), 1);
    }

    #[test]
    fn test_subscription_outliving_hub() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe();
        hub.emit(AuthEvent::TokenRefreshed);
        drop(hub);

        assert_eq!(sub.try_recv(), Some(AuthEvent::TokenRefreshed));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::Password {
            email: "ann@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("ann@example.com"));
        assert!(!printed.contains("hunter22"));
    }
}
