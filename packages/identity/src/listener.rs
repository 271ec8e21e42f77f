//! Bridge from provider-pushed auth events to the [`SessionStore`].

use crate::error::ListenerError;
use crate::provider::{AuthEvent, AuthSubscription, IdentityProvider};
use crate::store::SessionStore;

/// The single consumer of a provider's auth events for one [`SessionStore`].
///
/// Only one listener may be registered per store at a time. Dropping the listener (or
/// calling [`teardown`](AuthListener::teardown)) unsubscribes from the provider and
/// frees the slot for the next registration.
#[derive(Debug)]
pub struct AuthListener<P: IdentityProvider> {
    store: SessionStore,
    provider: P,
    subscription: AuthSubscription,
}

impl<P: IdentityProvider> AuthListener<P> {
    pub fn register(store: &SessionStore, provider: P) -> Result<Self, ListenerError> {
        if !store.claim_listener() {
            return Err(ListenerError::AlreadyRegistered);
        }
        let subscription = provider.subscribe();
        tracing::debug!("Auth listener registered");
        Ok(Self {
            store: store.clone(),
            provider,
            subscription,
        })
    }

    /// Apply one event to the store.
    pub async fn handle(&self, event: AuthEvent) {
        tracing::debug!(%event, "Handling auth event");
        match event {
            AuthEvent::SignedOut => self.store.logout(),
            AuthEvent::SignedIn
            | AuthEvent::TokenRefreshed
            | AuthEvent::UserUpdated
            | AuthEvent::InitialSession => {
                self.store.fetch_user(&self.provider).await;
            }
            AuthEvent::PasswordRecovery => {}
        }
    }

    /// Wait for the next event and apply it. `None` once the provider's event source
    /// has gone away.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        let event = self.subscription.recv().await?;
        self.handle(event).await;
        Some(event)
    }

    /// Apply events until the provider's event source closes.
    pub async fn run(&mut self) {
        while self.next().await.is_some() {}
        tracing::debug!("Auth event source closed");
    }

    pub fn teardown(self) {}
}

impl<P: IdentityProvider> Drop for AuthListener<P> {
    fn drop(&mut self) {
        self.store.release_listener();
        tracing::debug!("Auth listener torn down");
    }
}
