//! Identity provider backed by the `api` server functions.

use identity::{
    AuthError, AuthEvent, AuthSubscription, Credentials, EventHub, IdentityProvider, UserInfo,
};

/// Talks to the session cookie through the server functions and announces every
/// sign-in and sign-out to its subscribers.
///
/// Clones share one event hub, so a button holding a clone and the app's listener see
/// the same events.
#[derive(Clone, Debug, Default)]
pub struct ServerIdentity {
    hub: EventHub,
}

impl ServerIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event to subscribers without a server round-trip.
    pub fn notify(&self, event: AuthEvent) {
        let delivered = self.hub.emit(event);
        tracing::trace!(%event, delivered, "Auth event emitted");
    }
}

impl IdentityProvider for ServerIdentity {
    async fn current_user(&self) -> Result<Option<UserInfo>, AuthError> {
        api::get_current_user()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<UserInfo, AuthError> {
        let result = match credentials {
            Credentials::Password { email, password } => api::login_password(email, password).await,
            Credentials::SignUp {
                email,
                password,
                name,
            } => api::register(email, password, name).await,
        };
        let user = result.map_err(|e| AuthError::Rejected(e.to_string()))?;
        self.notify(AuthEvent::SignedIn);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        api::logout()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;
        self.notify(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.hub.subscribe()
    }
}
