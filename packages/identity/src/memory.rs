use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::AuthError;
use crate::provider::{AuthEvent, AuthSubscription, Credentials, EventHub, IdentityProvider};
use crate::user::{UserInfo, MEMBER_ROLE};

#[derive(Debug, Default)]
struct MemoryState {
    /// Accounts keyed by lowercase email: (password, user).
    accounts: HashMap<String, (String, UserInfo)>,
    current: Option<UserInfo>,
    unavailable: bool,
}

/// In-memory IdentityProvider for testing and offline use.
#[derive(Clone, Debug, Default)]
pub struct MemoryProvider {
    state: Arc<Mutex<MemoryState>>,
    hub: EventHub,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account that can sign in with `password`.
    pub fn with_account(self, user: UserInfo, password: &str) -> Self {
        self.lock()
            .accounts
            .insert(user.email.to_lowercase(), (password.to_string(), user));
        self
    }

    /// Make the user current without emitting an event, as if a session had been
    /// restored from storage.
    pub fn force_session(&self, user: UserInfo) {
        self.lock().current = Some(user);
    }

    /// Drop the session silently, as if it expired on the provider's side.
    pub fn expire_session(&self) {
        self.lock().current = None;
    }

    /// Simulate a network outage: `current_user` and `sign_in` fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Replace the signed-in user's record and announce it.
    pub fn update_user(&self, user: UserInfo) {
        {
            let mut state = self.lock();
            if let Some((_, stored)) = state.accounts.get_mut(&user.email.to_lowercase()) {
                *stored = user.clone();
            }
            state.current = Some(user);
        }
        self.hub.emit(AuthEvent::UserUpdated);
    }

    pub fn refresh_token(&self) {
        self.hub.emit(AuthEvent::TokenRefreshed);
    }

    /// Push an arbitrary event to subscribers.
    pub fn emit(&self, event: AuthEvent) -> usize {
        self.hub.emit(event)
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityProvider for MemoryProvider {
    async fn current_user(&self) -> Result<Option<UserInfo>, AuthError> {
        let state = self.lock();
        if state.unavailable {
            return Err(AuthError::ProviderUnavailable("offline".to_string()));
        }
        Ok(state.current.clone())
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<UserInfo, AuthError> {
        let user = {
            let mut state = self.lock();
            if state.unavailable {
                return Err(AuthError::ProviderUnavailable("offline".to_string()));
            }
            let user = match credentials {
                Credentials::Password { email, password } => {
                    match state.accounts.get(&email.trim().to_lowercase()) {
                        Some((stored, user)) if *stored == password => user.clone(),
                        _ => return Err(AuthError::InvalidCredentials),
                    }
                }
                Credentials::SignUp {
                    email,
                    password,
                    name,
                } => {
                    let email = email.trim().to_lowercase();
                    if state.accounts.contains_key(&email) {
                        return Err(AuthError::Rejected(
                            "An account with this email already exists".to_string(),
                        ));
                    }
                    let mut user = UserInfo::new(
                        format!("user-{}", state.accounts.len() + 1),
                        [MEMBER_ROLE],
                    );
                    user.email = email.clone();
                    user.name = Some(name);
                    state.accounts.insert(email, (password, user.clone()));
                    user
                }
            };
            state.current = Some(user.clone());
            user
        };
        self.hub.emit(AuthEvent::SignedIn);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.lock().current = None;
        self.hub.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.hub.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let mut ann = UserInfo::new("u1", ["member"]);
        ann.email = "Ann@Example.com".to_string();
        let provider = MemoryProvider::new().with_account(ann, "password123");
        let mut events = provider.subscribe();

        let bad = provider
            .sign_in(Credentials::Password {
                email: "ann@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await;
        assert_eq!(bad, Err(AuthError::InvalidCredentials));
        assert!(events.try_recv().is_none());

        let user = provider
            .sign_in(Credentials::Password {
                email: " ann@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(events.try_recv(), Some(AuthEvent::SignedIn));
        assert_eq!(provider.current_user().await.unwrap().map(|u| u.id), Some("u1".into()));

        provider.sign_out().await.unwrap();
        assert_eq!(events.try_recv(), Some(AuthEvent::SignedOut));
        assert_eq!(provider.current_user().await, Ok(None));
    }

    #[tokio::test]
    async fn test_sign_up() {
        let provider = MemoryProvider::new();
        let creds = Credentials::SignUp {
            email: "bob@example.com".to_string(),
            password: "password123".to_string(),
            name: "Bob".to_string(),
        };

        let user = provider.sign_in(creds.clone()).await.unwrap();
        assert!(user.has_role(MEMBER_ROLE));
        assert_eq!(user.display_name(), "Bob");

        let again = provider.sign_in(creds).await;
        assert!(matches!(again, Err(AuthError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let provider = MemoryProvider::new();
        provider.set_unavailable(true);
        assert!(matches!(
            provider.current_user().await,
            Err(AuthError::ProviderUnavailable(_))
        ));
    }
}
