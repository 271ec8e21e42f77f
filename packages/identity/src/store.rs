//! # Session store
//!
//! [`SessionStore`] is the single owner of the client's [`AuthState`]. It is a cheap,
//! cloneable handle; every clone sees the same state. Consumers read snapshots with
//! [`state`](SessionStore::state) or watch for changes through
//! [`subscribe`](SessionStore::subscribe).
//!
//! Only two operations mutate it:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`fetch_user`](SessionStore::fetch_user) | Asks the provider for the current user; success populates `user`, no session or any failure clears it. Always clears `loading`. |
//! | [`logout`](SessionStore::logout) | Clears `user` without talking to the provider. |
//!
//! ## Races
//!
//! Concurrent fetches are last-completion-wins. A `logout` advances an epoch counter;
//! a fetch dispatched under an older epoch drops its result on completion, so a slow
//! fetch cannot bring back a user that was signed out while it was in flight. The epoch
//! check and the state write happen under the watch channel's write lock, the same lock
//! `logout` takes to advance the epoch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::provider::IdentityProvider;
use crate::state::AuthState;

/// Result of a [`SessionStore::fetch_user`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Authenticated,
    Anonymous,
    /// A logout happened while the fetch was in flight; its result was dropped.
    Superseded,
}

#[derive(Debug)]
struct Inner {
    state: watch::Sender<AuthState>,
    epoch: AtomicU64,
    listener_registered: AtomicBool,
}

/// Process-wide authentication state.
#[derive(Clone, Debug)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            inner: Arc::new(Inner {
                state,
                epoch: AtomicU64::new(0),
                listener_registered: AtomicBool::new(false),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Re-pull the current user from `provider`.
    pub async fn fetch_user<P: IdentityProvider>(&self, provider: &P) -> FetchOutcome {
        let dispatched_at = self.inner.epoch.load(Ordering::Acquire);

        let user = match provider.current_user().await {
            Ok(user) => user,
            Err(e) if e.is_anonymous() => None,
            Err(e) => {
                tracing::warn!("Failed to fetch current user: {}", e);
                None
            }
        };

        let mut outcome = FetchOutcome::Superseded;
        self.inner.state.send_if_modified(|state| {
            if self.inner.epoch.load(Ordering::Acquire) != dispatched_at {
                tracing::debug!("Discarding user fetch superseded by logout");
                return false;
            }
            outcome = if user.is_some() {
                FetchOutcome::Authenticated
            } else {
                FetchOutcome::Anonymous
            };
            let next = AuthState {
                user,
                loading: false,
            };
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        outcome
    }

    /// Clear the current user. Does not sign out at the provider.
    pub fn logout(&self) {
        self.inner.state.send_modify(|state| {
            self.inner.epoch.fetch_add(1, Ordering::AcqRel);
            state.user = None;
            state.loading = false;
        });
    }

    /// Reserve the single listener slot. Returns false if it is taken.
    pub(crate) fn claim_listener(&self) -> bool {
        self.inner
            .listener_registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release_listener(&self) {
        self.inner.listener_registered.store(false, Ordering::Release);
    }

    pub fn has_listener(&self) -> bool {
        self.inner.listener_registered.load(Ordering::Acquire)
    }
}
