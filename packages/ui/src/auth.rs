//! Authentication context and hooks for the UI.

use std::time::Duration;

use dioxus::prelude::*;
use identity::{AuthEvent, AuthListener, AuthState, IdentityProvider, SessionStore};

use crate::identity_client::ServerIdentity;

/// How often the provider re-checks the server session. A session that expired on
/// the server is noticed within one interval.
pub const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Get the current authentication state.
/// Returns a signal that updates when the user logs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// The identity provider shared by the whole app.
pub fn use_identity() -> ServerIdentity {
    use_context::<ServerIdentity>()
}

async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}

/// Provider component that owns the session store.
///
/// On mount it registers the store's single auth listener against [`ServerIdentity`],
/// announces the initial session (which fetches the current user), and starts the
/// periodic session check. Store changes are mirrored into the `Signal<AuthState>`
/// returned by [`use_auth`]. Unmounting cancels the tasks, which tears the listener
/// down.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let store = use_hook(SessionStore::new);
    let identity = use_hook(ServerIdentity::new);
    let mut auth_state = use_signal(|| store.state());

    use_context_provider(|| auth_state);
    use_context_provider(|| identity.clone());

    // Mirror store changes into the signal.
    use_hook(|| {
        let mut changes = store.subscribe();
        spawn(async move {
            while changes.changed().await.is_ok() {
                let state = changes.borrow_and_update().clone();
                auth_state.set(state);
            }
        })
    });

    // Listener: registered once, runs until unmount.
    use_hook(|| {
        let store = store.clone();
        let identity = identity.clone();
        spawn(async move {
            let mut listener = match AuthListener::register(&store, identity.clone()) {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::warn!("Auth listener not started: {}", e);
                    return;
                }
            };
            identity.notify(AuthEvent::InitialSession);
            listener.run().await;
        })
    });

    // Periodic session check.
    use_hook(|| {
        let identity = identity.clone();
        spawn(async move {
            loop {
                sleep(SESSION_CHECK_INTERVAL).await;
                identity.notify(AuthEvent::TokenRefreshed);
            }
        })
    });

    rsx! {
        {children}
    }
}

/// Button to initiate login with a specific provider.
#[component]
pub fn LoginButton(
    provider: String,
    #[props(default = "Login".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut loading = use_signal(|| false);

    let onclick = move |_| {
        let provider = provider.clone();
        async move {
            loading.set(true);
            match api::get_login_url(provider).await {
                Ok(url) => {
                    // Redirect to OAuth provider
                    #[cfg(target_arch = "wasm32")]
                    {
                        if let Some(window) = web_sys::window() {
                            let _ = window.location().set_href(&url);
                        }
                    }
                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        tracing::info!("Continue sign-in at {}", url);
                        loading.set(false);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to get login URL: {}", e);
                    loading.set(false);
                }
            }
        }
    };

    rsx! {
        button {
            class: "{class}",
            disabled: loading(),
            onclick: onclick,
            if loading() {
                "Loading..."
            } else {
                "{label}"
            }
        }
    }
}

/// Button to log out the current user.
///
/// The sign-out event reaches the app's listener, which clears the store; guarded
/// views then redirect on their own.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let identity = use_identity();
    let mut pending = use_signal(|| false);

    let onclick = move |_| {
        let identity = identity.clone();
        async move {
            pending.set(true);
            if let Err(e) = identity.sign_out().await {
                tracing::error!("Logout failed: {}", e);
            }
            pending.set(false);
        }
    };

    rsx! {
        button {
            class: "{class}",
            disabled: pending(),
            onclick: onclick,
            "{label}"
        }
    }
}
