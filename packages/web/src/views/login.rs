//! Login page: GitHub OAuth or email and password.

use dioxus::prelude::*;
use identity::{Credentials, IdentityProvider};
use ui::{use_auth, use_identity, LoginButton};

use crate::Route;

#[component]
pub fn Login() -> Element {
    let auth = use_auth();
    let identity = use_identity();
    let nav = use_navigator();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    // Signed in, either already or through the form below
    if auth().is_authenticated() {
        nav.replace(Route::Dashboard {});
    }

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let identity = identity.clone();
        spawn(async move {
            error.set(None);
            loading.set(true);
            let credentials = Credentials::Password {
                email: email().trim().to_string(),
                password: password(),
            };
            // Success emits SignedIn; the auth listener loads the user and this
            // view redirects on the next render.
            if let Err(e) = identity.sign_in(credentials).await {
                tracing::warn!("Password sign-in failed: {}", e);
                error.set(Some(e.to_string()));
            }
            loading.set(false);
        });
    };

    rsx! {
        div {
            class: "auth-page",

            h1 { "HackDeck" }
            p { class: "auth-page__lead", "Sign in to your hacker profile" }

            div {
                class: "auth-page__providers",
                LoginButton {
                    provider: "github",
                    label: "Continue with GitHub",
                    class: "login-btn github-btn",
                }
            }

            p { class: "auth-page__divider", "or" }

            form {
                onsubmit: handle_login,
                class: "auth-form",

                if let Some(err) = error() {
                    div { class: "auth-form__error", "{err}" }
                }

                input {
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                input {
                    r#type: "password",
                    placeholder: "Password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                button {
                    class: "login-btn primary-btn",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Signing in..." } else { "Sign in" }
                }
            }

            p {
                class: "auth-page__switch",
                "New here? "
                Link { to: Route::Register {}, "Create an account" }
            }
        }
    }
}
