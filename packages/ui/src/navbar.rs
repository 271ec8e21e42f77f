use dioxus::prelude::*;

use crate::auth::{use_auth, LogoutButton};
use crate::UI_CSS;

#[component]
pub fn Navbar(children: Element) -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: UI_CSS }
        div {
            class: "navbar",
            {children}
        }
    }
}

/// Signed-in user's name, plan and a logout button. Renders nothing otherwise.
#[component]
pub fn UserMenu() -> Element {
    let auth = use_auth();
    let state = auth();

    let Some(user) = state.user else {
        return rsx! {};
    };
    let name = user.display_name().to_string();
    let tier = user.tier;
    let status = user.status;

    rsx! {
        div {
            class: "user-menu",
            if let Some(avatar) = user.avatar_url.clone() {
                img { class: "user-menu__avatar", src: "{avatar}", alt: "" }
            }
            span { class: "user-menu__name", "{name}" }
            span {
                class: "user-menu__tier",
                title: "{status}",
                "{tier}"
            }
            LogoutButton { class: "user-menu__logout" }
        }
    }
}
