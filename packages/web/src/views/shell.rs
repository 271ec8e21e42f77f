use dioxus::prelude::*;
use ui::{use_auth, Navbar, UserMenu};

use crate::Route;

/// Layout for everything behind the navbar.
#[component]
pub fn Shell() -> Element {
    let auth = use_auth();
    let state = auth();
    let is_admin = state.has_role(identity::ADMIN_ROLE);

    rsx! {
        Navbar {
            Link { class: "navbar__brand", to: Route::Dashboard {}, "HackDeck" }
            if state.is_authenticated() {
                Link { to: Route::Dashboard {}, "Dashboard" }
            }
            if is_admin {
                Link { to: Route::Admin {}, "Admin" }
            }
            if !state.loading && !state.is_authenticated() {
                Link { class: "navbar__login", to: Route::Login {}, "Sign in" }
            }
            UserMenu {}
        }
        main {
            class: "page",
            Outlet::<Route> {}
        }
    }
}
