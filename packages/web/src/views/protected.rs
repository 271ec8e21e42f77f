//! Route guard wrapper for views that need a session or a role.

use dioxus::prelude::*;
use ui::{use_access, AccessRule, AuthPending, GuardDecision};

use crate::Route;

/// Render `children` only when the current user passes the access rule.
///
/// Without `role` any signed-in user passes and anonymous visitors go to `/login`.
/// With `role`, signed-in users lacking it go to `/dashboard`. While the session is
/// still loading a placeholder is shown and no redirect happens.
#[component]
pub fn Protected(role: Option<String>, children: Element) -> Element {
    let nav = use_navigator();
    let rule = match role {
        Some(role) => AccessRule::role(role),
        None => AccessRule::signed_in(),
    };

    match use_access(rule) {
        GuardDecision::Waiting => rsx! { AuthPending {} },
        GuardDecision::Redirect(path) => {
            tracing::debug!(%path, "Access denied, redirecting");
            let target = path.parse::<Route>().unwrap_or(Route::Login {});
            nav.replace(target);
            rsx! {}
        }
        GuardDecision::Render => children,
    }
}
