use dioxus::prelude::*;
use identity::{evaluate, AccessRule, GuardDecision};

use crate::auth::use_auth;

/// Decide whether a guarded view may render for the current auth state.
///
/// Reading the auth signal subscribes the calling component, so the decision is
/// re-evaluated whenever the user signs in or out, or their roles change.
pub fn use_access(rule: AccessRule) -> GuardDecision {
    let auth = use_auth();
    let state = auth.read();
    evaluate(&state, &rule)
}

/// Placeholder shown while the session is still being resolved.
#[component]
pub fn AuthPending() -> Element {
    rsx! {
        div {
            class: "auth-pending",
            role: "status",
            "Checking your session..."
        }
    }
}
