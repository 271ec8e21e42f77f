//! This crate contains all shared UI for the workspace.
//!
//! The auth lifecycle itself lives in the `identity` crate; this crate wires it into
//! Dioxus: [`AuthProvider`] owns the session store for the app's lifetime and exposes
//! it as a `Signal<AuthState>`, [`ServerIdentity`] adapts the `api` server functions to
//! an identity provider, and [`use_access`] turns the current state into a guard
//! decision for route-level components.

use dioxus::prelude::*;

pub const UI_CSS: Asset = asset!("/assets/ui.css");

mod navbar;
pub use navbar::{Navbar, UserMenu};

mod auth;
pub use auth::{
    use_auth, use_identity, AuthProvider, LoginButton, LogoutButton,
    SESSION_CHECK_INTERVAL,
};

mod identity_client;
pub use identity_client::ServerIdentity;

mod guard;
pub use guard::{use_access, AuthPending};

pub use identity::{AccessRule, AuthState, GuardDecision, UserInfo};
