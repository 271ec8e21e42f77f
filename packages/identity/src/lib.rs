//! # Identity crate: session lifecycle core for HackDeck
//!
//! Framework-free building blocks shared by the `api`, `ui` and `web` crates. Nothing
//! in here knows about Dioxus, HTTP or the database; the UI wires these pieces to
//! signals and the router, and the API crate builds [`UserInfo`] and
//! [`PublicProfile`] values from database rows.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`user`] | [`UserInfo`], role tags, subscription tier/status |
//! | [`state`] | [`AuthState`] snapshot and its derived [`AuthPhase`] |
//! | [`store`] | [`SessionStore`], the single owner of the client auth state (`fetch_user` / `logout`) |
//! | [`provider`] | [`IdentityProvider`] capability trait, [`AuthEvent`], [`EventHub`] fan-out |
//! | [`listener`] | [`AuthListener`], the single consumer mapping provider events onto the store |
//! | [`guard`] | [`evaluate`] for role-gated views |
//! | [`profile`] | [`PublicProfile::from_record`] allow-list projection |
//! | `memory` | [`MemoryProvider`], an in-process provider for tests and offline use |

pub mod error;
pub mod guard;
pub mod listener;
pub mod profile;
pub mod provider;
pub mod state;
pub mod store;
pub mod user;

mod memory;
pub use memory::MemoryProvider;

pub use error::{AuthError, ListenerError, ProfileError};
pub use guard::{evaluate, AccessRule, GuardDecision};
pub use listener::AuthListener;
pub use profile::{PublicProfile, PublicStats};
pub use provider::{AuthEvent, AuthSubscription, Credentials, EventHub, IdentityProvider};
pub use state::{AuthPhase, AuthState};
pub use store::{FetchOutcome, SessionStore};
pub use user::{SubscriptionStatus, SubscriptionTier, UserInfo, ADMIN_ROLE, MEMBER_ROLE};
