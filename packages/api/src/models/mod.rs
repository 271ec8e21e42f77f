//! Database models and their client-safe projections.

#[cfg(feature = "server")]
mod profile;
mod user;

#[cfg(feature = "server")]
pub use profile::{ensure_profile, fetch_profile, ProfileKey};
#[cfg(feature = "server")]
pub use user::{grant_default_role, User};
pub use user::UserInfo;
