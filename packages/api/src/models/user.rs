//! # User model
//!
//! [`User`] (server only) is the complete `users` row and derives [`sqlx::FromRow`]:
//!
//! - `id`: primary key (`UUID v4`).
//! - `email`, `name`, `avatar_url`: filled in by OAuth or registration.
//! - `provider` / `provider_id`: `"github"` or `"local"` (where `provider_id` is the
//!   email).
//! - `password_hash`: Argon2 PHC string, local accounts only.
//! - `subscription_tier`, `subscription_status`, `stripe_customer_id`: billing state
//!   mirrored from the payment provider.
//! - `created_at` / `updated_at`.
//!
//! Role tags live in `user_roles`. [`User::to_info`] combines the row with those tags
//! into the client-safe [`UserInfo`], dropping the password hash, the billing customer
//! id and the timestamps.

pub use identity::UserInfo;

#[cfg(feature = "server")]
use chrono::{DateTime, Utc};
#[cfg(feature = "server")]
use identity::{SubscriptionStatus, SubscriptionTier, ADMIN_ROLE, MEMBER_ROLE};
#[cfg(feature = "server")]
use sqlx::{FromRow, PgConnection};
#[cfg(feature = "server")]
use uuid::Uuid;

#[cfg(feature = "server")]
use crate::config::Settings;
#[cfg(feature = "server")]
use crate::validate::normalize_email;

/// Full user record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: String,
    pub provider_id: String,
    pub password_hash: Option<String>,
    pub subscription_tier: String,
    pub subscription_status: String,
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "server")]
impl User {
    /// Convert to UserInfo for client consumption.
    pub fn to_info(&self, roles: impl IntoIterator<Item = String>) -> UserInfo {
        UserInfo {
            id: self.id.to_string(),
            email: self.email.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            provider: self.provider.clone(),
            roles: roles.into_iter().collect(),
            tier: SubscriptionTier::from_column(&self.subscription_tier),
            status: SubscriptionStatus::from_column(&self.subscription_status),
        }
    }
}

/// Give a new account its initial roles: the member role, plus the admin role when
/// `email` matches `auth.bootstrap_admin`. Runs on the caller's connection so it
/// commits or rolls back with the account insert.
#[cfg(feature = "server")]
pub async fn grant_default_role(
    conn: &mut PgConnection,
    user_id: Uuid,
    email: &str,
) -> Result<(), sqlx::Error> {
    let settings = Settings::current().map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;

    let mut roles = vec![MEMBER_ROLE];
    let is_bootstrap_admin = settings
        .auth
        .bootstrap_admin
        .as_deref()
        .is_some_and(|admin| normalize_email(admin) == normalize_email(email));
    if is_bootstrap_admin {
        tracing::info!(user_id = %user_id, "Granting admin role to bootstrap account");
        roles.push(ADMIN_ROLE);
    }

    for role in roles {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT (user_id, role) DO NOTHING",
        )
        .bind(user_id)
        .bind(role)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
