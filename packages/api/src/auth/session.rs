//! # Per-request identity
//!
//! The session cookie only carries the user id under [`SESSION_USER_ID_KEY`]. Every
//! server function that needs to know who is calling goes through [`require_user`] or
//! [`require_role`], which reload the user and their role tags from the database on
//! each request. Nothing the client claims about itself (cached `UserInfo`, role
//! flags) is consulted.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;
use uuid::Uuid;

use identity::{AuthError, UserInfo};

use crate::db::get_pool;
use crate::models::User;

/// Key for storing user ID in session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{}", AuthError::Unauthorized)]
    Forbidden,

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Load a user row together with its role tags.
pub async fn load_user_info(pool: &PgPool, id: Uuid) -> Result<Option<UserInfo>, sqlx::Error> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(user) = user else {
        return Ok(None);
    };

    let roles: Vec<String> =
        sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
            .bind(id)
            .fetch_all(pool)
            .await?;

    Ok(Some(user.to_info(roles)))
}

/// The user owning this request's session.
pub async fn require_user(session: &Session) -> Result<UserInfo, AccessError> {
    let user_id: Option<String> = session.get(SESSION_USER_ID_KEY).await?;
    let Some(user_id) = user_id else {
        return Err(AccessError::NotAuthenticated);
    };

    let Ok(user_uuid) = Uuid::parse_str(&user_id) else {
        tracing::warn!("Discarding session with malformed user id");
        session.flush().await?;
        return Err(AccessError::NotAuthenticated);
    };

    let pool = get_pool().await?;
    load_user_info(pool, user_uuid)
        .await?
        .ok_or(AccessError::NotAuthenticated)
}

/// The user owning this request's session, provided they carry `role`.
pub async fn require_role(session: &Session, role: &str) -> Result<UserInfo, AccessError> {
    let user = require_user(session).await?;
    if !user.has_role(role) {
        tracing::warn!(user_id = %user.id, role, "Rejected request lacking role");
        return Err(AccessError::Forbidden);
    }
    Ok(user)
}

/// Bind the session to `user_id`, rotating the session id first.
pub async fn sign_in_session(
    session: &Session,
    user_id: Uuid,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(SESSION_USER_ID_KEY, user_id.to_string())
        .await
}
