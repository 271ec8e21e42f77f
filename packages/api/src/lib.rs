//! # API crate: fullstack server functions for HackDeck
//!
//! Every Dioxus server function the frontends call lives here, together with the
//! modules they depend on.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | none | GitHub OAuth, local passwords, per-request identity checks |
//! | `config` | `server` | Layered [`Settings`](config::Settings) (defaults, `hackdeck.toml`, environment) |
//! | [`db`] | none | PostgreSQL connection pool (lazy `OnceCell` singleton) |
//! | [`models`] | none | `users`/`profiles` rows and their client-safe projections |
//! | [`validate`] | none | Email, password, role tag and username rules |
//!
//! ## Server functions exposed here
//!
//! Each public `async fn` below is compiled twice: once with the real body (feature
//! `server`) and once as a client stub that forwards the call over HTTP.
//!
//! - **Authentication**: `get_current_user`, `get_login_url`, `logout`, `register`,
//!   `login_password`
//! - **Profiles**: `get_public_profile`, `get_profile_by_id`
//! - **Admin**: `admin_list_users`, `admin_set_roles`
//!
//! Server bodies never trust the client: identity comes from the session cookie and
//! roles are re-read from the database on every call.

use dioxus::prelude::*;

pub mod auth;
#[cfg(feature = "server")]
pub mod config;
pub mod db;
pub mod models;
pub mod validate;

pub use identity::PublicProfile;
pub use models::UserInfo;

#[cfg(feature = "server")]
fn server_error(e: impl std::fmt::Display) -> ServerFnError {
    ServerFnError::new(e.to_string())
}

/// Get the current authenticated user from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    match auth::require_user(&session).await {
        Ok(user) => Ok(Some(user)),
        Err(auth::AccessError::NotAuthenticated) => Ok(None),
        Err(e) => Err(server_error(e)),
    }
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    Ok(None)
}

/// Get the OAuth login URL for a provider.
#[cfg(feature = "server")]
#[post("/api/auth/login-url")]
pub async fn get_login_url(provider: String) -> Result<String, ServerFnError> {
    match provider.as_str() {
        "github" => {
            let oauth = auth::GitHubOAuth::new().map_err(ServerFnError::new)?;
            oauth.generate_auth_url().await.map_err(ServerFnError::new)
        }
        _ => Err(ServerFnError::new(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/login-url")]
pub async fn get_login_url(provider: String) -> Result<String, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log out the current user by clearing the session.
#[cfg(feature = "server")]
#[post("/api/auth/logout", session: tower_sessions::Session)]
pub async fn logout() -> Result<(), ServerFnError> {
    session.flush().await.map_err(server_error)?;
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/logout")]
pub async fn logout() -> Result<(), ServerFnError> {
    Ok(())
}

/// Register a new user with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/register", session: tower_sessions::Session)]
pub async fn register(
    email: String,
    password: String,
    name: String,
) -> Result<UserInfo, ServerFnError> {
    use crate::db::get_pool;

    validate::validate_registration(&email, &password, &name).map_err(ServerFnError::new)?;
    let email = validate::normalize_email(&email);
    let name = name.trim().to_string();

    let pool = get_pool().await.map_err(server_error)?;

    let password_hash = auth::hash_password(&password).map_err(ServerFnError::new)?;
    let taken = || ServerFnError::new("An account with this email already exists");

    // Account, roles and profile commit together.
    let mut tx = pool.begin().await.map_err(server_error)?;

    let existing: Option<(i32,)> = sqlx::query_as(
        "SELECT 1 FROM users WHERE provider = 'local' AND provider_id = $1",
    )
    .bind(&email)
    .fetch_optional(&mut *tx)
    .await
    .map_err(server_error)?;

    if existing.is_some() {
        return Err(taken());
    }

    let user: models::User = sqlx::query_as(
        "INSERT INTO users (email, name, provider, provider_id, password_hash) VALUES ($1, $2, 'local', $1, $3) RETURNING *",
    )
    .bind(&email)
    .bind(&name)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
            taken()
        } else {
            server_error(e)
        }
    })?;

    models::grant_default_role(&mut *tx, user.id, &email)
        .await
        .map_err(server_error)?;
    models::ensure_profile(&mut *tx, user.id, &email, Some(&name), None, None)
        .await
        .map_err(server_error)?;
    tx.commit().await.map_err(server_error)?;

    auth::sign_in_session(&session, user.id)
        .await
        .map_err(server_error)?;

    tracing::info!(user_id = %user.id, "Registered local account");
    auth::load_user_info(pool, user.id)
        .await
        .map_err(server_error)?
        .ok_or_else(|| ServerFnError::new("User not found"))
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/register")]
pub async fn register(
    email: String,
    password: String,
    name: String,
) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log in with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/login-password", session: tower_sessions::Session)]
pub async fn login_password(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    use crate::db::get_pool;

    let invalid = || ServerFnError::new(identity::AuthError::InvalidCredentials.to_string());
    let email = validate::normalize_email(&email);

    let pool = get_pool().await.map_err(server_error)?;

    let user: Option<models::User> = sqlx::query_as(
        "SELECT * FROM users WHERE provider = 'local' AND provider_id = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await
    .map_err(server_error)?;

    let Some(user) = user else {
        return Err(invalid());
    };
    let Some(ref hash) = user.password_hash else {
        return Err(invalid());
    };
    if !auth::verify_password(&password, hash).map_err(ServerFnError::new)? {
        return Err(invalid());
    }

    auth::sign_in_session(&session, user.id)
        .await
        .map_err(server_error)?;

    auth::load_user_info(pool, user.id)
        .await
        .map_err(server_error)?
        .ok_or_else(invalid)
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/login-password")]
pub async fn login_password(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Public profile by username.
#[cfg(feature = "server")]
#[post("/api/profiles/by-username")]
pub async fn get_public_profile(username: String) -> Result<Option<PublicProfile>, ServerFnError> {
    let pool = db::get_pool().await.map_err(server_error)?;
    models::fetch_profile(pool, models::ProfileKey::Username(username))
        .await
        .map_err(ServerFnError::new)
}

#[cfg(not(feature = "server"))]
#[post("/api/profiles/by-username")]
pub async fn get_public_profile(username: String) -> Result<Option<PublicProfile>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Public profile by user id.
#[cfg(feature = "server")]
#[post("/api/profiles/by-id")]
pub async fn get_profile_by_id(id: String) -> Result<Option<PublicProfile>, ServerFnError> {
    let Ok(id) = uuid::Uuid::parse_str(id.trim()) else {
        return Ok(None);
    };
    let pool = db::get_pool().await.map_err(server_error)?;
    models::fetch_profile(pool, models::ProfileKey::Id(id))
        .await
        .map_err(ServerFnError::new)
}

#[cfg(not(feature = "server"))]
#[post("/api/profiles/by-id")]
pub async fn get_profile_by_id(id: String) -> Result<Option<PublicProfile>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// All accounts with their roles. Admins only.
#[cfg(feature = "server")]
#[get("/api/admin/users", session: tower_sessions::Session)]
pub async fn admin_list_users() -> Result<Vec<UserInfo>, ServerFnError> {
    use std::collections::HashMap;

    auth::require_role(&session, identity::ADMIN_ROLE)
        .await
        .map_err(server_error)?;

    let pool = db::get_pool().await.map_err(server_error)?;

    let users: Vec<models::User> = sqlx::query_as("SELECT * FROM users ORDER BY created_at")
        .fetch_all(pool)
        .await
        .map_err(server_error)?;

    let rows: Vec<(uuid::Uuid, String)> =
        sqlx::query_as("SELECT user_id, role FROM user_roles ORDER BY role")
            .fetch_all(pool)
            .await
            .map_err(server_error)?;

    let mut roles: HashMap<uuid::Uuid, Vec<String>> = HashMap::new();
    for (user_id, role) in rows {
        roles.entry(user_id).or_default().push(role);
    }

    Ok(users
        .iter()
        .map(|u| u.to_info(roles.remove(&u.id).unwrap_or_default()))
        .collect())
}

#[cfg(not(feature = "server"))]
#[get("/api/admin/users")]
pub async fn admin_list_users() -> Result<Vec<UserInfo>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Replace a user's role tags. Admins only; an admin cannot drop their own admin role.
#[cfg(feature = "server")]
#[post("/api/admin/roles", session: tower_sessions::Session)]
pub async fn admin_set_roles(user_id: String, roles: Vec<String>) -> Result<UserInfo, ServerFnError> {
    use std::collections::BTreeSet;

    let admin = auth::require_role(&session, identity::ADMIN_ROLE)
        .await
        .map_err(server_error)?;

    let target = uuid::Uuid::parse_str(user_id.trim()).map_err(server_error)?;
    let roles: BTreeSet<String> = roles.iter().map(|r| r.trim().to_lowercase()).collect();

    if let Some(bad) = roles.iter().find(|r| !validate::is_valid_role_tag(r)) {
        return Err(ServerFnError::new(format!("Invalid role tag: {bad}")));
    }
    if admin.id == target.to_string() && !roles.contains(identity::ADMIN_ROLE) {
        return Err(ServerFnError::new("You cannot remove your own admin role"));
    }

    let pool = db::get_pool().await.map_err(server_error)?;
    if auth::load_user_info(pool, target)
        .await
        .map_err(server_error)?
        .is_none()
    {
        return Err(ServerFnError::new("User not found"));
    }

    let mut tx = pool.begin().await.map_err(server_error)?;
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(target)
        .execute(&mut *tx)
        .await
        .map_err(server_error)?;
    for role in &roles {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(target)
            .bind(role)
            .execute(&mut *tx)
            .await
            .map_err(server_error)?;
    }
    tx.commit().await.map_err(server_error)?;

    tracing::info!(admin_id = %admin.id, user_id = %target, ?roles, "Roles updated");

    auth::load_user_info(pool, target)
        .await
        .map_err(server_error)?
        .ok_or_else(|| ServerFnError::new("User not found"))
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/roles")]
pub async fn admin_set_roles(user_id: String, roles: Vec<String>) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
