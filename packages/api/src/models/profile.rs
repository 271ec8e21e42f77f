//! Profile rows, read as JSON objects and projected through
//! [`PublicProfile::from_record`](identity::PublicProfile::from_record).

use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use identity::PublicProfile;

use crate::validate::username_from;

/// How to look a profile up.
#[derive(Debug, Clone)]
pub enum ProfileKey {
    Id(Uuid),
    Username(String),
}

/// Fetch a profile row and project it onto the public shape.
pub async fn fetch_profile(pool: &PgPool, key: ProfileKey) -> Result<Option<PublicProfile>, String> {
    let record: Option<Value> = match key {
        ProfileKey::Id(id) => {
            sqlx::query_scalar::<_, Value>("SELECT to_jsonb(p) FROM profiles p WHERE p.id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
        }
        ProfileKey::Username(username) => {
            sqlx::query_scalar::<_, Value>("SELECT to_jsonb(p) FROM profiles p WHERE p.username = $1")
                .bind(username.trim().to_lowercase())
                .fetch_optional(pool)
                .await
        }
    }
    .map_err(|e| e.to_string())?;

    match record {
        None => Ok(None),
        Some(Value::Object(map)) => PublicProfile::from_record(&map)
            .map(Some)
            .map_err(|e| e.to_string()),
        Some(other) => Err(format!("Unexpected profile record: {other}")),
    }
}

/// Usernames to try for a new profile, in order: the derived name, then the name with
/// a short and a full suffix taken from the user id.
fn username_candidates(preferred: &str, user_id: Uuid) -> Vec<String> {
    let username = username_from(preferred);
    let simple = user_id.simple().to_string();
    let short = format!("{}-{}", username, &simple[..6]);
    let full = format!("{}-{}", username, simple);
    vec![username, short, full]
}

/// Create the profile for a new account if it does not have one yet. The username is
/// derived from `preferred`; if it is taken, a suffix from the user id is appended.
///
/// Runs on the caller's connection so a failure rolls back the account it belongs to.
pub async fn ensure_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
    preferred: &str,
    display_name: Option<&str>,
    avatar_url: Option<&str>,
    github_username: Option<&str>,
) -> Result<(), sqlx::Error> {
    for username in username_candidates(preferred, user_id) {
        let inserted = sqlx::query(
            r#"
            INSERT INTO profiles (id, username, display_name, avatar_url, github_username)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&username)
        .bind(display_name)
        .bind(avatar_url)
        .bind(github_username)
        .execute(&mut *conn)
        .await?
        .rows_affected();
        if inserted > 0 {
            return Ok(());
        }

        // Nothing inserted: either this account already has a profile, or the name is taken.
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;
        if exists {
            return Ok(());
        }
        tracing::debug!(user_id = %user_id, username = %username, "Username taken, trying next");
    }

    Err(sqlx::Error::Protocol(format!(
        "no free username for profile {user_id}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_candidates_fall_back_to_id_suffix() {
        let id = Uuid::parse_str("0a1b2c3d-4e5f-6789-abcd-ef0123456789").unwrap();
        let candidates = username_candidates("Ada.Lovelace@example.com", id);
        assert_eq!(
            candidates,
            vec![
                "ada-lovelace".to_string(),
                "ada-lovelace-0a1b2c".to_string(),
                "ada-lovelace-0a1b2c3d4e5f6789abcdef0123456789".to_string(),
            ]
        );
    }

    #[test]
    fn test_username_candidates_are_distinct() {
        let id = Uuid::new_v4();
        let mut candidates = username_candidates("octocat", id);
        candidates.dedup();
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.starts_with("octocat")));
    }
}
