//! # GitHub OAuth 2.0 sign-in
//!
//! Authorization Code flow with PKCE.
//!
//! 1. [`generate_auth_url`](GitHubOAuth::generate_auth_url) builds the authorization
//!    URL (`read:user`, `user:email`) and stores the CSRF state and PKCE verifier in
//!    `oauth_states` for ten minutes.
//! 2. [`exchange_code`](GitHubOAuth::exchange_code), called from the
//!    `/auth/github/callback` route, consumes the matching `oauth_states` row (state
//!    and expiry are checked in the same `DELETE`), trades the code for a token, reads
//!    the GitHub profile (falling back to `/user/emails` for the primary verified
//!    address), and upserts the account. First-time accounts get the member role and a
//!    profile named after their GitHub login.

use oauth2::basic::BasicClient;
use oauth2::{
    AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge,
    PkceCodeVerifier, Scope, TokenResponse,
};
use reqwest::Client;
use serde::Deserialize;

use super::config::OAuthConfig;
use crate::config::Settings;
use crate::db::get_pool;
use crate::models::{ensure_profile, grant_default_role, User};

const USER_AGENT: &str = "HackDeck";

/// GitHub user info from API.
#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    email: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
}

/// GitHub email info from API.
#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// GitHub OAuth handler.
pub struct GitHubOAuth {
    config: OAuthConfig,
}

impl GitHubOAuth {
    pub fn new() -> Result<Self, String> {
        let settings = Settings::current().map_err(|e| e.to_string())?;
        let config = OAuthConfig::github(settings)?;
        Ok(Self { config })
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(self.config.client_id.clone())
            .set_client_secret(self.config.client_secret.clone())
            .set_auth_uri(self.config.auth_url.clone())
            .set_token_uri(self.config.token_url.clone())
            .set_redirect_uri(self.config.redirect_url.clone())
    }

    /// Generate authorization URL with PKCE.
    pub async fn generate_auth_url(&self) -> Result<String, String> {
        let client = self.create_client();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("read:user".to_string()))
            .add_scope(Scope::new("user:email".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        let pool = get_pool().await.map_err(|e| e.to_string())?;
        sqlx::query(
            r#"
            INSERT INTO oauth_states (state, provider, pkce_verifier, expires_at)
            VALUES ($1, 'github', $2, NOW() + INTERVAL '10 minutes')
            "#,
        )
        .bind(csrf_state.secret())
        .bind(pkce_verifier.secret())
        .execute(pool)
        .await
        .map_err(|e| e.to_string())?;

        Ok(auth_url.to_string())
    }

    /// Exchange authorization code for tokens and upsert the account.
    pub async fn exchange_code(&self, code: &str, state: &str) -> Result<User, String> {
        let pool = get_pool().await.map_err(|e| e.to_string())?;

        let row: Option<(String,)> = sqlx::query_as(
            r#"
            DELETE FROM oauth_states
            WHERE state = $1 AND provider = 'github' AND expires_at > NOW()
            RETURNING pkce_verifier
            "#,
        )
        .bind(state)
        .fetch_optional(pool)
        .await
        .map_err(|e| e.to_string())?;

        let pkce_verifier = row.ok_or("Invalid or expired OAuth state")?.0;

        // Token endpoint must not follow redirects.
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| e.to_string())?;

        let token_result = self
            .create_client()
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&http_client)
            .await
            .map_err(|e| format!("Token exchange failed: {}", e))?;

        let access_token = token_result.access_token().secret();
        let api_client = Client::new();

        let github_user: GitHubUser = api_client
            .get("https://api.github.com/user")
            .bearer_auth(access_token)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        let email = match github_user.email {
            Some(email) => email,
            None => {
                let emails: Vec<GitHubEmail> = api_client
                    .get("https://api.github.com/user/emails")
                    .bearer_auth(access_token)
                    .header("User-Agent", USER_AGENT)
                    .send()
                    .await
                    .map_err(|e| e.to_string())?
                    .json()
                    .await
                    .map_err(|e| e.to_string())?;

                emails
                    .into_iter()
                    .find(|e| e.primary && e.verified)
                    .map(|e| e.email)
                    .ok_or("No verified primary email found")?
            }
        };

        let display_name = github_user
            .name
            .clone()
            .unwrap_or_else(|| github_user.login.clone());

        let provider_id = github_user.id.to_string();
        let mut tx = pool.begin().await.map_err(|e| e.to_string())?;
        let existing: Option<(uuid::Uuid,)> = sqlx::query_as(
            "SELECT id FROM users WHERE provider = 'github' AND provider_id = $1",
        )
        .bind(&provider_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| e.to_string())?;

        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (email, name, avatar_url, provider, provider_id)
            VALUES ($1, $2, $3, 'github', $4)
            ON CONFLICT (provider, provider_id)
            DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                avatar_url = EXCLUDED.avatar_url,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(email.to_lowercase())
        .bind(&display_name)
        .bind(&github_user.avatar_url)
        .bind(&provider_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| e.to_string())?;

        if existing.is_none() {
            grant_default_role(&mut *tx, user.id, &user.email)
                .await
                .map_err(|e| e.to_string())?;
        }
        ensure_profile(
            &mut *tx,
            user.id,
            &github_user.login,
            Some(&display_name),
            github_user.avatar_url.as_deref(),
            Some(&github_user.login),
        )
        .await
        .map_err(|e| e.to_string())?;
        tx.commit().await.map_err(|e| e.to_string())?;

        tracing::info!(user_id = %user.id, new_account = existing.is_none(), "GitHub sign-in");
        Ok(user)
    }
}
