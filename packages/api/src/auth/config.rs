//! OAuth provider configuration derived from [`Settings`](crate::config::Settings).

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use crate::config::Settings;

/// OAuth provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub redirect_url: RedirectUrl,
}

impl OAuthConfig {
    /// GitHub endpoints with the client credentials from `settings.github`.
    pub fn github(settings: &Settings) -> Result<Self, String> {
        if settings.github.id.is_empty() || settings.github.secret.is_empty() {
            return Err("GitHub OAuth is not configured (HACKDECK_GITHUB__ID / HACKDECK_GITHUB__SECRET)".to_string());
        }
        let redirect_uri = format!(
            "{}/auth/github/callback",
            settings.auth.redirect_base.trim_end_matches('/')
        );

        Ok(Self {
            client_id: ClientId::new(settings.github.id.clone()),
            client_secret: ClientSecret::new(settings.github.secret.clone()),
            auth_url: AuthUrl::new("https://github.com/login/oauth/authorize".to_string())
                .map_err(|e| e.to_string())?,
            token_url: TokenUrl::new("https://github.com/login/oauth/access_token".to_string())
                .map_err(|e| e.to_string())?,
            redirect_url: RedirectUrl::new(redirect_uri).map_err(|e| e.to_string())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Auth, Database, GitHub};

    fn settings(id: &str, secret: &str) -> Settings {
        Settings {
            database: Database {
                user: "hackdeck".to_string(),
                password: "password".to_string(),
                host: "localhost".to_string(),
                port: 5432,
                name: "hackdeck".to_string(),
                url: None,
                max_connections: 5,
            },
            auth: Auth {
                redirect_base: "https://hackdeck.test/".to_string(),
                session_days: 7,
                secure_cookie: true,
                bootstrap_admin: None,
            },
            github: GitHub {
                id: id.to_string(),
                secret: secret.to_string(),
            },
        }
    }

    #[test]
    fn test_github_redirect_url() {
        let config = OAuthConfig::github(&settings("client", "secret")).unwrap();
        assert_eq!(
            config.redirect_url.as_str(),
            "https://hackdeck.test/auth/github/callback"
        );
        assert_eq!(config.client_id.as_str(), "client");
    }

    #[test]
    fn test_github_requires_credentials() {
        assert!(OAuthConfig::github(&settings("", "secret")).is_err());
        assert!(OAuthConfig::github(&settings("client", "")).is_err());
    }
}
