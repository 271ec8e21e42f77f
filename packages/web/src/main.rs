use dioxus::prelude::*;

use ui::AuthProvider;
use views::{Admin, Dashboard, Login, Profile, Register, Shell};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},
    #[layout(Shell)]
        #[route("/dashboard")]
        Dashboard {},
        #[route("/admin")]
        Admin {},
        #[route("/u/:username")]
        Profile { username: String },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

#[cfg(feature = "server")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(launch_server())
}

#[cfg(not(feature = "server"))]
fn main() {
    dioxus::launch(App);
}

#[cfg(feature = "server")]
async fn launch_server() -> Result<(), Box<dyn std::error::Error>> {
    use axum::routing::get;
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use std::time::Duration;
    use tower_sessions::cookie::SameSite;
    use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
    use tower_sessions_sqlx_store::PostgresStore;
    use tracing_subscriber::EnvFilter;

    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let settings = api::config::Settings::current()?;

    // Initialize database pool
    let pool = api::db::get_pool().await?;

    // Run migrations
    sqlx::migrate!("../api/migrations").run(pool).await?;

    // Create session store
    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;
    tokio::task::spawn(
        session_store
            .clone()
            .continuously_delete_expired(Duration::from_secs(60 * 60)),
    );

    let days = settings.auth.session_days.max(1) as u64;
    let inactivity = Duration::from_secs(60 * 60 * 24 * days).try_into()?;
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(settings.auth.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(inactivity));

    let router = axum::Router::new()
        // OAuth callback first, then the Dioxus application
        .route("/auth/github/callback", get(github_callback))
        .serve_dioxus_application(ServeConfig::new(), App)
        .layer(session_layer);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}

#[cfg(feature = "server")]
async fn github_callback(
    axum::extract::Query(params): axum::extract::Query<std::collections::HashMap<String, String>>,
    session: tower_sessions::Session,
) -> axum::response::Redirect {
    use axum::response::Redirect;

    let Some(code) = params.get("code") else {
        tracing::error!("GitHub callback missing code");
        return Redirect::to("/login?error=missing_code");
    };
    let Some(state) = params.get("state") else {
        tracing::error!("GitHub callback missing state");
        return Redirect::to("/login?error=missing_state");
    };

    let oauth = match api::auth::GitHubOAuth::new() {
        Ok(oauth) => oauth,
        Err(e) => {
            tracing::error!("Failed to create GitHub OAuth: {}", e);
            return Redirect::to("/login?error=config_error");
        }
    };

    match oauth.exchange_code(code, state).await {
        Ok(user) => {
            if let Err(e) = api::auth::sign_in_session(&session, user.id).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session_error");
            }
            Redirect::to("/dashboard")
        }
        Err(e) => {
            tracing::error!("GitHub OAuth error: {}", e);
            Redirect::to("/login?error=oauth_error")
        }
    }
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AuthProvider {
            Router::<Route> {}
        }
    }
}

/// Redirect `/` to `/dashboard`; the dashboard guard sends anonymous visitors on to
/// the login page.
#[component]
fn Root() -> Element {
    let nav = use_navigator();
    nav.replace(Route::Dashboard {});
    rsx! {}
}
