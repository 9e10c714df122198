//! # Axum OIDC Login Example
//!
//! Starts the Authorization Code flow against any OpenID Connect provider.
//!
//! Configure it through the environment (or a `.env` file):
//!
//! ```text
//! OIDC_ISSUER=https://accounts.example.com
//! OIDC_AUTHORIZATION_URL=https://accounts.example.com/authorize
//! OIDC_TOKEN_URL=https://accounts.example.com/token
//! OIDC_CLIENT_ID=...
//! OIDC_CLIENT_SECRET=...
//! OIDC_CALLBACK_URL=/auth/oidc/callback
//! TRUST_PROXY=true
//! RUST_LOG=debug
//! ```
//!
//! Sessions are kept in memory and keyed by a cookie. The callback page only
//! shows the verified authorization code; exchanging it for tokens is up to
//! the application.

use axum::{
    extract::{FromRef, Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use relyon::{AuthenticateOptions, OidcConfig, OidcStrategy};
use relyon_axum::{OidcRequest, OidcResponse, OriginConfig, RelyonAxumError};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

const SESSION_COOKIE: &str = "relyon.sid";

type Sessions = Arc<Mutex<HashMap<String, Map<String, Value>>>>;

#[derive(Clone)]
struct AppState {
    strategy: Arc<OidcStrategy>,
    sessions: Sessions,
    origin: OriginConfig,
}

impl FromRef<AppState> for OriginConfig {
    fn from_ref(state: &AppState) -> Self {
        state.origin
    }
}

#[derive(Deserialize)]
struct LoginParams {
    scope: Option<String>,
    prompt: Option<String>,
    return_to: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = OidcConfig::from_env()?;
    log::info!("Using OpenID Connect issuer {}", config.issuer);

    let state = AppState {
        strategy: Arc::new(OidcStrategy::new(config)?),
        sessions: Arc::default(),
        origin: OriginConfig {
            trust_proxy: std::env::var("TRUST_PROXY").is_ok_and(|v| v == "true"),
        },
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/auth/oidc", get(login))
        .route("/auth/oidc/callback", get(login))
        .layer(CookieManagerLayer::new())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    log::info!("Listening on http://0.0.0.0:3000");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> impl IntoResponse {
    Html(r#"<a href="/auth/oidc?scope=profile%20email&return_to=/">Log in</a>"#)
}

async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<LoginParams>,
    OidcRequest(request): OidcRequest,
) -> Result<OidcResponse<Html<String>>, RelyonAxumError> {
    let sid = match cookies.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            let sid = uuid::Uuid::new_v4().to_string();
            let mut cookie = Cookie::new(SESSION_COOKIE, sid.clone());
            cookie.set_path("/");
            cookie.set_http_only(true);
            cookies.add(cookie);
            sid
        }
    };

    let mut options = AuthenticateOptions::new();
    if let Some(scope) = params.scope {
        options = options.scope(scope);
    }
    if let Some(prompt) = params.prompt {
        options = options.prompt(prompt);
    }
    if let Some(return_to) = params.return_to {
        options = options.state(json!({ "returnTo": return_to }));
    }

    let mut sessions = state.sessions.lock().await;
    let session = sessions.entry(sid).or_default();
    let outcome = state
        .strategy
        .authenticate(&request, session, &options)
        .await?;

    Ok(outcome
        .map(|grant| {
            Html(format!(
                "<p>Authorization code received for {}.</p><p>Return to: {}</p>",
                grant.redirect_uri,
                grant
                    .app_state
                    .as_ref()
                    .and_then(|s| s.get("returnTo"))
                    .and_then(Value::as_str)
                    .unwrap_or("/")
            ))
        })
        .into())
}
