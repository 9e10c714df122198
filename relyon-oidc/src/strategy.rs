use crate::config::OidcConfig;
use crate::options::AuthenticateOptions;
use crate::params::{normalize, resolve_callback};
use crate::request::build_authorization_url;
use async_trait::async_trait;
use relyon_core::{generate_handle, AuthError, OsRandom, RandomSource, RequestSession};
use relyon_session::{SessionStateStore, StateRecord, StateStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Authorization response parameters, as found in the callback query string.
///
/// When none of `code` or `error` is present the request is treated as a new
/// login attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthorizationResponse {
    /// The authorization code.
    pub code: Option<String>,
    /// The echoed state handle.
    pub state: Option<String>,
    /// OAuth 2.0 error code.
    pub error: Option<String>,
    /// Human readable error description.
    pub error_description: Option<String>,
    /// Link to a page describing the error.
    pub error_uri: Option<String>,
}

/// What the strategy needs to know about the inbound HTTP request.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    /// Authorization response parameters from the query string.
    pub query: AuthorizationResponse,
    /// Origin used to resolve relative callback URLs, e.g.
    /// `https://client.example.org/`.
    pub origin: Option<Url>,
}

impl IncomingRequest {
    /// A request without authorization response parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query parameters.
    pub fn with_query(mut self, query: AuthorizationResponse) -> Self {
        self.query = query;
        self
    }

    /// Set the request origin.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// A verified authorization response, ready to be exchanged for tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizationGrant {
    /// The authorization code.
    pub code: String,
    /// The `redirect_uri` the code was issued for.
    pub redirect_uri: String,
    /// The application payload stored when the request was initiated.
    pub app_state: Option<Value>,
}

/// Handles the return leg once the state handle has been verified: token
/// exchange, ID token validation, profile loading.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    /// What a completed login produces.
    type Output: Send;

    /// Complete the login for a verified grant.
    async fn handle(
        &self,
        config: &OidcConfig,
        grant: AuthorizationGrant,
    ) -> Result<Self::Output, AuthError>;
}

#[async_trait]
impl CallbackHandler for () {
    type Output = AuthorizationGrant;

    async fn handle(
        &self,
        _config: &OidcConfig,
        grant: AuthorizationGrant,
    ) -> Result<Self::Output, AuthError> {
        Ok(grant)
    }
}

/// Result of one call to [`OidcStrategy::authenticate`].
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome<T> {
    /// Send the user agent to this authorization URL.
    Redirect(String),
    /// The callback was verified and handled.
    Success(T),
}

impl<T> AuthOutcome<T> {
    /// Transform the success value, keeping redirects as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AuthOutcome<U> {
        match self {
            AuthOutcome::Redirect(url) => AuthOutcome::Redirect(url),
            AuthOutcome::Success(value) => AuthOutcome::Success(f(value)),
        }
    }

    /// The redirect URL, if this outcome is a redirect.
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            AuthOutcome::Redirect(url) => Some(url),
            AuthOutcome::Success(_) => None,
        }
    }
}

/// Name the strategy registers under.
pub const STRATEGY_NAME: &str = "openidconnect";

/// OpenID Connect Authorization Code strategy.
///
/// Holds one provider's configuration for its whole lifetime. Each call to
/// [`authenticate`](Self::authenticate) either starts a new authorization
/// request or, when the request carries an authorization response, verifies it
/// and hands it to the [`CallbackHandler`].
pub struct OidcStrategy<H: CallbackHandler = ()> {
    config: OidcConfig,
    session_key: String,
    store: Arc<dyn StateStore>,
    random: Arc<dyn RandomSource>,
    handler: H,
}

impl OidcStrategy<()> {
    /// Create a strategy that returns the verified grant from the callback leg.
    pub fn new(config: OidcConfig) -> Result<Self, AuthError> {
        Self::with_handler(config, ())
    }
}

impl<H: CallbackHandler> OidcStrategy<H> {
    /// Create a strategy with the given callback handler.
    pub fn with_handler(config: OidcConfig, handler: H) -> Result<Self, AuthError> {
        config.validate()?;
        let session_key = config.session_key()?;
        Ok(Self {
            store: Arc::new(SessionStateStore::new(session_key.clone())),
            session_key,
            config,
            random: Arc::new(OsRandom),
            handler,
        })
    }

    /// Replace the random source used for state handles.
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Replace the store for pending request state.
    pub fn with_state_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = store;
        self
    }

    /// The strategy name.
    pub fn name(&self) -> &'static str {
        STRATEGY_NAME
    }

    /// The provider configuration.
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// The session key pending request state is stored under.
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Authenticate one inbound request.
    pub async fn authenticate(
        &self,
        request: &IncomingRequest,
        session: &mut dyn RequestSession,
        options: &AuthenticateOptions,
    ) -> Result<AuthOutcome<H::Output>, AuthError> {
        let query = &request.query;

        if let Some(error) = &query.error {
            log::warn!(
                "authorization server {} returned error {}",
                self.config.issuer,
                error
            );
            return Err(AuthError::Authorization {
                error: error.clone(),
                description: query.error_description.clone(),
                uri: query.error_uri.clone(),
            });
        }

        match &query.code {
            Some(code) => {
                let grant = self.verify_callback(request, session, options, code)?;
                let output = self.handler.handle(&self.config, grant).await?;
                Ok(AuthOutcome::Success(output))
            }
            None => self
                .initiate(session, options, request.origin.as_ref())
                .map(AuthOutcome::Redirect),
        }
    }

    /// Start a new authorization request and return the URL to redirect to.
    ///
    /// The pending state is written to `session` before the URL is returned,
    /// and nothing is written if any option is rejected.
    pub fn initiate(
        &self,
        session: &mut dyn RequestSession,
        options: &AuthenticateOptions,
        origin: Option<&Url>,
    ) -> Result<String, AuthError> {
        let params = normalize(&self.config, options, origin)?;
        let handle = generate_handle(self.random.as_ref())?;

        let record = StateRecord::new(handle.clone()).with_app_state(options.state.clone());
        self.store.store(session, record)?;

        log::debug!(
            "redirecting to {} for {}",
            self.config.authorization_url,
            self.session_key
        );
        Ok(build_authorization_url(
            &self.config.authorization_url,
            &self.config.client_id,
            &params,
            &handle,
        ))
    }

    fn verify_callback(
        &self,
        request: &IncomingRequest,
        session: &mut dyn RequestSession,
        options: &AuthenticateOptions,
        code: &str,
    ) -> Result<AuthorizationGrant, AuthError> {
        let redirect_uri = resolve_callback(
            &self.config.callback_url,
            options.callback_url.as_deref(),
            request.origin.as_ref(),
        )?;
        let handle = request.query.state.as_deref().unwrap_or_default();
        let app_state = self.store.verify(session, handle)?;
        Ok(AuthorizationGrant {
            code: code.to_string(),
            redirect_uri,
            app_state,
        })
    }
}
