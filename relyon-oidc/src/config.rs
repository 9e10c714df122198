use crate::options::Scope;
use crate::params::RESERVED_PARAMS;
use relyon_core::AuthError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Static configuration of one OpenID Connect provider.
///
/// Deserializes from the camelCase names used by most relying-party
/// configuration files (`authorizationURL`, `clientID`, ...) as well as from
/// snake_case. Always [`validate`](OidcConfig::validate) a deserialized value
/// before handing it to a strategy; [`OidcStrategy::new`](crate::OidcStrategy::new)
/// does so.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcConfig {
    /// Issuer identifier. Its host names the session namespace.
    pub issuer: String,
    /// Authorization endpoint the user agent is redirected to.
    #[serde(rename = "authorizationURL", alias = "authorization_url")]
    pub authorization_url: String,
    /// Token endpoint, used by the callback leg.
    #[serde(rename = "tokenURL", alias = "token_url")]
    pub token_url: String,
    /// OAuth 2.0 client identifier.
    #[serde(rename = "clientID", alias = "client_id")]
    pub client_id: String,
    /// OAuth 2.0 client secret, used by the callback leg.
    #[serde(rename = "clientSecret", alias = "client_secret")]
    pub client_secret: String,
    /// Default `redirect_uri`. May be relative to the request origin.
    #[serde(rename = "callbackURL", alias = "callback_url")]
    pub callback_url: String,
    /// Scope requested when a call supplies none.
    #[serde(default)]
    pub scope: Option<Scope>,
    /// Overrides the derived `openidconnect:<issuer-host>` session key.
    #[serde(default, alias = "session_key")]
    pub session_key: Option<String>,
    /// Extra parameters appended to every authorization request.
    #[serde(default, alias = "authorization_params")]
    pub authorization_params: BTreeMap<String, String>,
}

impl fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcConfig")
            .field("issuer", &self.issuer)
            .field("authorization_url", &self.authorization_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("scope", &self.scope)
            .field("session_key", &self.session_key)
            .field("authorization_params", &self.authorization_params)
            .finish()
    }
}

impl OidcConfig {
    /// Create a new [`OidcConfigBuilder`].
    pub fn builder() -> OidcConfigBuilder {
        OidcConfigBuilder::default()
    }

    /// Load the configuration from `OIDC_*` environment variables.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_env_prefixed("OIDC")
    }

    /// Load the configuration from `<prefix>_*` environment variables:
    /// `ISSUER`, `AUTHORIZATION_URL`, `TOKEN_URL`, `CLIENT_ID`, `CLIENT_SECRET`,
    /// `CALLBACK_URL` and the optional `SCOPE` and `SESSION_KEY`.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, AuthError> {
        let var = |name: &str| std::env::var(format!("{prefix}_{name}")).ok();
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                AuthError::Configuration(format!("{prefix}_{name} must be set"))
            })
        };

        let mut builder = Self::builder()
            .issuer(required("ISSUER")?)
            .authorization_url(required("AUTHORIZATION_URL")?)
            .token_url(required("TOKEN_URL")?)
            .client_id(required("CLIENT_ID")?)
            .client_secret(required("CLIENT_SECRET")?)
            .callback_url(required("CALLBACK_URL")?);
        if let Some(scope) = var("SCOPE") {
            builder = builder.scope(scope);
        }
        if let Some(key) = var("SESSION_KEY") {
            builder = builder.session_key(key);
        }
        builder.build()
    }

    /// Check that every required field is present and well formed.
    pub fn validate(&self) -> Result<(), AuthError> {
        let required = [
            ("issuer", &self.issuer),
            ("authorizationURL", &self.authorization_url),
            ("tokenURL", &self.token_url),
            ("clientID", &self.client_id),
            ("clientSecret", &self.client_secret),
            ("callbackURL", &self.callback_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AuthError::Configuration(format!(
                    "OpenID Connect strategy requires a {name} option"
                )));
            }
        }

        relyon_session::namespace_key(&self.issuer)?;
        url::Url::parse(&self.authorization_url).map_err(|e| {
            AuthError::Configuration(format!("authorizationURL is not a valid URL: {e}"))
        })?;

        if let Some(key) = &self.session_key {
            if key.is_empty() {
                return Err(AuthError::Configuration(
                    "sessionKey must not be empty".to_string(),
                ));
            }
        }

        if let Some(name) = self
            .authorization_params
            .keys()
            .find(|name| RESERVED_PARAMS.contains(&name.as_str()))
        {
            return Err(AuthError::Configuration(format!(
                "authorization parameter {name} is set by the strategy itself"
            )));
        }
        Ok(())
    }

    /// The session key the pending request state is stored under.
    pub fn session_key(&self) -> Result<String, AuthError> {
        match &self.session_key {
            Some(key) => Ok(key.clone()),
            None => relyon_session::namespace_key(&self.issuer),
        }
    }
}

/// Builder for [`OidcConfig`].
#[derive(Debug, Default, Clone)]
pub struct OidcConfigBuilder {
    issuer: Option<String>,
    authorization_url: Option<String>,
    token_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    callback_url: Option<String>,
    scope: Option<Scope>,
    session_key: Option<String>,
    authorization_params: BTreeMap<String, String>,
}

impl OidcConfigBuilder {
    /// Set the issuer identifier.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the authorization endpoint.
    pub fn authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = Some(url.into());
        self
    }

    /// Set the token endpoint.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Set the client identifier.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Set the client secret.
    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Set the default callback URL.
    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Set the default scope.
    pub fn scope(mut self, scope: impl Into<Scope>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Override the session key.
    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }

    /// Add a static authorization request parameter.
    pub fn authorization_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.authorization_params.insert(name.into(), value.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<OidcConfig, AuthError> {
        let config = OidcConfig {
            issuer: self.issuer.unwrap_or_default(),
            authorization_url: self.authorization_url.unwrap_or_default(),
            token_url: self.token_url.unwrap_or_default(),
            client_id: self.client_id.unwrap_or_default(),
            client_secret: self.client_secret.unwrap_or_default(),
            callback_url: self.callback_url.unwrap_or_default(),
            scope: self.scope,
            session_key: self.session_key,
            authorization_params: self.authorization_params,
        };
        config.validate()?;
        Ok(config)
    }
}
