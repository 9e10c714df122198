use relyon_core::AuthError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requested scope, either pre-joined or as separate tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scope {
    /// A space separated scope string, passed through as given.
    Joined(String),
    /// Individual scope tokens, joined with a single space.
    Tokens(Vec<String>),
}

impl Scope {
    /// Whether the scope requests nothing at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Scope::Joined(s) => s.trim().is_empty(),
            Scope::Tokens(tokens) => tokens.iter().all(|t| t.trim().is_empty()),
        }
    }

    /// Whether `token` is one of the requested scopes.
    pub fn contains(&self, token: &str) -> bool {
        match self {
            Scope::Joined(s) => s.split(' ').any(|t| t == token),
            Scope::Tokens(tokens) => tokens.iter().any(|t| t == token),
        }
    }

    /// The scope as a single space separated string.
    pub fn joined(&self) -> String {
        match self {
            Scope::Joined(s) => s.clone(),
            Scope::Tokens(tokens) => tokens
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        Scope::Joined(s.to_string())
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        Scope::Joined(s)
    }
}

impl From<Vec<String>> for Scope {
    fn from(tokens: Vec<String>) -> Self {
        Scope::Tokens(tokens)
    }
}

impl From<Vec<&str>> for Scope {
    fn from(tokens: Vec<&str>) -> Self {
        Scope::Tokens(tokens.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Scope {
    fn from(tokens: [&str; N]) -> Self {
        Scope::Tokens(tokens.into_iter().map(String::from).collect())
    }
}

/// Per-call options of an authentication attempt.
///
/// Field names on the wire follow the camelCase convention (`loginHint`,
/// `callbackURL`, ...); the query parameters they produce use the snake_case
/// names of OpenID Connect Core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateOptions {
    /// Scope to request. `openid` is always requested as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    /// The `prompt` parameter, e.g. `login` or `consent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// The `display` parameter, e.g. `page` or `touch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// The `login_hint` parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
    /// The `max_age` parameter, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    /// The `ui_locales` parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_locales: Option<String>,
    /// The `id_token_hint` parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_hint: Option<String>,
    /// The `acr_values` parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acr_values: Option<String>,
    /// Overrides the configured callback URL for this attempt only.
    #[serde(
        default,
        rename = "callbackURL",
        alias = "callbackUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub callback_url: Option<String>,
    /// Application payload carried through the round trip in the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl AuthenticateOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a loosely typed value, such as a framework's
    /// per-route options object.
    pub fn from_value(value: Value) -> Result<Self, AuthError> {
        serde_json::from_value(value).map_err(|e| AuthError::InvalidOption(e.to_string()))
    }

    /// Set the scope.
    pub fn scope(mut self, scope: impl Into<Scope>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set `prompt`.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set `display`.
    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Set `login_hint`.
    pub fn login_hint(mut self, hint: impl Into<String>) -> Self {
        self.login_hint = Some(hint.into());
        self
    }

    /// Set `max_age`.
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Set `ui_locales`.
    pub fn ui_locales(mut self, locales: impl Into<String>) -> Self {
        self.ui_locales = Some(locales.into());
        self
    }

    /// Set `id_token_hint`.
    pub fn id_token_hint(mut self, hint: impl Into<String>) -> Self {
        self.id_token_hint = Some(hint.into());
        self
    }

    /// Set `acr_values`.
    pub fn acr_values(mut self, values: impl Into<String>) -> Self {
        self.acr_values = Some(values.into());
        self
    }

    /// Override the callback URL for this attempt.
    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Attach an application payload.
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scope_accepts_string_or_list() {
        let opts = AuthenticateOptions::from_value(json!({ "scope": "profile email" })).unwrap();
        assert_eq!(opts.scope, Some(Scope::Joined("profile email".into())));

        let opts =
            AuthenticateOptions::from_value(json!({ "scope": ["profile", "email"] })).unwrap();
        assert_eq!(opts.scope, Some(Scope::from(["profile", "email"])));
    }

    #[test]
    fn malformed_scope_is_rejected() {
        let err = AuthenticateOptions::from_value(json!({ "scope": 42 })).unwrap_err();
        assert!(matches!(err, AuthError::InvalidOption(_)));

        let err = AuthenticateOptions::from_value(json!({ "scope": [1, 2] })).unwrap_err();
        assert!(matches!(err, AuthError::InvalidOption(_)));
    }

    #[test]
    fn reads_camel_case_names() {
        let opts = AuthenticateOptions::from_value(json!({
            "loginHint": "janedoe@example.com",
            "callbackURL": "https://client.example.org/cb2",
            "maxAge": 300,
            "state": { "returnTo": "/app" },
            "unrelated": true
        }))
        .unwrap();
        assert_eq!(opts.login_hint.as_deref(), Some("janedoe@example.com"));
        assert_eq!(
            opts.callback_url.as_deref(),
            Some("https://client.example.org/cb2")
        );
        assert_eq!(opts.max_age, Some(300));
        assert_eq!(opts.state, Some(json!({ "returnTo": "/app" })));
    }

    #[test]
    fn scope_helpers() {
        let joined = Scope::from("openid profile");
        assert!(joined.contains("openid"));
        assert!(!joined.contains("email"));
        assert_eq!(joined.joined(), "openid profile");

        let tokens = Scope::from(vec!["profile", "", "email"]);
        assert_eq!(tokens.joined(), "profile email");
        assert!(!tokens.is_empty());
        assert!(Scope::from(vec![""]).is_empty());
        assert!(Scope::from("  ").is_empty());
    }

    #[test]
    fn blank_tokens_are_dropped_when_joined() {
        let tokens = Scope::from(["profile", "  "]);
        assert!(!tokens.is_empty());
        assert_eq!(tokens.joined(), "profile");
        assert!(Scope::from(["  ", ""]).is_empty());
    }
}
