use thiserror::Error;

/// Errors surfaced by every stage of the login flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider configuration is incomplete or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The secure random source could not produce bytes.
    #[error("Entropy unavailable: {0}")]
    Entropy(String),
    /// A per-call authentication option could not be understood.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    /// The session record exists but has an unexpected shape.
    #[error("Session error: {0}")]
    Session(String),
    /// No pending authorization request was found for this provider.
    #[error("Unable to verify authorization request state")]
    StateMissing,
    /// The returned `state` does not match the stored handle.
    #[error("CSRF detected: invalid authorization request state")]
    CsrfMismatch,
    /// The authorization server answered with an `error` parameter.
    #[error("Authorization error: {error}{}", detail(.description))]
    Authorization {
        /// The `error` code returned by the provider.
        error: String,
        /// The optional human readable `error_description`.
        description: Option<String>,
        /// The optional `error_uri`.
        uri: Option<String>,
    },
    /// A collaborator handling the callback leg failed.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Whether the error was caused by the end user or the provider rather than
    /// by the relying party itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidOption(_)
                | AuthError::StateMissing
                | AuthError::CsrfMismatch
                | AuthError::Authorization { .. }
        )
    }
}

fn detail(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}
