//! # Relyon OIDC
//!
//! Starts the OpenID Connect Authorization Code flow for a relying party.
//!
//! An [`OidcStrategy`] owns one provider's [`OidcConfig`]. On a fresh request it
//! normalizes the per-call [`AuthenticateOptions`], generates an unguessable
//! state handle, records it in the caller's session under
//! `openidconnect:<issuer-host>`, and returns the provider's authorization URL
//! to redirect to. On the return leg it verifies the echoed handle and passes
//! the authorization code on to a [`CallbackHandler`].
//!
//! ```no_run
//! use relyon_oidc::{AuthOutcome, AuthenticateOptions, IncomingRequest, OidcConfig, OidcStrategy};
//!
//! # async fn run() -> Result<(), relyon_core::AuthError> {
//! let strategy = OidcStrategy::new(OidcConfig::from_env()?)?;
//! let mut session = serde_json::Map::new();
//! let options = AuthenticateOptions::new().scope(["profile", "email"]);
//!
//! if let AuthOutcome::Redirect(url) = strategy
//!     .authenticate(&IncomingRequest::new(), &mut session, &options)
//!     .await?
//! {
//!     println!("302 Location: {url}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Provider configuration.
pub mod config;
/// Per-call authentication options.
pub mod options;
/// Normalization of options into query parameters.
pub mod params;
/// Authorization request URL construction.
pub mod request;
/// The authenticate orchestrator.
pub mod strategy;

pub use config::{OidcConfig, OidcConfigBuilder};
pub use options::{AuthenticateOptions, Scope};
pub use params::{normalize, NormalizedParams};
pub use request::build_authorization_url;
pub use strategy::{
    AuthOutcome, AuthorizationGrant, AuthorizationResponse, CallbackHandler, IncomingRequest,
    OidcStrategy,
};

pub use relyon_core::{AuthError, RequestSession};
