//! # Relyon
//!
//! Facade over the relyon crates. Enable the `axum` feature for the axum
//! integration; `oidc` is on by default.

pub use relyon_core::{generate_handle, AuthError, OsRandom, RandomSource, RequestSession};
pub use relyon_session as state;

#[cfg(feature = "oidc")]
pub use relyon_oidc as oidc;
#[cfg(feature = "oidc")]
pub use relyon_oidc::{AuthOutcome, AuthenticateOptions, OidcConfig, OidcStrategy, Scope};

#[cfg(feature = "axum")]
pub use relyon_axum as axum;
