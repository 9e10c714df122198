//! # Relyon Axum
//!
//! Glue between [`relyon_oidc::OidcStrategy`] and axum handlers: an extractor
//! for the inbound request, a response type for the strategy's outcome, and an
//! error type that maps [`AuthError`] onto HTTP statuses.

#![warn(missing_docs)]

use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::{header, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use relyon_core::AuthError;
use relyon_oidc::{AuthOutcome, AuthorizationResponse, IncomingRequest};

/// Errors returned by relyon axum handlers and extractors.
#[derive(Debug)]
pub enum RelyonAxumError {
    /// The request itself is malformed.
    BadRequest(String),
    /// The login attempt was rejected.
    Unauthorized(String),
    /// Something went wrong on our side.
    Internal(String),
}

impl From<AuthError> for RelyonAxumError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidOption(_) => RelyonAxumError::BadRequest(err.to_string()),
            AuthError::StateMissing
            | AuthError::CsrfMismatch
            | AuthError::Authorization { .. } => RelyonAxumError::Unauthorized(err.to_string()),
            AuthError::Configuration(_)
            | AuthError::Entropy(_)
            | AuthError::Session(_)
            | AuthError::Provider(_) => {
                log::error!("authentication failed: {err}");
                RelyonAxumError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for RelyonAxumError {
    fn into_response(self) -> Response {
        match self {
            RelyonAxumError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            RelyonAxumError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            RelyonAxumError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// A `302 Found` response pointing at `location`.
pub fn redirect_response(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Response wrapper for [`AuthOutcome`]: redirects become `302 Found`,
/// successes render their value.
pub struct OidcResponse<T>(pub AuthOutcome<T>);

impl<T: IntoResponse> IntoResponse for OidcResponse<T> {
    fn into_response(self) -> Response {
        match self.0 {
            AuthOutcome::Redirect(url) => redirect_response(&url),
            AuthOutcome::Success(value) => value.into_response(),
        }
    }
}

impl<T> From<AuthOutcome<T>> for OidcResponse<T> {
    fn from(outcome: AuthOutcome<T>) -> Self {
        Self(outcome)
    }
}

/// How [`OidcRequest`] works out the origin of an inbound request.
///
/// Provide it from the router state through [`FromRef`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginConfig {
    /// Take the scheme and host from `X-Forwarded-Proto` and
    /// `X-Forwarded-Host`. Only enable behind a proxy that sets both.
    pub trust_proxy: bool,
}

impl OriginConfig {
    /// Trust the forwarding headers set by a reverse proxy.
    pub fn behind_proxy() -> Self {
        Self { trust_proxy: true }
    }
}

/// Extracts the [`IncomingRequest`] for a strategy from the request's query
/// string and `Host` header.
///
/// The origin scheme is `http` unless [`OriginConfig::trust_proxy`] is set and
/// the request carries `X-Forwarded-Proto`.
pub struct OidcRequest(pub IncomingRequest);

impl<S> FromRequestParts<S> for OidcRequest
where
    S: Send + Sync,
    OriginConfig: FromRef<S>,
{
    type Rejection = RelyonAxumError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<AuthorizationResponse>::try_from_uri(&parts.uri)
            .map_err(|e| RelyonAxumError::BadRequest(e.body_text()))?;

        let mut request = IncomingRequest::new().with_query(query);
        if let Some(origin) = request_origin(parts, OriginConfig::from_ref(state)) {
            request = request.with_origin(origin);
        }
        Ok(OidcRequest(request))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name)?.to_str().ok()
}

fn request_origin(parts: &Parts, config: OriginConfig) -> Option<url::Url> {
    let forwarded = |name| {
        config
            .trust_proxy
            .then(|| header_str(parts, name))
            .flatten()
            .and_then(|v| v.split(',').next())
            .map(str::trim)
    };
    let host = forwarded("x-forwarded-host").or_else(|| header_str(parts, "host"))?;
    let scheme = forwarded("x-forwarded-proto").unwrap_or("http");
    url::Url::parse(&format!("{scheme}://{host}/")).ok()
}
