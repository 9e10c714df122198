use crate::config::OidcConfig;
use crate::options::{AuthenticateOptions, Scope};
use relyon_core::AuthError;
use url::Url;

/// The scope every OpenID Connect authentication request carries.
pub const OPENID_SCOPE: &str = "openid";

/// Query parameter names owned by the request builder. They can't be set
/// through static authorization params.
pub const RESERVED_PARAMS: [&str; 5] =
    ["response_type", "client_id", "redirect_uri", "scope", "state"];

/// Optional parameters with a fixed slot after `scope`, in wire order.
pub const OPTIONAL_PARAMS: [&str; 7] = [
    "prompt",
    "display",
    "login_hint",
    "max_age",
    "ui_locales",
    "id_token_hint",
    "acr_values",
];

/// The per-attempt parameters derived from the call options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedParams {
    /// The `redirect_uri` for this attempt.
    pub redirect_uri: String,
    /// Parameters following `redirect_uri`, in wire order, `scope` first.
    pub params: Vec<(String, String)>,
}

impl NormalizedParams {
    /// Value of the parameter `name`, if emitted.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Resolve the scope string sent to the provider.
///
/// `openid` always leads. An explicit scope is appended after it unless the
/// caller already listed `openid` themselves, in which case their value is
/// used as is.
pub fn normalize_scope(scope: Option<&Scope>) -> String {
    match scope {
        Some(scope) if !scope.is_empty() => {
            if scope.contains(OPENID_SCOPE) {
                scope.joined()
            } else {
                format!("{OPENID_SCOPE} {}", scope.joined())
            }
        }
        _ => OPENID_SCOPE.to_string(),
    }
}

/// Pick the callback URL for this attempt, resolving relative URLs against the
/// origin of the inbound request.
pub fn resolve_callback(
    configured: &str,
    per_call: Option<&str>,
    origin: Option<&Url>,
) -> Result<String, AuthError> {
    let callback = per_call.filter(|c| !c.is_empty()).unwrap_or(configured);

    match Url::parse(callback) {
        Ok(_) => Ok(callback.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let origin = origin.ok_or_else(|| {
                AuthError::InvalidOption(format!(
                    "callbackURL {callback} is relative and no request origin is known"
                ))
            })?;
            origin
                .join(callback)
                .map(String::from)
                .map_err(|e| AuthError::InvalidOption(format!("invalid callbackURL: {e}")))
        }
        Err(e) => Err(AuthError::InvalidOption(format!("invalid callbackURL: {e}"))),
    }
}

/// Turn the options of one call into canonical authorization request
/// parameters.
///
/// Order: `scope`, `prompt`, `display`, `login_hint`, `max_age`, `ui_locales`,
/// `id_token_hint`, `acr_values`, then any other configured static parameters.
/// A static parameter named like one of the optional ones fills its slot when
/// the call doesn't set it. Optional parameters are only emitted when present
/// and non-empty.
pub fn normalize(
    config: &OidcConfig,
    options: &AuthenticateOptions,
    origin: Option<&Url>,
) -> Result<NormalizedParams, AuthError> {
    let redirect_uri = resolve_callback(
        &config.callback_url,
        options.callback_url.as_deref(),
        origin,
    )?;

    let scope = normalize_scope(options.scope.as_ref().or(config.scope.as_ref()));
    let mut params = vec![("scope".to_string(), scope)];

    let per_call = [
        options.prompt.clone(),
        options.display.clone(),
        options.login_hint.clone(),
        options.max_age.map(|age| age.to_string()),
        options.ui_locales.clone(),
        options.id_token_hint.clone(),
        options.acr_values.clone(),
    ];
    for (name, value) in OPTIONAL_PARAMS.into_iter().zip(per_call) {
        let value = value
            .filter(|v| !v.is_empty())
            .or_else(|| config.authorization_params.get(name).cloned())
            .filter(|v| !v.is_empty());
        if let Some(value) = value {
            params.push((name.to_string(), value));
        }
    }

    for (name, value) in &config.authorization_params {
        if !OPTIONAL_PARAMS.contains(&name.as_str()) {
            params.push((name.clone(), value.clone()));
        }
    }

    Ok(NormalizedParams {
        redirect_uri,
        params,
    })
}
