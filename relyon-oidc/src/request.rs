use crate::params::NormalizedParams;

/// The only response type this flow requests.
pub const RESPONSE_TYPE_CODE: &str = "code";

/// Build the authorization request URL.
///
/// Parameters are written in wire order: `response_type`, `client_id`,
/// `redirect_uri`, the normalized parameters, and `state` last. Every value is
/// percent-encoded with only unreserved characters left as is, so a space
/// becomes `%20`. A query already present on `endpoint` is kept.
pub fn build_authorization_url(
    endpoint: &str,
    client_id: &str,
    params: &NormalizedParams,
    handle: &str,
) -> String {
    let mut url = String::with_capacity(endpoint.len() + 256);
    url.push_str(endpoint);

    let lead = if !endpoint.contains('?') {
        "?"
    } else if endpoint.ends_with('?') || endpoint.ends_with('&') {
        ""
    } else {
        "&"
    };

    let fixed = [
        ("response_type", RESPONSE_TYPE_CODE),
        ("client_id", client_id),
        ("redirect_uri", params.redirect_uri.as_str()),
    ];
    let pairs = fixed
        .into_iter()
        .chain(params.params.iter().map(|(n, v)| (n.as_str(), v.as_str())))
        .chain(std::iter::once(("state", handle)));

    for (i, (name, value)) in pairs.enumerate() {
        url.push_str(if i == 0 { lead } else { "&" });
        url.push_str(&urlencoding::encode(name));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(extra: &[(&str, &str)]) -> NormalizedParams {
        NormalizedParams {
            redirect_uri: "https://client.example.org/cb".to_string(),
            params: extra
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn builds_in_wire_order() {
        let url = build_authorization_url(
            "https://server.example.com/authorize",
            "s6BhdRkqt3",
            &params(&[("scope", "openid"), ("prompt", "login")]),
            "AAAAAAAAAAAAAAAAAAAAAAAA",
        );
        assert_eq!(
            url,
            "https://server.example.com/authorize?response_type=code&client_id=s6BhdRkqt3\
             &redirect_uri=https%3A%2F%2Fclient.example.org%2Fcb&scope=openid&prompt=login\
             &state=AAAAAAAAAAAAAAAAAAAAAAAA"
        );
    }

    #[test]
    fn encodes_spaces_as_percent_20() {
        let url = build_authorization_url(
            "https://server.example.com/authorize",
            "s6BhdRkqt3",
            &params(&[
                ("scope", "openid profile email"),
                ("login_hint", "janedoe@example.com"),
            ]),
            "h",
        );
        assert!(url.contains("&scope=openid%20profile%20email&"), "{url}");
        assert!(url.contains("&login_hint=janedoe%40example.com&"), "{url}");
        assert!(!url.contains('+'));
    }

    #[test]
    fn keeps_existing_endpoint_query() {
        let url = build_authorization_url(
            "https://server.example.com/authorize?tenant=acme",
            "c",
            &params(&[("scope", "openid")]),
            "h",
        );
        assert!(url
            .starts_with("https://server.example.com/authorize?tenant=acme&response_type=code&"));

        let url = build_authorization_url(
            "https://server.example.com/authorize?",
            "c",
            &params(&[("scope", "openid")]),
            "h",
        );
        assert!(url.starts_with("https://server.example.com/authorize?response_type=code&"));
    }

    #[test]
    fn state_is_last() {
        let url = build_authorization_url(
            "https://server.example.com/authorize",
            "c",
            &params(&[("scope", "openid"), ("acr_values", "1 2")]),
            "the-handle",
        );
        assert!(url.ends_with("&acr_values=1%202&state=the-handle"), "{url}");
    }
}
