use relyon_oidc::{AuthOutcome, AuthenticateOptions, IncomingRequest, OidcConfig, OidcStrategy};
use serde_json::{json, Map, Value};

const AUTHORIZE: &str = "https://server.example.com/authorize";
const SESSION_KEY: &str = "openidconnect:server.example.com";

fn strategy() -> OidcStrategy {
    let config = OidcConfig::builder()
        .issuer("https://server.example.com")
        .authorization_url(AUTHORIZE)
        .token_url("https://server.example.com/token")
        .client_id("s6BhdRkqt3")
        .client_secret("some_secret12345")
        .callback_url("https://client.example.org/cb")
        .build()
        .unwrap();
    OidcStrategy::new(config).unwrap()
}

/// Run one attempt and return the redirect URL, the `state` it carries and the
/// resulting session.
async fn redirect(options: AuthenticateOptions) -> (String, String, Map<String, Value>) {
    let mut session = Map::new();
    let outcome = strategy()
        .authenticate(&IncomingRequest::new(), &mut session, &options)
        .await
        .unwrap();
    let AuthOutcome::Redirect(url) = outcome else {
        panic!("expected a redirect");
    };

    let parsed = url::Url::parse(&url).unwrap();
    let state = parsed
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert_eq!(state.len(), 24);
    (url, state, session)
}

fn expected(redirect_uri: &str, tail: &str, state: &str) -> String {
    format!(
        "{AUTHORIZE}?response_type=code&client_id=s6BhdRkqt3\
         &redirect_uri={redirect_uri}{tail}&state={}",
        urlencoding::encode(state)
    )
}

const CB: &str = "https%3A%2F%2Fclient.example.org%2Fcb";

#[tokio::test]
async fn redirects_with_redirect_uri_override() {
    let (url, state, session) =
        redirect(AuthenticateOptions::new().callback_url("https://client.example.org/cb2")).await;

    assert_eq!(
        url,
        expected("https%3A%2F%2Fclient.example.org%2Fcb2", "&scope=openid", &state)
    );
    assert_eq!(session[SESSION_KEY], json!({ "state": { "handle": state } }));

    // The configured callback is untouched for the next attempt.
    let (url, state, _) = redirect(AuthenticateOptions::new()).await;
    assert_eq!(url, expected(CB, "&scope=openid", &state));
}

#[tokio::test]
async fn redirects_with_scope_as_array() {
    let (url, state, session) =
        redirect(AuthenticateOptions::new().scope(["profile", "email"])).await;

    assert_eq!(url, expected(CB, "&scope=openid%20profile%20email", &state));
    assert_eq!(session[SESSION_KEY], json!({ "state": { "handle": state } }));
}

#[tokio::test]
async fn redirects_with_scope_as_string() {
    let (url, state, session) = redirect(AuthenticateOptions::new().scope("profile email")).await;

    assert_eq!(url, expected(CB, "&scope=openid%20profile%20email", &state));
    assert_eq!(session[SESSION_KEY], json!({ "state": { "handle": state } }));
}

#[tokio::test]
async fn redirects_with_prompt_parameter() {
    let (url, state, session) = redirect(AuthenticateOptions::new().prompt("login")).await;

    assert_eq!(url, expected(CB, "&scope=openid&prompt=login", &state));
    assert_eq!(session[SESSION_KEY], json!({ "state": { "handle": state } }));
}

#[tokio::test]
async fn redirects_with_display_parameter() {
    let (url, state, session) = redirect(AuthenticateOptions::new().display("touch")).await;

    assert_eq!(url, expected(CB, "&scope=openid&display=touch", &state));
    assert_eq!(session[SESSION_KEY], json!({ "state": { "handle": state } }));
}

#[tokio::test]
async fn redirects_with_login_hint_parameter() {
    let (url, state, session) =
        redirect(AuthenticateOptions::new().login_hint("janedoe@example.com")).await;

    assert_eq!(
        url,
        expected(CB, "&scope=openid&login_hint=janedoe%40example.com", &state)
    );
    assert_eq!(session[SESSION_KEY], json!({ "state": { "handle": state } }));
}

#[tokio::test]
async fn redirects_with_application_supplied_state() {
    let (url, state, session) = redirect(
        AuthenticateOptions::new().state(json!({ "returnTo": "https://client.example.org/app" })),
    )
    .await;

    assert_eq!(url, expected(CB, "&scope=openid", &state));
    assert_eq!(
        session[SESSION_KEY]["state"],
        json!({ "handle": state, "state": { "returnTo": "https://client.example.org/app" } })
    );
}

#[tokio::test]
async fn options_parsed_from_loose_value() {
    let options = AuthenticateOptions::from_value(json!({
        "scope": ["profile"],
        "prompt": "consent",
        "display": "page",
        "loginHint": "janedoe@example.com"
    }))
    .unwrap();
    let (url, state, _) = redirect(options).await;

    assert_eq!(
        url,
        expected(
            CB,
            "&scope=openid%20profile&prompt=consent&display=page&login_hint=janedoe%40example.com",
            &state
        )
    );
}

#[tokio::test]
async fn consecutive_attempts_use_fresh_handles() {
    let strategy = strategy();
    let mut session = Map::new();
    let mut handles = Vec::new();

    for _ in 0..2 {
        strategy
            .authenticate(&IncomingRequest::new(), &mut session, &AuthenticateOptions::new())
            .await
            .unwrap();
        handles.push(session[SESSION_KEY]["state"]["handle"].clone());
    }

    assert_ne!(handles[0], handles[1]);
    assert_eq!(session.len(), 1);
}

#[tokio::test]
async fn two_providers_share_a_session() {
    let other = OidcStrategy::new(
        OidcConfig::builder()
            .issuer("https://accounts.example.net")
            .authorization_url("https://accounts.example.net/o/authorize")
            .token_url("https://accounts.example.net/o/token")
            .client_id("other")
            .client_secret("secret")
            .callback_url("https://client.example.org/other/cb")
            .build()
            .unwrap(),
    )
    .unwrap();

    let mut session = Map::new();
    strategy()
        .authenticate(&IncomingRequest::new(), &mut session, &AuthenticateOptions::new())
        .await
        .unwrap();
    other
        .authenticate(&IncomingRequest::new(), &mut session, &AuthenticateOptions::new())
        .await
        .unwrap();

    assert!(session.contains_key(SESSION_KEY));
    assert!(session.contains_key("openidconnect:accounts.example.net"));
}
