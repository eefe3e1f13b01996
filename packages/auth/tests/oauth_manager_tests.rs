// ABOUTME: Integration tests for the OAuth manager
// ABOUTME: Full flow round trips, CSRF replay, fail-closed refresh, and logout

use std::sync::Arc;

use gitrewind_auth::oauth::pkce;
use gitrewind_auth::{
    CallbackParams, ErrorKind, OAuthManager, Provider, RefreshError, RefreshOutcome,
    SessionCookies, TokenExchangeClient,
};
use gitrewind_config::{AuthConfig, ProviderCredentials};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig::for_app_url(
        "https://rewind.dev",
        ProviderCredentials::new("gh-id", "gh-secret"),
        ProviderCredentials::new("gl-id", "gl-secret"),
    ))
}

fn gitlab_disabled_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig::for_app_url(
        "https://rewind.dev",
        ProviderCredentials::new("gh-id", "gh-secret"),
        ProviderCredentials::new("placeholder", "placeholder"),
    ))
}

fn manager_against(server: &MockServer) -> OAuthManager {
    OAuthManager::with_client(
        test_config(),
        TokenExchangeClient::with_token_endpoint(format!("{}/oauth/token", server.uri())),
    )
}

/// Pull a query parameter back out of the authorization redirect URL.
fn query_param(url: &str, name: &str) -> Option<String> {
    let parsed = url::Url::parse(url).unwrap();
    parsed
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[test]
fn test_start_aborts_when_provider_unconfigured() {
    let manager = OAuthManager::new(gitlab_disabled_config());
    let mut cookies = SessionCookies::new(true);

    let err = manager.start(&mut cookies, Provider::Gitlab).unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotConfigured);
    // The gate fires before any state is generated.
    assert!(cookies.set_cookie_headers().is_empty());
}

#[test]
fn test_start_issues_state_and_builds_redirect() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::new(true);

    let url = manager.start(&mut cookies, Provider::Github).unwrap();

    let state = query_param(&url, "state").unwrap();
    assert!(url.starts_with("https://github.com/login/oauth/authorize?"));

    let headers = cookies.set_cookie_headers();
    assert_eq!(headers.len(), 1);
    let state_cookie = &headers[0];
    assert!(state_cookie.starts_with("github_oauth_state="));
    assert!(state_cookie.contains(&state));
    assert!(state_cookie.contains("SameSite=Lax"));
    assert!(state_cookie.contains("Max-Age=300"));
    assert!(state_cookie.contains("HttpOnly"));
}

#[test]
fn test_start_binds_pkce_challenge_for_gitlab() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::new(true);

    let url = manager.start(&mut cookies, Provider::Gitlab).unwrap();

    let challenge = query_param(&url, "code_challenge").unwrap();
    assert_eq!(query_param(&url, "code_challenge_method").as_deref(), Some("S256"));

    // The cookie payload binds the verifier whose challenge went upstream.
    let payload = cookies.get(Provider::Gitlab.state_cookie()).unwrap();
    let (_, verifier) = payload.split_once(':').unwrap();
    assert!(pkce::verify_code_challenge(verifier, &challenge));
}

#[tokio::test]
async fn test_full_gitlab_flow_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({"grant_type": "authorization_code"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "gl-access",
            "refresh_token": "gl-refresh",
            "expires_in": 7200,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_against(&server);
    let mut cookies = SessionCookies::new(true);

    let url = manager.start(&mut cookies, Provider::Gitlab).unwrap();
    let state = query_param(&url, "state").unwrap();

    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some(state.clone()),
        ..Default::default()
    };
    manager
        .callback(&mut cookies, Provider::Gitlab, &params)
        .await
        .unwrap();

    let credential = cookies.credential(Provider::Gitlab).unwrap();
    assert_eq!(credential.access_token, "gl-access");
    assert_eq!(credential.refresh_token.as_deref(), Some("gl-refresh"));

    // Replaying the captured callback fails: the state was consumed.
    let replay = manager
        .callback(&mut cookies, Provider::Gitlab, &params)
        .await
        .unwrap_err();
    assert_eq!(replay.kind, ErrorKind::StateMismatch);
}

#[tokio::test]
async fn test_callback_provider_error_short_circuits_exchange() {
    let server = MockServer::start().await;
    // The token endpoint must never be contacted on a declined consent.
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager_against(&server);
    let mut cookies = SessionCookies::new(true);
    manager.start(&mut cookies, Provider::Gitlab).unwrap();

    let params = CallbackParams {
        error: Some("access_denied".to_string()),
        error_description: Some("The user denied the request".to_string()),
        ..Default::default()
    };
    let err = manager
        .callback(&mut cookies, Provider::Gitlab, &params)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::AccessDenied);
    assert_eq!(err.redirect_target().split('&').next().unwrap(), "/?error=gitlab_access_denied");
    // The declined flow still consumed its state cookie.
    assert_eq!(cookies.get(Provider::Gitlab.state_cookie()), None);
}

#[tokio::test]
async fn test_callback_unrecognized_provider_error_is_unknown() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::new(true);

    let params = CallbackParams {
        error: Some("temporarily_unavailable".to_string()),
        ..Default::default()
    };
    let err = manager
        .callback(&mut cookies, Provider::Github, &params)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::UnknownError);
}

#[tokio::test]
async fn test_callback_rejects_malformed_code() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::new(true);
    let url = manager.start(&mut cookies, Provider::Github).unwrap();
    let state = query_param(&url, "state").unwrap();

    let params = CallbackParams {
        code: Some("x".repeat(201)),
        state: Some(state),
        ..Default::default()
    };
    let err = manager
        .callback(&mut cookies, Provider::Github, &params)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidCode);
    assert_eq!(cookies.get(Provider::Github.state_cookie()), None);
}

#[tokio::test]
async fn test_callback_rejects_forged_state() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::new(true);
    manager.start(&mut cookies, Provider::Github).unwrap();

    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some("forged-state".to_string()),
        ..Default::default()
    };
    let err = manager
        .callback(&mut cookies, Provider::Github, &params)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::StateMismatch);
    assert!(cookies.credential(Provider::Github).is_none());
}

#[tokio::test]
async fn test_refresh_github_is_trivial_success() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::from_header(Some("github_token=gh-access"), true);

    let outcome = manager.refresh(&mut cookies, Provider::Github).await.unwrap();

    assert_eq!(outcome, RefreshOutcome::NotNeeded);
    // Nothing was touched.
    assert!(cookies.set_cookie_headers().is_empty());
    assert!(cookies.credential(Provider::Github).is_some());
}

#[tokio::test]
async fn test_refresh_gitlab_rotates_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "refresh_token": "old-refresh",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "expires_in": 7200,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_against(&server);
    let mut cookies = SessionCookies::from_header(
        Some("gitlab_token=old-access; gitlab_refresh_token=old-refresh"),
        true,
    );

    let outcome = manager.refresh(&mut cookies, Provider::Gitlab).await.unwrap();

    assert!(matches!(outcome, RefreshOutcome::Refreshed { expires_in } if expires_in > 7100));
    let credential = cookies.credential(Provider::Gitlab).unwrap();
    assert_eq!(credential.access_token, "new-access");
    // The rotated refresh token replaced the stored one.
    assert_eq!(credential.refresh_token.as_deref(), Some("new-refresh"));
}

#[tokio::test]
async fn test_refresh_failure_clears_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
        })))
        .mount(&server)
        .await;

    let manager = manager_against(&server);
    let mut cookies = SessionCookies::from_header(
        Some("gitlab_token=stale-access; gitlab_refresh_token=revoked"),
        true,
    );

    let err = manager.refresh(&mut cookies, Provider::Gitlab).await.unwrap_err();

    assert_eq!(err.status_code(), 401);
    // Fail closed: no partially-updated credential survives.
    assert!(cookies.credential(Provider::Gitlab).is_none());
    assert!(cookies.refresh_token(Provider::Gitlab).is_none());
}

#[tokio::test]
async fn test_refresh_without_refresh_token_fails_closed() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::from_header(Some("gitlab_token=orphan-access"), true);

    let err = manager.refresh(&mut cookies, Provider::Gitlab).await.unwrap_err();

    assert!(matches!(err, RefreshError::MissingRefreshToken(Provider::Gitlab)));
    assert_eq!(err.status_code(), 400);
    assert!(cookies.credential(Provider::Gitlab).is_none());
}

#[tokio::test]
async fn test_refresh_unconfigured_gitlab_is_rejected_at_gate() {
    let manager = OAuthManager::new(gitlab_disabled_config());
    let mut cookies = SessionCookies::from_header(
        Some("gitlab_token=access; gitlab_refresh_token=refresh"),
        true,
    );

    let err = manager.refresh(&mut cookies, Provider::Gitlab).await.unwrap_err();

    assert!(matches!(err, RefreshError::NotConfigured(Provider::Gitlab)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_logout_clears_both_providers() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::from_header(
        Some("github_token=a; gitlab_token=b; gitlab_refresh_token=c; gitlab_oauth_state=s"),
        true,
    );

    manager.logout(&mut cookies);

    assert!(cookies.credential(Provider::Github).is_none());
    assert!(cookies.credential(Provider::Gitlab).is_none());
    assert!(cookies.refresh_token(Provider::Gitlab).is_none());
    assert_eq!(cookies.get(Provider::Gitlab.state_cookie()), None);
    // Four cookies came in, four removals go out.
    assert_eq!(cookies.set_cookie_headers().len(), 4);
}

#[test]
fn test_logout_on_anonymous_client_is_a_no_op() {
    let manager = OAuthManager::new(test_config());
    let mut cookies = SessionCookies::new(true);

    manager.logout(&mut cookies);

    assert!(cookies.set_cookie_headers().is_empty());
}
