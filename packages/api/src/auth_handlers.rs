// ABOUTME: HTTP request handlers for the OAuth endpoints
// ABOUTME: Flow start, provider callback, token refresh, and logout; all state rides in cookies

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gitrewind_auth::{CallbackParams, Provider, RefreshOutcome, SessionCookies};

use crate::response::ApiResponse;
use crate::AppState;

/// Where a freshly authenticated user lands.
const AUTHENTICATED_REDIRECT: &str = "/wrapped";
const LOGOUT_REDIRECT: &str = "/?logged_out=true";

/// Request body for the refresh endpoint
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub provider: String,
}

/// Response for the refresh endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Begin an authorization flow: 302 to the provider with a state cookie set.
pub async fn start(
    State(app): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
) -> Response {
    let provider = match parse_provider(&provider) {
        Ok(p) => p,
        Err(response) => return response,
    };

    info!(provider = %provider, "flow start requested");
    let mut cookies = session_from(&headers, &app);

    match app.manager.start(&mut cookies, provider) {
        Ok(url) => redirect_with_cookies(&cookies, &url),
        Err(e) => redirect_with_cookies(&cookies, &e.redirect_target()),
    }
}

/// Complete an authorization flow from the provider redirect.
///
/// Always answers with a redirect: the authenticated area on success, an
/// error-bearing landing URL on any classified failure.
pub async fn callback(
    State(app): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let provider = match parse_provider(&provider) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let mut cookies = session_from(&headers, &app);

    match app.manager.callback(&mut cookies, provider, &params).await {
        Ok(()) => redirect_with_cookies(&cookies, AUTHENTICATED_REDIRECT),
        Err(e) => redirect_with_cookies(&cookies, &e.redirect_target()),
    }
}

/// Refresh the access token for a provider.
///
/// Invoked programmatically, so failures surface as HTTP statuses rather
/// than redirects. Cookie deltas ride along even on failure: a fail-closed
/// refresh must deliver its removal headers.
pub async fn refresh(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RefreshRequest>,
) -> Response {
    let provider: Provider = match body.provider.parse() {
        Ok(p) => p,
        Err(e) => {
            warn!("refresh requested for unknown provider: {}", body.provider);
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(format!("{e}"))),
            )
                .into_response();
        }
    };

    info!(provider = %provider, "token refresh requested");
    let mut cookies = session_from(&headers, &app);

    match app.manager.refresh(&mut cookies, provider).await {
        Ok(RefreshOutcome::NotNeeded) => json_with_cookies(
            StatusCode::OK,
            RefreshResponse {
                success: true,
                expires_in: None,
                message: Some(format!("{provider} tokens do not expire")),
            },
            &cookies,
        ),
        Ok(RefreshOutcome::Refreshed { expires_in }) => json_with_cookies(
            StatusCode::OK,
            RefreshResponse {
                success: true,
                expires_in: Some(expires_in),
                message: None,
            },
            &cookies,
        ),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            json_with_cookies(status, ApiResponse::<()>::error(e.to_string()), &cookies)
        }
    }
}

/// Clear all auth cookies for both providers and land anonymously.
pub async fn logout(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let mut cookies = session_from(&headers, &app);
    app.manager.logout(&mut cookies);
    redirect_with_cookies(&cookies, LOGOUT_REDIRECT)
}

/// Parse a provider path segment, answering 404 for anything unknown.
fn parse_provider(provider: &str) -> Result<Provider, Response> {
    provider.parse::<Provider>().map_err(|e| {
        warn!("request for unknown provider: {provider}");
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(e.to_string())),
        )
            .into_response()
    })
}

fn session_from(headers: &HeaderMap, app: &AppState) -> SessionCookies {
    let raw = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    SessionCookies::from_header(raw, app.manager.config().secure_cookies())
}

/// 302 redirect carrying the jar's `Set-Cookie` delta.
fn redirect_with_cookies(cookies: &SessionCookies, location: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    append_set_cookie_headers(&mut response, cookies);
    response
}

fn json_with_cookies<T: Serialize>(
    status: StatusCode,
    body: T,
    cookies: &SessionCookies,
) -> Response {
    let mut response = (status, Json(body)).into_response();
    append_set_cookie_headers(&mut response, cookies);
    response
}

fn append_set_cookie_headers(response: &mut Response, cookies: &SessionCookies) {
    for cookie in cookies.set_cookie_headers() {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
}
