// ABOUTME: HTTP API layer for gitrewind providing the auth endpoints and routing
// ABOUTME: Integration layer over the auth flows; all handlers speak cookies and redirects

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use gitrewind_auth::OAuthManager;

pub mod auth_handlers;
pub mod response;

/// Shared state for every auth handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<OAuthManager>,
}

impl AppState {
    pub fn new(manager: Arc<OAuthManager>) -> Self {
        Self { manager }
    }
}

/// Creates the auth API router
///
/// Static segments (`refresh`, `logout`) take precedence over the
/// `{provider}` captures, so the four endpoint families coexist under
/// `/auth`.
pub fn create_auth_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/refresh", post(auth_handlers::refresh))
        .route(
            "/auth/logout",
            get(auth_handlers::logout).post(auth_handlers::logout),
        )
        .route("/auth/{provider}", get(auth_handlers::start))
        .route("/auth/{provider}/callback", get(auth_handlers::callback))
        .with_state(state)
}
