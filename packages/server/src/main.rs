// ABOUTME: Entry point for the gitrewind auth server
// ABOUTME: Loads configuration, installs middleware, and serves the auth router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gitrewind_api::{create_auth_router, AppState};
use gitrewind_auth::OAuthManager;
use gitrewind_config::AuthConfig;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let auth_config = AuthConfig::from_env();

    // Warnings are logged inside validate(); errors are fatal only in
    // production so local development can run partially configured.
    let validation = auth_config.validate();
    if !validation.valid() {
        for e in &validation.errors {
            error!("{e}");
        }
        if auth_config.is_production() {
            return Err(format!(
                "Missing required environment variables: {}",
                validation.errors.join(", ")
            )
            .into());
        }
    }

    let state = AppState::new(Arc::new(OAuthManager::new(Arc::new(auth_config))));

    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = create_auth_router(state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("auth server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
