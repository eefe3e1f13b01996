// ABOUTME: OAuth module providing the dual-provider authentication flows
// ABOUTME: Includes PKCE, CSRF state, cookie credential store, token exchange, and orchestration

pub mod authorize;
pub mod client;
pub mod cookies;
pub mod manager;
pub mod pkce;
pub mod provider;
pub mod state;
pub mod types;

pub use client::TokenExchangeClient;
pub use cookies::SessionCookies;
pub use manager::OAuthManager;
pub use provider::Provider;
pub use types::{CallbackParams, Credential, RefreshOutcome, StateValidation, TokenResponse};
