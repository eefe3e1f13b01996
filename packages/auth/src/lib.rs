// ABOUTME: gitrewind authentication library providing the dual-provider OAuth flows
// ABOUTME: GitHub and GitLab sign-in with PKCE, CSRF state, and cookie-held credentials

pub mod error;
pub mod oauth;

// Re-export main types
pub use error::{ErrorKind, OAuthError, RefreshError, UnknownProvider};
pub use oauth::{
    CallbackParams, Credential, OAuthManager, Provider, RefreshOutcome, SessionCookies,
    StateValidation, TokenExchangeClient, TokenResponse,
};
