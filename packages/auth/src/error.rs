// ABOUTME: Error taxonomy for OAuth flows and token lifecycle operations
// ABOUTME: Every flow failure maps to one stable kind plus a user-facing redirect target

use std::fmt;

use thiserror::Error;

use crate::oauth::provider::Provider;

/// Classification of every way an OAuth flow can fail.
///
/// The kind is part of the wire contract: the callback endpoint redirects to
/// `/?error={provider}_{kind}` and front-ends key off that value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// CSRF validation failed or the state cookie was missing/expired.
    StateMismatch,
    /// The user declined the authorization request at the provider.
    AccessDenied,
    /// The callback carried a malformed or absent authorization code.
    InvalidCode,
    /// Code exchange or refresh grant rejected, at transport or protocol level.
    TokenExchangeFailed,
    /// Transport-level failure distinguishable from a provider rejection.
    NetworkError,
    /// The provider's credentials are absent or disabled.
    NotConfigured,
    /// Catch-all, including provider-reported errors outside the set above.
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateMismatch => "state_mismatch",
            Self::AccessDenied => "access_denied",
            Self::InvalidCode => "invalid_code",
            Self::TokenExchangeFailed => "token_exchange_failed",
            Self::NetworkError => "network_error",
            Self::NotConfigured => "not_configured",
            Self::UnknownError => "unknown_error",
        }
    }

    /// Fixed human-readable message shown to the user for this kind.
    fn user_message(&self) -> &'static str {
        match self {
            Self::StateMismatch => "Security validation failed. Please try again.",
            Self::AccessDenied => {
                "Access was denied. Please authorize the application to continue."
            }
            Self::InvalidCode => "Invalid authorization code. Please try again.",
            Self::TokenExchangeFailed => "Failed to obtain access token. Please try again.",
            Self::NetworkError => {
                "Network error occurred. Please check your connection and try again."
            }
            Self::NotConfigured => "This sign-in method is not available.",
            Self::UnknownError => "An unexpected error occurred. Please try again.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified flow failure, constructed at the failure site.
///
/// Pure value; the orchestrator pattern-matches on `kind` and the HTTP layer
/// turns it into a redirect via [`OAuthError::redirect_target`].
#[derive(Debug, Clone, Error)]
#[error("{kind} ({provider}): {message}")]
pub struct OAuthError {
    pub kind: ErrorKind,
    pub provider: Provider,
    pub message: String,
    pub detail: Option<String>,
}

impl OAuthError {
    pub fn new(provider: Provider, kind: ErrorKind) -> Self {
        Self {
            kind,
            provider,
            message: kind.user_message().to_string(),
            detail: None,
        }
    }

    pub fn with_detail(provider: Provider, kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            provider,
            message: kind.user_message().to_string(),
            detail: Some(detail.into()),
        }
    }

    /// Redirect target carrying the stable error code and a readable message.
    ///
    /// This is the only channel by which flow failures reach the end user.
    pub fn redirect_target(&self) -> String {
        format!(
            "/?error={}_{}&message={}",
            self.provider,
            self.kind.as_str(),
            urlencoding::encode(&self.message)
        )
    }
}

/// Failure of the programmatic refresh endpoint.
///
/// Refresh is invoked by client code rather than a browser redirect, so these
/// surface as HTTP statuses instead of redirect targets.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("{0} integration is not configured")]
    NotConfigured(Provider),

    #[error("No refresh token available")]
    MissingRefreshToken(Provider),

    #[error(transparent)]
    Exchange(#[from] OAuthError),
}

impl RefreshError {
    /// HTTP status the refresh endpoint responds with for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotConfigured(_) | Self::MissingRefreshToken(_) => 400,
            Self::Exchange(e) if e.kind == ErrorKind::NetworkError => 500,
            Self::Exchange(_) => 401,
        }
    }
}

/// Error parsing a provider name from a path segment or request body.
#[derive(Debug, Clone, Error)]
#[error("Unknown provider: {0}. Supported: github, gitlab")]
pub struct UnknownProvider(pub String);
