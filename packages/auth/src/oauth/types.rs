// ABOUTME: Core type definitions for the OAuth flows
// ABOUTME: Credentials, token endpoint wire types, callback parameters, and flow results

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::oauth::provider::Provider;

/// Tokens held for one provider on behalf of the current client.
///
/// Created on a successful code exchange, replaced on a successful refresh,
/// destroyed on logout or on any refresh failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub provider: Provider,
    pub access_token: String,
    /// Present only for providers that support rotation (GitLab).
    pub refresh_token: Option<String>,
    /// Absent for providers whose tokens never expire (GitHub).
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Seconds until expiry, when the provider reports a lifetime.
    pub fn expires_in(&self) -> Option<i64> {
        self.expires_at
            .map(|at| (at - Utc::now()).num_seconds().max(0))
    }

    /// Build a credential from a token endpoint response, computing
    /// `expires_at` from the reported or provider-default lifetime.
    pub(crate) fn from_token_response(provider: Provider, response: TokenResponse) -> Option<Self> {
        let access_token = response.access_token.filter(|t| !t.is_empty())?;
        let expires_in = response.expires_in.or(provider.default_expires_in());

        Some(Self {
            provider,
            access_token,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            expires_at: expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        })
    }
}

/// Token endpoint response, shared by both grants.
///
/// Providers report logical failures inside a 2xx body, so the error fields
/// are part of the same shape; HTTP success does not imply protocol success.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub created_at: Option<i64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Authorization-code exchange request body.
///
/// GitHub accepts the three bare fields; GitLab additionally requires the
/// grant type, the registered redirect URI, and the PKCE verifier.
#[derive(Debug, Serialize)]
pub struct TokenExchangeRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<&'a str>,
}

/// Refresh-token grant request body.
#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub refresh_token: &'a str,
    pub grant_type: &'a str,
}

/// Query parameters a provider sends to the callback endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Outcome of validating a callback's CSRF state against the state cookie.
#[derive(Debug, PartialEq, Eq)]
pub struct StateValidation {
    pub valid: bool,
    /// PKCE verifier bound to the flow, echoed back on success.
    pub code_verifier: Option<String>,
}

impl StateValidation {
    pub(crate) fn invalid() -> Self {
        Self {
            valid: false,
            code_verifier: None,
        }
    }
}

/// Result of a refresh operation.
#[derive(Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The provider's tokens do not expire; nothing to do.
    NotNeeded,
    /// A new access token was stored.
    Refreshed { expires_in: i64 },
}
