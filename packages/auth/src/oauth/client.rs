// ABOUTME: Token exchange client for the provider token endpoints
// ABOUTME: Performs code-for-token and refresh grants, normalizing success and failure responses

use std::time::Duration;

use gitrewind_config::AuthConfig;
use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{ErrorKind, OAuthError};
use crate::oauth::provider::Provider;
use crate::oauth::types::{Credential, RefreshTokenRequest, TokenExchangeRequest, TokenResponse};

/// Outbound calls to a token endpoint are bounded; a hung provider is a
/// `network_error`, not a stuck request.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the authorization-code and refresh-token grants.
pub struct TokenExchangeClient {
    client: reqwest::Client,
    token_endpoint_override: Option<String>,
}

impl TokenExchangeClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            token_endpoint_override: None,
        }
    }

    /// Point every grant at a fixed endpoint instead of the provider's own.
    /// Test support.
    pub fn with_token_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_endpoint_override: Some(endpoint.into()),
        }
    }

    fn token_url(&self, provider: Provider) -> String {
        self.token_endpoint_override
            .clone()
            .unwrap_or_else(|| provider.token_url().to_string())
    }

    /// Exchange an authorization code for a credential.
    pub async fn exchange_code(
        &self,
        config: &AuthConfig,
        provider: Provider,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Credential, OAuthError> {
        let credentials = match provider {
            Provider::Github => &config.github,
            Provider::Gitlab => &config.gitlab,
        };

        // GitHub infers the grant from the bare fields; GitLab requires the
        // explicit grant type, the registered redirect URI, and the verifier.
        let request = TokenExchangeRequest {
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            code,
            grant_type: provider
                .supports_pkce()
                .then_some("authorization_code"),
            redirect_uri: provider
                .supports_pkce()
                .then(|| config.callback_url(provider.as_str())),
            code_verifier,
        };

        debug!(provider = %provider, "exchanging authorization code");
        self.post_grant(provider, &request).await
    }

    /// Exchange a refresh token for a new credential.
    ///
    /// Only defined for providers with refresh support; the caller clears
    /// stored credentials on any failure and never retries.
    pub async fn refresh_token(
        &self,
        config: &AuthConfig,
        provider: Provider,
        refresh_token: &str,
    ) -> Result<Credential, OAuthError> {
        let credentials = match provider {
            Provider::Github => &config.github,
            Provider::Gitlab => &config.gitlab,
        };

        let request = RefreshTokenRequest {
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            refresh_token,
            grant_type: "refresh_token",
        };

        debug!(provider = %provider, "refreshing access token");
        self.post_grant(provider, &request).await
    }

    async fn post_grant<T: Serialize>(
        &self,
        provider: Provider,
        request: &T,
    ) -> Result<Credential, OAuthError> {
        let response = self
            .client
            .post(self.token_url(provider))
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %provider, "token endpoint unreachable: {e}");
                OAuthError::with_detail(provider, ErrorKind::NetworkError, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            // Log the status only; token endpoint bodies can carry secrets.
            error!(provider = %provider, %status, "token request rejected");
            return Err(OAuthError::with_detail(
                provider,
                ErrorKind::TokenExchangeFailed,
                format!("HTTP {status}"),
            ));
        }

        let mut token_response: TokenResponse = response.json().await.map_err(|e| {
            error!(provider = %provider, "failed to parse token response: {e}");
            OAuthError::with_detail(
                provider,
                ErrorKind::TokenExchangeFailed,
                "unparseable token response",
            )
        })?;

        // A 2xx body can still encode a protocol failure.
        if let Some(code) = token_response.error.take() {
            let detail = token_response
                .error_description
                .take()
                .unwrap_or_else(|| code.clone());
            error!(provider = %provider, error = %code, "token response reported an error");
            return Err(OAuthError::with_detail(
                provider,
                ErrorKind::TokenExchangeFailed,
                detail,
            ));
        }

        Credential::from_token_response(provider, token_response).ok_or_else(|| {
            error!(provider = %provider, "token response carried no access token");
            OAuthError::with_detail(
                provider,
                ErrorKind::TokenExchangeFailed,
                "missing access token",
            )
        })
    }
}

impl Default for TokenExchangeClient {
    fn default() -> Self {
        Self::new()
    }
}
