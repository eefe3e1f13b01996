// ABOUTME: OAuth manager orchestrating the complete authentication flows
// ABOUTME: Sequences start, callback, refresh, and logout per provider with fail-closed semantics

use std::sync::Arc;

use gitrewind_config::AuthConfig;
use tracing::{error, info, warn};

use crate::error::{ErrorKind, OAuthError, RefreshError};
use crate::oauth::authorize::build_authorization_url;
use crate::oauth::client::TokenExchangeClient;
use crate::oauth::cookies::SessionCookies;
use crate::oauth::pkce;
use crate::oauth::provider::Provider;
use crate::oauth::state;
use crate::oauth::types::{CallbackParams, RefreshOutcome};

/// Authorization codes are short opaque strings; anything outsized is a
/// malformed or hostile redirect, rejected before any state is consulted.
const MAX_AUTH_CODE_LENGTH: usize = 200;

/// Orchestrates the OAuth flows for both providers.
///
/// Each operation runs within a single request against the client's own
/// cookie jar; there is no shared mutable state across requests. Every
/// failure is mapped into exactly one [`OAuthError`] at this boundary.
pub struct OAuthManager {
    config: Arc<AuthConfig>,
    client: TokenExchangeClient,
}

impl OAuthManager {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self {
            config,
            client: TokenExchangeClient::new(),
        }
    }

    /// Build a manager around a preconfigured exchange client. Test support.
    pub fn with_client(config: Arc<AuthConfig>, client: TokenExchangeClient) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Abort before touching the provider when its credentials are absent or
    /// disabled; a broken registration must not leak a doomed authorization
    /// attempt.
    fn gate(&self, provider: Provider) -> Result<(), OAuthError> {
        let configured = match provider {
            Provider::Github => self.config.github_configured(),
            Provider::Gitlab => self.config.gitlab_configured(),
        };

        if configured {
            Ok(())
        } else {
            warn!(provider = %provider, "flow attempted against unconfigured provider");
            Err(OAuthError::new(provider, ErrorKind::NotConfigured))
        }
    }

    /// Begin an authorization flow: issue CSRF state (binding the PKCE
    /// verifier where supported) and return the provider redirect URL.
    pub fn start(
        &self,
        cookies: &mut SessionCookies,
        provider: Provider,
    ) -> Result<String, OAuthError> {
        self.gate(provider)?;

        let code_verifier = provider.supports_pkce().then(pkce::generate_code_verifier);
        let code_challenge = code_verifier
            .as_deref()
            .map(pkce::generate_code_challenge);

        let state = state::issue(cookies, provider, code_verifier.as_deref());
        let url =
            build_authorization_url(&self.config, provider, &state, code_challenge.as_deref())?;

        info!(provider = %provider, "starting oauth flow");
        Ok(url)
    }

    /// Complete an authorization flow from the provider callback.
    ///
    /// The state cookie is consumed on every path through this function,
    /// including the early rejections: a callback, however malformed, ends
    /// the flow attempt it belongs to.
    pub async fn callback(
        &self,
        cookies: &mut SessionCookies,
        provider: Provider,
        params: &CallbackParams,
    ) -> Result<(), OAuthError> {
        self.gate(provider)?;

        if let Some(code) = &params.error {
            state::consume(cookies, provider);
            let kind = if code == "access_denied" {
                ErrorKind::AccessDenied
            } else {
                ErrorKind::UnknownError
            };
            warn!(provider = %provider, error = %code, "provider returned an error to the callback");
            let detail = params.error_description.clone().unwrap_or_else(|| code.clone());
            return Err(OAuthError::with_detail(provider, kind, detail));
        }

        let code = params.code.as_deref().unwrap_or_default();
        if code.is_empty() || code.len() > MAX_AUTH_CODE_LENGTH {
            state::consume(cookies, provider);
            warn!(provider = %provider, "callback carried a malformed authorization code");
            return Err(OAuthError::new(provider, ErrorKind::InvalidCode));
        }

        let validation = state::validate_and_consume(cookies, provider, params.state.as_deref());
        if !validation.valid {
            return Err(OAuthError::new(provider, ErrorKind::StateMismatch));
        }

        let credential = self
            .client
            .exchange_code(
                &self.config,
                provider,
                code,
                validation.code_verifier.as_deref(),
            )
            .await?;

        cookies.store_credential(&credential);
        info!(provider = %provider, "authenticated");
        Ok(())
    }

    /// Refresh the stored access token for a provider.
    ///
    /// Providers without refresh support succeed trivially. Any failure past
    /// the capability gate clears every credential for the provider before
    /// surfacing: a dead refresh token must never leave stale credentials
    /// behind, and the caller restarts the flow instead of retrying.
    pub async fn refresh(
        &self,
        cookies: &mut SessionCookies,
        provider: Provider,
    ) -> Result<RefreshOutcome, RefreshError> {
        self.gate(provider)
            .map_err(|_| RefreshError::NotConfigured(provider))?;

        if !provider.supports_refresh() {
            info!(provider = %provider, "tokens do not expire; refresh is a no-op");
            return Ok(RefreshOutcome::NotNeeded);
        }

        let Some(refresh_token) = cookies.refresh_token(provider) else {
            cookies.clear_credentials(provider);
            return Err(RefreshError::MissingRefreshToken(provider));
        };

        match self
            .client
            .refresh_token(&self.config, provider, &refresh_token)
            .await
        {
            Ok(credential) => {
                // The provider may rotate the refresh token; a returned value
                // replaces the stored one, an omitted value leaves it as is.
                let expires_in = credential
                    .expires_in()
                    .or(provider.default_expires_in())
                    .unwrap_or(0);
                cookies.store_credential(&credential);
                info!(provider = %provider, expires_in, "refreshed access token");
                Ok(RefreshOutcome::Refreshed { expires_in })
            }
            Err(e) => {
                error!(provider = %provider, "refresh failed; clearing credentials: {e}");
                cookies.clear_credentials(provider);
                Err(RefreshError::Exchange(e))
            }
        }
    }

    /// Clear every auth cookie for every provider, flow state included.
    ///
    /// Unconditional and idempotent; logging out a client that was never
    /// authenticated is not an error.
    pub fn logout(&self, cookies: &mut SessionCookies) {
        for provider in Provider::all() {
            cookies.clear_credentials(provider);
            state::consume(cookies, provider);
        }
        info!("logged out of all providers");
    }
}
