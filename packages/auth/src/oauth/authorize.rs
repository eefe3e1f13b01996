// ABOUTME: Authorization redirect URL construction
// ABOUTME: Deterministic assembly of each provider's authorize endpoint with query parameters

use gitrewind_config::AuthConfig;
use tracing::info;
use url::Url;

use crate::error::{ErrorKind, OAuthError};
use crate::oauth::provider::Provider;

/// Build the provider authorization URL for one flow attempt.
///
/// Pure construction, no network. The redirect URI must match the one
/// registered with the provider and the one sent at token-exchange time
/// exactly; a mismatch is rejected by the provider, not locally.
pub fn build_authorization_url(
    config: &AuthConfig,
    provider: Provider,
    state: &str,
    code_challenge: Option<&str>,
) -> Result<String, OAuthError> {
    let client_id = match provider {
        Provider::Github => &config.github.client_id,
        Provider::Gitlab => &config.gitlab.client_id,
    };

    let mut url = Url::parse(provider.authorize_url())
        .map_err(|e| OAuthError::with_detail(provider, ErrorKind::UnknownError, e.to_string()))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", &config.callback_url(provider.as_str()))
            .append_pair("response_type", "code")
            .append_pair("scope", &provider.scopes().join(" "))
            .append_pair("state", state);

        if let Some(challenge) = code_challenge {
            pairs
                .append_pair("code_challenge", challenge)
                .append_pair("code_challenge_method", "S256");
        }
    }

    info!(provider = %provider, pkce = code_challenge.is_some(), "built authorization redirect");
    Ok(url.to_string())
}
