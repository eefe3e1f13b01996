// ABOUTME: CSRF state store backed by short-lived cookies
// ABOUTME: Issues single-use state tokens and validates callbacks in constant time

use cookie::SameSite;
use subtle::ConstantTimeEq;
use tracing::debug;
use uuid::Uuid;

use crate::oauth::cookies::{SessionCookies, STATE_COOKIE_MAX_AGE};
use crate::oauth::provider::Provider;
use crate::oauth::types::StateValidation;

/// Separator between state and PKCE verifier in the cookie payload.
///
/// Both values are restricted to URL-safe alphabets (UUID hex/hyphens and
/// base64url), so the colon can never occur inside either of them.
const STATE_DELIMITER: char = ':';

/// Issue a fresh state token for a flow attempt and bind it to the client.
///
/// The cookie is `SameSite=Lax` so it survives the top-level redirect back
/// from the provider. Starting a new flow overwrites any previous state for
/// the same provider, implicitly invalidating it.
pub fn issue(
    cookies: &mut SessionCookies,
    provider: Provider,
    code_verifier: Option<&str>,
) -> String {
    let state = Uuid::new_v4().to_string();
    let payload = match code_verifier {
        Some(verifier) => format!("{state}{STATE_DELIMITER}{verifier}"),
        None => state.clone(),
    };

    cookies.set(
        provider.state_cookie(),
        payload,
        STATE_COOKIE_MAX_AGE,
        SameSite::Lax,
    );
    debug!(provider = %provider, pkce = code_verifier.is_some(), "issued oauth state");

    state
}

/// Discard any stored state for a provider without validating it.
///
/// Used when a callback short-circuits before the comparison (provider
/// error, malformed code) and on logout: the flow attempt is over either
/// way, and the state must not remain replayable.
pub fn consume(cookies: &mut SessionCookies, provider: Provider) {
    cookies.remove(provider.state_cookie());
}

/// Validate a callback's state against the stored cookie, consuming it.
///
/// The cookie is deleted before any comparison happens, whatever the
/// outcome: a captured callback URL can never be replayed. The comparison
/// itself is constant-time over the token bytes.
pub fn validate_and_consume(
    cookies: &mut SessionCookies,
    provider: Provider,
    supplied: Option<&str>,
) -> StateValidation {
    let stored = cookies.get(provider.state_cookie()).map(str::to_string);
    cookies.remove(provider.state_cookie());

    let Some(stored) = stored else {
        debug!(provider = %provider, "state cookie missing");
        return StateValidation::invalid();
    };

    let (stored_state, code_verifier) = match stored.split_once(STATE_DELIMITER) {
        Some((state, verifier)) => (state, Some(verifier)),
        None => (stored.as_str(), None),
    };

    let Some(supplied) = supplied else {
        debug!(provider = %provider, "callback carried no state parameter");
        return StateValidation::invalid();
    };

    let matches: bool = supplied
        .as_bytes()
        .ct_eq(stored_state.as_bytes())
        .into();
    if !matches {
        debug!(provider = %provider, "state mismatch");
        return StateValidation::invalid();
    }

    debug!(provider = %provider, pkce = code_verifier.is_some(), "state validated");
    StateValidation {
        valid: true,
        code_verifier: code_verifier.map(str::to_string),
    }
}
