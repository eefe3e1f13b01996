// ABOUTME: Cookie-backed credential store for the stateless auth server
// ABOUTME: Wraps a cookie jar with the attribute sets each auth cookie must carry

use cookie::time::Duration;
use cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::oauth::provider::Provider;
use crate::oauth::types::Credential;

/// State cookies live just long enough to complete a round trip to the
/// provider; an abandoned flow leaves no residue past this window.
pub const STATE_COOKIE_MAX_AGE: i64 = 60 * 5;

/// Fixed access-token window for providers that report no expiry.
pub const TOKEN_COOKIE_MAX_AGE: i64 = 60 * 60 * 24 * 7;

/// Refresh tokens outlive access tokens; GitLab rotates them on use.
pub const REFRESH_TOKEN_MAX_AGE: i64 = 60 * 60 * 24 * 30;

/// The client-held session: all flow and credential state for one request.
///
/// The server keeps no session table; this jar, parsed from the `Cookie`
/// header and written back as `Set-Cookie` headers, is the only channel.
/// Writes are tracked as a delta so removals are emitted too.
#[derive(Debug)]
pub struct SessionCookies {
    jar: CookieJar,
    secure: bool,
}

impl SessionCookies {
    /// Empty jar, for flows that start with no cookies.
    pub fn new(secure: bool) -> Self {
        Self {
            jar: CookieJar::new(),
            secure,
        }
    }

    /// Parse a `Cookie` request header. Unparseable fragments are skipped.
    pub fn from_header(header: Option<&str>, secure: bool) -> Self {
        let mut jar = CookieJar::new();
        if let Some(raw) = header {
            for cookie in Cookie::split_parse(raw.to_string()).flatten() {
                jar.add_original(cookie);
            }
        }
        Self { jar, secure }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(|c| c.value())
    }

    /// Set an auth cookie with the shared attribute set.
    ///
    /// `SameSite` varies by purpose: state cookies are `Lax` so they survive
    /// the top-level redirect back from the provider, token cookies are
    /// `Strict` since they are never needed on a cross-site navigation.
    pub(crate) fn set(
        &mut self,
        name: &'static str,
        value: String,
        max_age_secs: i64,
        same_site: SameSite,
    ) {
        let cookie = Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(same_site)
            .max_age(Duration::seconds(max_age_secs))
            .build();
        self.jar.add(cookie);
    }

    /// Remove a cookie. A removal `Set-Cookie` is emitted when the client
    /// presented the cookie; removing an absent cookie is a no-op, so callers
    /// never need to check first.
    pub(crate) fn remove(&mut self, name: &'static str) {
        let mut cookie = Cookie::new(name, "");
        cookie.set_path("/");
        self.jar.remove(cookie);
    }

    /// Render every change made to the jar as `Set-Cookie` header values,
    /// removals included.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.jar.delta().map(|c| c.to_string()).collect()
    }

    /// Persist a credential as token cookies.
    ///
    /// The access cookie's lifetime tracks the token's own; the refresh
    /// cookie, when present, gets the long fixed window. An absent refresh
    /// token leaves any previously stored refresh cookie untouched.
    pub fn store_credential(&mut self, credential: &Credential) {
        let provider = credential.provider;
        let max_age = credential.expires_in().unwrap_or(TOKEN_COOKIE_MAX_AGE);

        self.set(
            provider.token_cookie(),
            credential.access_token.clone(),
            max_age,
            SameSite::Strict,
        );
        debug!(provider = %provider, expires_in = max_age, "stored access token cookie");

        if let Some(refresh_token) = &credential.refresh_token {
            self.set(
                provider.refresh_cookie(),
                refresh_token.clone(),
                REFRESH_TOKEN_MAX_AGE,
                SameSite::Strict,
            );
            debug!(provider = %provider, "stored refresh token cookie");
        }
    }

    /// Read back the stored credential for a provider, if any.
    ///
    /// Expiry is enforced by the cookie lifetime itself, so a credential read
    /// from the jar carries no `expires_at`.
    pub fn credential(&self, provider: Provider) -> Option<Credential> {
        let access_token = self.get(provider.token_cookie())?.to_string();
        Some(Credential {
            provider,
            access_token,
            refresh_token: self.refresh_token(provider),
            expires_at: None,
        })
    }

    pub fn refresh_token(&self, provider: Provider) -> Option<String> {
        self.get(provider.refresh_cookie()).map(str::to_string)
    }

    /// Remove both token cookies for a provider. Idempotent.
    pub fn clear_credentials(&mut self, provider: Provider) {
        self.remove(provider.token_cookie());
        self.remove(provider.refresh_cookie());
        debug!(provider = %provider, "cleared credential cookies");
    }
}
