// ABOUTME: Environment-derived configuration for the gitrewind auth service
// ABOUTME: Validates provider credentials at startup and gates which providers are usable

use std::env;

use tracing::warn;

pub mod constants;

/// Sentinel credential value meaning "deliberately disabled".
///
/// A GitLab app registration is optional; deployments that only want GitHub
/// set the GitLab variables to this value to make the intent explicit.
pub const PLACEHOLDER_CREDENTIAL: &str = "placeholder";

/// OAuth client credentials for a single provider.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ProviderCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    fn from_env(id_var: &str, secret_var: &str) -> Self {
        Self {
            client_id: env::var(id_var).unwrap_or_default(),
            client_secret: env::var(secret_var).unwrap_or_default(),
        }
    }

    fn is_present(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    fn is_placeholder(&self) -> bool {
        self.client_id == PLACEHOLDER_CREDENTIAL || self.client_secret == PLACEHOLDER_CREDENTIAL
    }
}

/// Result of validating the environment at startup.
#[derive(Debug, Default)]
pub struct EnvValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl EnvValidation {
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Immutable application configuration, constructed once at startup.
///
/// Every flow consults the `*_configured` predicates before starting, so a
/// deployment with broken credentials fails at the gate instead of leaking a
/// doomed authorization attempt to the provider.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub public_app_url: String,
    pub github: ProviderCredentials,
    pub gitlab: ProviderCredentials,
    production: bool,
}

impl AuthConfig {
    /// Load configuration from the process environment.
    ///
    /// Missing variables become empty strings; `validate` reports them.
    pub fn from_env() -> Self {
        Self {
            public_app_url: env::var(constants::PUBLIC_APP_URL).unwrap_or_default(),
            github: ProviderCredentials::from_env(
                constants::GITHUB_CLIENT_ID,
                constants::GITHUB_CLIENT_SECRET,
            ),
            gitlab: ProviderCredentials::from_env(
                constants::GITLAB_CLIENT_ID,
                constants::GITLAB_CLIENT_SECRET,
            ),
            production: env::var(constants::APP_ENV)
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        }
    }

    /// Validate the loaded configuration.
    ///
    /// Missing app URL or GitHub credentials are errors; a missing or
    /// placeholder GitLab registration only disables that integration.
    pub fn validate(&self) -> EnvValidation {
        let mut result = EnvValidation::default();

        if self.public_app_url.is_empty() {
            result.errors.push("PUBLIC_APP_URL is required".to_string());
        } else if url::Url::parse(&self.public_app_url).is_err() {
            result
                .errors
                .push("PUBLIC_APP_URL must be a valid URL".to_string());
        }

        if self.github.client_id.is_empty() {
            result.errors.push("GITHUB_CLIENT_ID is required".to_string());
        }
        if self.github.client_secret.is_empty() {
            result
                .errors
                .push("GITHUB_CLIENT_SECRET is required".to_string());
        }

        if self.gitlab.client_id.is_empty() {
            result
                .warnings
                .push("GITLAB_CLIENT_ID is not set - GitLab integration will be disabled".to_string());
        } else if self.gitlab.client_id == PLACEHOLDER_CREDENTIAL {
            result.warnings.push(
                "GITLAB_CLIENT_ID is set to placeholder - GitLab integration will not work"
                    .to_string(),
            );
        }
        if self.gitlab.client_secret.is_empty() {
            result.warnings.push(
                "GITLAB_CLIENT_SECRET is not set - GitLab integration will be disabled".to_string(),
            );
        } else if self.gitlab.client_secret == PLACEHOLDER_CREDENTIAL {
            result.warnings.push(
                "GITLAB_CLIENT_SECRET is set to placeholder - GitLab integration will not work"
                    .to_string(),
            );
        }

        for warning in &result.warnings {
            warn!("{}", warning);
        }

        result
    }

    /// Whether GitHub sign-in is usable.
    pub fn github_configured(&self) -> bool {
        self.github.is_present()
    }

    /// Whether GitLab sign-in is usable.
    ///
    /// The placeholder sentinel counts as unconfigured, distinguishing a
    /// deliberately disabled registration from one that was never set.
    pub fn gitlab_configured(&self) -> bool {
        self.gitlab.is_present() && !self.gitlab.is_placeholder()
    }

    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Whether auth cookies must carry the `Secure` attribute.
    ///
    /// Always on in production; in development it follows the app URL scheme
    /// so localhost over plain http still works.
    pub fn secure_cookies(&self) -> bool {
        self.production || self.public_app_url.starts_with("https://")
    }

    /// Callback URL registered with the provider for the given slug.
    ///
    /// Must match byte-for-byte at authorization and token-exchange time.
    pub fn callback_url(&self, provider_slug: &str) -> String {
        format!(
            "{}/auth/{}/callback",
            self.public_app_url.trim_end_matches('/'),
            provider_slug
        )
    }

    /// Construct a config directly, bypassing the environment. Test support.
    pub fn for_app_url(
        public_app_url: impl Into<String>,
        github: ProviderCredentials,
        gitlab: ProviderCredentials,
    ) -> Self {
        Self {
            public_app_url: public_app_url.into(),
            github,
            gitlab,
            production: false,
        }
    }
}
