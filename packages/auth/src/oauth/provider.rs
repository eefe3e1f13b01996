// ABOUTME: OAuth provider definitions for the two supported identity providers
// ABOUTME: GitHub and GitLab with provider-specific URLs, scopes, and refresh capability

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownProvider;

/// The two supported identity providers.
///
/// Everything provider-specific hangs off this enum: endpoints, scopes,
/// refresh/PKCE capability, default token lifetime, and cookie names. The
/// asymmetry is deliberate: GitHub access tokens never expire and have no
/// refresh grant, while GitLab tokens expire after ~2 hours and rotate
/// refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Gitlab,
}

impl Provider {
    /// Get authorization URL for this provider
    pub fn authorize_url(&self) -> &'static str {
        match self {
            Self::Github => "https://github.com/login/oauth/authorize",
            Self::Gitlab => "https://gitlab.com/oauth/authorize",
        }
    }

    /// Get token exchange URL for this provider
    pub fn token_url(&self) -> &'static str {
        match self {
            Self::Github => "https://github.com/login/oauth/access_token",
            Self::Gitlab => "https://gitlab.com/oauth/token",
        }
    }

    /// Get requested scopes for this provider
    pub fn scopes(&self) -> &[&str] {
        match self {
            Self::Github => &["read:user", "repo"],
            Self::Gitlab => &["read_user", "read_api", "read_repository"],
        }
    }

    /// Whether this provider supports the refresh-token grant.
    pub fn supports_refresh(&self) -> bool {
        matches!(self, Self::Gitlab)
    }

    /// Whether this provider supports PKCE on the authorization-code grant.
    pub fn supports_pkce(&self) -> bool {
        matches!(self, Self::Gitlab)
    }

    /// Access-token lifetime assumed when the token response omits
    /// `expires_in`. GitHub tokens do not expire at all.
    pub fn default_expires_in(&self) -> Option<i64> {
        match self {
            Self::Github => None,
            Self::Gitlab => Some(7200),
        }
    }

    /// CSRF state cookie name. Cookie names are part of the wire contract.
    pub fn state_cookie(&self) -> &'static str {
        match self {
            Self::Github => "github_oauth_state",
            Self::Gitlab => "gitlab_oauth_state",
        }
    }

    /// Access-token cookie name.
    pub fn token_cookie(&self) -> &'static str {
        match self {
            Self::Github => "github_token",
            Self::Gitlab => "gitlab_token",
        }
    }

    /// Refresh-token cookie name.
    pub fn refresh_cookie(&self) -> &'static str {
        match self {
            Self::Github => "github_refresh_token",
            Self::Gitlab => "gitlab_refresh_token",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
        }
    }

    /// Get all supported providers
    pub fn all() -> [Self; 2] {
        [Self::Github, Self::Gitlab]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "gitlab" => Ok(Self::Gitlab),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}
