// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across gitrewind

// Application
pub const PUBLIC_APP_URL: &str = "PUBLIC_APP_URL";
pub const APP_ENV: &str = "APP_ENV";

// GitHub OAuth credentials
pub const GITHUB_CLIENT_ID: &str = "GITHUB_CLIENT_ID";
pub const GITHUB_CLIENT_SECRET: &str = "GITHUB_CLIENT_SECRET";

// GitLab OAuth credentials
pub const GITLAB_CLIENT_ID: &str = "GITLAB_CLIENT_ID";
pub const GITLAB_CLIENT_SECRET: &str = "GITLAB_CLIENT_SECRET";

// Server
pub const PORT: &str = "PORT";
pub const CORS_ORIGIN: &str = "CORS_ORIGIN";
