//! Process configuration read from the environment.

use std::env;
use thiserror::Error;

/// Default bexio API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.bexio.com/2.0";

/// Configuration failure at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BEXIO_API_TOKEN environment variable is required. Get a token from https://office.bexio.com and export it before starting the server.")]
    MissingApiToken,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the bexio API.
    pub api_token: String,
    /// Base URL for the bexio API, without trailing slash.
    pub base_url: String,
    /// Optional shared secret protecting the HTTP POST endpoints.
    pub http_auth_token: Option<String>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = env::var("BEXIO_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingApiToken)?;

        let base_url = env::var("BEXIO_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let http_auth_token = env::var("HTTP_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            api_token,
            base_url,
            http_auth_token,
        })
    }
}
