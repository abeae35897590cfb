// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The relay holds no secrets of its own: the Polar client secret arrives
//! with each token request and is only forwarded upstream.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_AUTHORIZATION_URL: &str = "https://flow.polar.com/oauth2/authorization";
const DEFAULT_TOKEN_URL: &str = "https://polarremote.com/v2/oauth2/token";
const DEFAULT_API_BASE_URL: &str = "https://www.polaraccesslink.com/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Polar Flow authorization page (browser redirect target)
    pub polar_authorization_url: String,
    /// Polar OAuth2 token endpoint
    pub polar_token_url: String,
    /// AccessLink API base, without trailing slash
    pub polar_api_base_url: String,
    /// Bound on every upstream call
    pub upstream_timeout: Duration,
    /// Directory holding the local JSON stores
    pub data_dir: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            polar_authorization_url: DEFAULT_AUTHORIZATION_URL.to_string(),
            polar_token_url: DEFAULT_TOKEN_URL.to_string(),
            polar_api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upstream_timeout: Duration::from_secs(5),
            data_dir: PathBuf::from(".coach-trail-test"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let timeout_secs = match env_trimmed("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("UPSTREAM_TIMEOUT_SECS", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "UPSTREAM_TIMEOUT_SECS",
                "0".to_string(),
            ));
        }

        Ok(Self {
            port: env_trimmed("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            polar_authorization_url: env_trimmed("POLAR_AUTHORIZATION_URL")
                .unwrap_or_else(|| DEFAULT_AUTHORIZATION_URL.to_string()),
            polar_token_url: env_trimmed("POLAR_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            polar_api_base_url: env_trimmed("POLAR_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            upstream_timeout: Duration::from_secs(timeout_secs),
            data_dir: env_trimmed("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".coach-trail")),
        })
    }

    /// Test config.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Test config with every upstream endpoint served by one mock server.
    pub fn with_upstream(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            polar_authorization_url: format!("{}/oauth2/authorization", base),
            polar_token_url: format!("{}/v2/oauth2/token", base),
            polar_api_base_url: format!("{}/v3", base),
            ..Self::default()
        }
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
