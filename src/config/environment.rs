// ABOUTME: Environment-based configuration loading for the engine
// ABOUTME: Defines the typed configuration tree with real-world endpoint defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Engine Configuration
//!
//! Environment-only configuration: every knob has a default except platform
//! OAuth credentials, which stay `None` until the deployment provides them.
//! Platforms without credentials are simply not registered for OAuth flows.

use std::env;

use crate::constants::{http, oauth, retry, sync};
use crate::errors::{EngineError, EngineResult};

/// Top-level engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// HTTP client limits
    pub http: HttpConfig,
    /// Remote fetch retry policy
    pub retry: RetryConfig,
    /// Sync window behavior
    pub sync: SyncConfig,
    /// Per-platform OAuth settings
    pub oauth: OAuthConfig,
}

/// HTTP client timeouts
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout for activity fetches, seconds
    pub timeout_secs: u64,
    /// Connection establishment timeout, seconds
    pub connect_timeout_secs: u64,
    /// Request timeout for OAuth exchanges, seconds
    pub oauth_timeout_secs: u64,
}

/// Bounded retry policy for activity fetches
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per fetch, including the first
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds, doubled per attempt
    pub base_delay_ms: u64,
}

/// Sync window behavior
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Trailing lookback for integrations that have never synced, days
    pub default_lookback_days: i64,
}

/// OAuth settings for every supported platform
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Strava application settings
    pub strava: OAuthProviderConfig,
    /// Google Fit application settings
    pub google_fit: OAuthProviderConfig,
}

/// OAuth application settings for one platform
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    /// OAuth client id, absent until configured
    pub client_id: Option<String>,
    /// OAuth client secret, absent until configured
    pub client_secret: Option<String>,
    /// Registered redirect URI for the authorization flow
    pub redirect_uri: Option<String>,
    /// Authorization endpoint
    pub auth_url: String,
    /// Token endpoint for code and refresh exchanges
    pub token_url: String,
    /// Token revocation endpoint
    pub revoke_url: String,
    /// REST API base URL
    pub api_base: String,
    /// Scopes requested at connect time
    pub scopes: String,
}

impl OAuthProviderConfig {
    /// Client credentials, or a configuration error naming the missing one
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` when the client id or secret is unset.
    pub fn credentials(&self) -> EngineResult<(&str, &str)> {
        let id = self
            .client_id
            .as_deref()
            .ok_or_else(|| EngineError::Config("OAuth client id not configured".into()))?;
        let secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| EngineError::Config("OAuth client secret not configured".into()))?;
        Ok((id, secret))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig {
                timeout_secs: http::DEFAULT_TIMEOUT_SECS,
                connect_timeout_secs: http::CONNECT_TIMEOUT_SECS,
                oauth_timeout_secs: http::OAUTH_TIMEOUT_SECS,
            },
            retry: RetryConfig {
                max_attempts: retry::MAX_FETCH_ATTEMPTS,
                base_delay_ms: retry::BACKOFF_BASE_MS,
            },
            sync: SyncConfig {
                default_lookback_days: sync::DEFAULT_LOOKBACK_DAYS,
            },
            oauth: OAuthConfig {
                strava: OAuthProviderConfig {
                    client_id: None,
                    client_secret: None,
                    redirect_uri: None,
                    auth_url: "https://www.strava.com/oauth/authorize".into(),
                    token_url: "https://www.strava.com/oauth/token".into(),
                    revoke_url: "https://www.strava.com/oauth/deauthorize".into(),
                    api_base: "https://www.strava.com/api/v3".into(),
                    scopes: oauth::STRAVA_DEFAULT_SCOPES.into(),
                },
                google_fit: OAuthProviderConfig {
                    client_id: None,
                    client_secret: None,
                    redirect_uri: None,
                    auth_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
                    token_url: "https://oauth2.googleapis.com/token".into(),
                    revoke_url: "https://oauth2.googleapis.com/revoke".into(),
                    api_base: "https://www.googleapis.com/fitness/v1".into(),
                    scopes: oauth::GOOGLE_FIT_DEFAULT_SCOPES.into(),
                },
            },
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` when a numeric variable is present but
    /// does not parse.
    pub fn from_env() -> EngineResult<Self> {
        let mut config = Self::default();

        config.http.timeout_secs = env_u64("HTTP_TIMEOUT_SECS", config.http.timeout_secs)?;
        config.http.connect_timeout_secs =
            env_u64("HTTP_CONNECT_TIMEOUT_SECS", config.http.connect_timeout_secs)?;
        config.http.oauth_timeout_secs =
            env_u64("OAUTH_TIMEOUT_SECS", config.http.oauth_timeout_secs)?;
        config.retry.max_attempts = u32::try_from(env_u64(
            "SYNC_FETCH_MAX_ATTEMPTS",
            u64::from(config.retry.max_attempts),
        )?)
        .map_err(|_| EngineError::Config("SYNC_FETCH_MAX_ATTEMPTS out of range".into()))?;
        config.retry.base_delay_ms =
            env_u64("SYNC_FETCH_BACKOFF_BASE_MS", config.retry.base_delay_ms)?;
        config.sync.default_lookback_days = i64::try_from(env_u64(
            "SYNC_LOOKBACK_DAYS",
            u64::try_from(config.sync.default_lookback_days).unwrap_or(30),
        )?)
        .map_err(|_| EngineError::Config("SYNC_LOOKBACK_DAYS out of range".into()))?;

        config.oauth.strava.client_id = env::var("STRAVA_CLIENT_ID").ok();
        config.oauth.strava.client_secret = env::var("STRAVA_CLIENT_SECRET").ok();
        config.oauth.strava.redirect_uri = env::var("STRAVA_REDIRECT_URI").ok();
        if let Ok(base) = env::var("STRAVA_API_BASE") {
            config.oauth.strava.api_base = base;
        }
        if let Ok(url) = env::var("STRAVA_TOKEN_URL") {
            config.oauth.strava.token_url = url;
        }

        config.oauth.google_fit.client_id = env::var("GOOGLE_FIT_CLIENT_ID").ok();
        config.oauth.google_fit.client_secret = env::var("GOOGLE_FIT_CLIENT_SECRET").ok();
        config.oauth.google_fit.redirect_uri = env::var("GOOGLE_FIT_REDIRECT_URI").ok();
        if let Ok(base) = env::var("GOOGLE_FIT_API_BASE") {
            config.oauth.google_fit.api_base = base;
        }
        if let Ok(url) = env::var("GOOGLE_FIT_TOKEN_URL") {
            config.oauth.google_fit.token_url = url;
        }

        Ok(config)
    }
}

fn env_u64(key: &str, default: u64) -> EngineResult<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|_| EngineError::Config(format!("{key} must be a non-negative integer"))),
        Err(_) => Ok(default),
    }
}
