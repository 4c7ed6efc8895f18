// ABOUTME: Core provider trait and registry for external fitness platforms
// ABOUTME: Defines the shared OAuth and activity-fetch contract every platform implements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Platform Providers
//!
//! Each OAuth platform implements [`SyncProvider`]: token lifecycle plus a
//! normalized activity fetch. Providers expose their own wire DTOs
//! internally and return [`RemoteActivity`] values; the gateway maps those
//! through the canonical taxonomy and reconciles them against storage.
//! Push-based platforms (Apple Health) have no provider client; their
//! batches are normalized by [`apple_health`].

#[cfg(feature = "provider-apple-health")]
pub mod apple_health;
#[cfg(feature = "provider-google-fit")]
pub mod google_fit;
#[cfg(feature = "provider-strava")]
pub mod strava;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::errors::EngineResult;
use crate::models::{ActivityKind, Platform};

/// Token pair returned by a code or refresh exchange
#[derive(Debug, Clone)]
pub struct TokenExchange {
    /// New access token
    pub access_token: String,
    /// New refresh token; platforms that rotate tokens return a fresh one,
    /// others echo the previous value
    pub refresh_token: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    /// Scopes the platform reports as granted
    pub scopes: Option<String>,
}

/// Platform-native activity type before taxonomy mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteActivityType {
    /// String-typed platforms (Strava, Apple Health)
    Named(String),
    /// Numeric-code platforms (Google Fit)
    Coded(u32),
}

/// One remote activity as a provider reports it, before validation
///
/// Fields stay optional here: the gateway decides what is malformed and
/// accounts for skips, so a single bad record never fails a batch.
#[derive(Debug, Clone)]
pub struct RemoteActivity {
    /// Platform-specific identifier used for reconciliation
    pub external_id: Option<String>,
    /// Platform-native activity type
    pub activity_type: RemoteActivityType,
    /// Display title, when the platform has one
    pub title: Option<String>,
    /// Start of the activity
    pub start_at: Option<DateTime<Utc>>,
    /// End of the activity
    pub end_at: Option<DateTime<Utc>>,
    /// Total duration in seconds
    pub duration_seconds: Option<u64>,
    /// Distance covered in meters, as platforms report it
    pub distance_meters: Option<f64>,
    /// Energy expended in kcal
    pub calories: Option<f64>,
    /// Average heart rate in bpm
    pub heart_rate_avg: Option<u16>,
    /// Maximum heart rate in bpm
    pub heart_rate_max: Option<u16>,
    /// Minimum heart rate in bpm
    pub heart_rate_min: Option<u16>,
}

/// Shared contract for OAuth pull platforms
#[async_trait]
pub trait SyncProvider: Send + Sync {
    /// Platform this provider serves
    fn platform(&self) -> Platform;

    /// Consent URL for the authorization-code flow
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` when client credentials are missing or
    /// the configured authorization URL does not parse.
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> EngineResult<String>;

    /// Exchange an authorization code for a token pair
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Auth` with the remote payload attached when
    /// the platform rejects the code.
    async fn exchange_code(&self, code: &str) -> EngineResult<TokenExchange>;

    /// Exchange a refresh token for a new token pair
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Auth` when the platform rejects the refresh
    /// token; the gateway surfaces that as `TokenExpired`.
    async fn refresh_token(&self, refresh_token: &str) -> EngineResult<TokenExchange>;

    /// Revoke an access token with the platform
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SyncFailure` on a non-success revoke response;
    /// disconnect treats that as best-effort and proceeds.
    async fn revoke_token(&self, access_token: &str) -> EngineResult<()>;

    /// Activities started after `since`, normalized but unvalidated
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SyncFailure` carrying the remote status and
    /// body on a non-success fetch response.
    async fn fetch_activities(
        &self,
        access_token: &str,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<RemoteActivity>>;
}

/// Map a platform-native type into the canonical taxonomy
///
/// Dispatches to the platform's lookup table; a representation that does
/// not match the platform (a code where a name belongs) maps to the
/// fallback category instead of failing.
#[must_use]
pub fn canonical_kind(platform: Platform, activity_type: &RemoteActivityType) -> ActivityKind {
    match (platform, activity_type) {
        (Platform::Strava, RemoteActivityType::Named(name)) => ActivityKind::from_strava(name),
        (Platform::AppleHealth, RemoteActivityType::Named(name)) => {
            ActivityKind::from_apple_health(name)
        }
        (Platform::GoogleFit, RemoteActivityType::Coded(code)) => {
            ActivityKind::from_google_fit(*code)
        }
        (platform, other) => {
            warn!("activity type {other:?} does not match platform {platform}, using fallback");
            ActivityKind::FALLBACK
        }
    }
}

/// Registry of available OAuth providers, keyed by platform
pub struct ProviderRegistry {
    providers: HashMap<Platform, Arc<dyn SyncProvider>>,
}

impl ProviderRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Registry with every feature-enabled OAuth provider built from config
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "provider-strava")]
        registry.register(Arc::new(strava::StravaClient::new(
            config.oauth.strava.clone(),
            &config.http,
        )));
        #[cfg(feature = "provider-google-fit")]
        registry.register(Arc::new(google_fit::GoogleFitClient::new(
            config.oauth.google_fit.clone(),
            &config.http,
        )));
        #[cfg(not(any(feature = "provider-strava", feature = "provider-google-fit")))]
        let _ = config;
        registry
    }

    /// Register a provider, replacing any previous one for its platform
    pub fn register(&mut self, provider: Arc<dyn SyncProvider>) {
        info!("registering sync provider: {}", provider.platform());
        self.providers.insert(provider.platform(), provider);
    }

    /// Provider for a platform, when registered
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn SyncProvider>> {
        self.providers.get(&platform).cloned()
    }

    /// Platforms with a registered provider
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        self.providers.keys().copied().collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
