// ABOUTME: External platform integration model and the closed platform enum
// ABOUTME: One integration row per (user, platform) carrying the OAuth token pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported external fitness platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Strava (OAuth, pull-based sync)
    Strava,
    /// Apple Health (token-less, device-side collector pushes batches)
    AppleHealth,
    /// Google Fit (OAuth, pull-based sync)
    GoogleFit,
}

impl Platform {
    /// Stable lowercase identifier used in logs and storage keys
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strava => "strava",
            Self::AppleHealth => "apple_health",
            Self::GoogleFit => "google_fit",
        }
    }

    /// Whether activities arrive as caller-supplied push batches instead of
    /// an authenticated pull
    #[must_use]
    pub const fn is_push_based(self) -> bool {
        matches!(self, Self::AppleHealth)
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strava" => Ok(Self::Strava),
            "apple_health" => Ok(Self::AppleHealth),
            "google_fit" => Ok(Self::GoogleFit),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// A user's connection to one external platform
///
/// Unique per `(user_id, platform)`. Created on a successful OAuth connect,
/// or on the first push batch for token-less platforms; deleted on
/// disconnect. Local absence is the authoritative "disconnected" signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalIntegration {
    /// Owning user
    pub user_id: Uuid,
    /// Connected platform
    pub platform: Platform,
    /// Current access token, absent for push-based platforms
    pub access_token: Option<String>,
    /// Refresh token, absent for push-based platforms
    pub refresh_token: Option<String>,
    /// Access token expiry, absent for push-based platforms
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Whether the connection is usable
    pub active: bool,
    /// Whether background sync is enabled for this connection
    pub auto_sync: bool,
    /// Completion time of the last successful sync
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl ExternalIntegration {
    /// Integration created by an OAuth connect
    #[must_use]
    pub fn oauth(
        user_id: Uuid,
        platform: Platform,
        access_token: String,
        refresh_token: String,
        token_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            platform,
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            token_expires_at: Some(token_expires_at),
            active: true,
            auto_sync: true,
            last_sync_at: None,
        }
    }

    /// Token-less row marking a push-based platform as seen
    #[must_use]
    pub fn push_seen(user_id: Uuid, platform: Platform) -> Self {
        Self {
            user_id,
            platform,
            access_token: None,
            refresh_token: None,
            token_expires_at: None,
            active: true,
            auto_sync: false,
            last_sync_at: None,
        }
    }

    /// Whether the access token needs a refresh before authenticated calls
    #[must_use]
    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at.is_some_and(|expires| now >= expires)
    }
}
