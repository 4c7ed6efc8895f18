// ABOUTME: Unified error taxonomy for the live activity and sync engine
// ABOUTME: Defines EngineError variants and the EngineResult alias used crate-wide
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Engine Error Taxonomy
//!
//! One error enum covers the whole engine surface. Device failures are
//! normally caught at the telemetry layer and degrade to simulation; the
//! variants here are what callers of the sync gateway and storage traits
//! observe.

use thiserror::Error;

use crate::models::integration::Platform;

/// Convenience alias used by all fallible engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Authorization code exchange or credential validation failed. Carries
    /// the remote error payload for diagnosis.
    #[error("{platform} authorization failed: {detail}")]
    Auth {
        /// Platform the exchange targeted
        platform: Platform,
        /// Remote error payload or transport detail
        detail: String,
    },

    /// The access token is expired and the refresh exchange also failed;
    /// the user must reconnect the platform.
    #[error("{platform} token expired and refresh failed; reconnect required")]
    TokenExpired {
        /// Platform whose token could not be refreshed
        platform: Platform,
    },

    /// No Bluetooth adapter, no supported device, or the transport failed
    #[error("heart rate device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A remote activity fetch returned a non-success status
    #[error("{platform} sync failed with status {status}: {body}")]
    SyncFailure {
        /// Platform being synchronized
        platform: Platform,
        /// HTTP status returned by the remote API, 0 for transport errors
        status: u16,
        /// Remote response body, attached for diagnosis
        body: String,
    },

    /// A referenced integration or activity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The acting user is not allowed to perform this operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The platform is not registered in this build (feature-gated out or
    /// missing credentials)
    #[error("platform not available: {0}")]
    UnsupportedPlatform(Platform),

    /// Missing or invalid engine configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// The persistence collaborator reported a failure
    #[error("storage error: {0}")]
    Storage(String),

    /// HTTP transport failure before any remote status was received
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl EngineError {
    /// Auth failure with the remote payload attached
    #[must_use]
    pub fn auth(platform: Platform, detail: impl Into<String>) -> Self {
        Self::Auth {
            platform,
            detail: detail.into(),
        }
    }

    /// Missing integration or activity
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Sync failure carrying the remote status and body
    #[must_use]
    pub fn sync_failure(platform: Platform, status: u16, body: impl Into<String>) -> Self {
        Self::SyncFailure {
            platform,
            status,
            body: body.into(),
        }
    }

    /// Whether a retry with backoff could plausibly succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SyncFailure { .. } | Self::Transport(_))
    }
}
