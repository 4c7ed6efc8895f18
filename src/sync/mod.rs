// ABOUTME: External synchronization gateway: OAuth lifecycle and activity reconciliation
// ABOUTME: Serializes sync runs per (user, platform) and accounts for every remote record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Sync Gateway
//!
//! The one place that talks to external fitness platforms. OAuth connect
//! and refresh keep the [`ExternalIntegration`] row current; `sync` pulls a
//! trailing window of remote activities, maps each through the canonical
//! taxonomy, and reconciles by `(user, platform, external id)` so re-runs
//! are idempotent. Push platforms deliver batches through `import_pushed`
//! instead. Every activity write triggers the streak updater.
//!
//! Sync runs for the same `(user, platform)` are serialized through a keyed
//! async mutex; concurrent runs would double-fetch and race the upsert
//! step. Remote fetches run under bounded retry with exponential backoff,
//! and a run has no mid-flight cancellation: it completes or fails.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{EngineConfig, RetryConfig};
use crate::constants::sync::STATE_TTL_MINUTES;
use crate::errors::{EngineError, EngineResult};
use crate::models::{CardioActivity, ExternalIntegration, Platform, PushedActivity};
use crate::providers::{
    canonical_kind, ProviderRegistry, RemoteActivity, SyncProvider,
};
use crate::storage::StateStore;
use crate::streaks::StreakTracker;

/// Accounting for one sync or push run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    /// Remote records inserted as new activities
    pub imported: usize,
    /// Remote records matched to an existing activity and rewritten
    pub updated: usize,
    /// Malformed or unmappable records logged and excluded
    pub skipped: usize,
    /// Remote records seen in this run
    pub total: usize,
}

/// Consent URL plus the state parameter the callback must echo
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Provider consent URL to open in the user's browser
    pub url: String,
    /// CSRF state stored for the matching `connect` call
    pub state: String,
}

#[derive(Debug, Clone)]
struct PendingAuth {
    user_id: Uuid,
    platform: Platform,
    expires_at: DateTime<Utc>,
}

/// External platform synchronization gateway
pub struct SyncGateway {
    store: Arc<dyn StateStore>,
    registry: ProviderRegistry,
    streaks: StreakTracker,
    retry: RetryConfig,
    lookback_days: i64,
    sync_locks: DashMap<(Uuid, Platform), Arc<Mutex<()>>>,
    pending_auth: RwLock<HashMap<String, PendingAuth>>,
}

impl SyncGateway {
    /// Gateway over the given store and provider registry
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>, registry: ProviderRegistry, config: &EngineConfig) -> Self {
        Self {
            streaks: StreakTracker::new(Arc::clone(&store)),
            store,
            registry,
            retry: config.retry.clone(),
            lookback_days: config.sync.default_lookback_days,
            sync_locks: DashMap::new(),
            pending_auth: RwLock::new(HashMap::new()),
        }
    }

    /// Consent URL for connecting a platform, with a stored CSRF state
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnsupportedPlatform` when no provider is
    /// registered, or `EngineError::Config` when credentials are missing.
    pub async fn authorization_url(
        &self,
        user_id: Uuid,
        platform: Platform,
        redirect_uri: &str,
    ) -> EngineResult<AuthorizationRequest> {
        let provider = self.provider(platform)?;
        let state = format!("{user_id}:{}", Uuid::new_v4());
        let url = provider.authorization_url(redirect_uri, &state)?;
        self.store_pending_state(&state, user_id, platform).await;
        Ok(AuthorizationRequest { url, state })
    }

    /// Exchange an authorization code and persist the integration
    ///
    /// Creates the integration row or overwrites its tokens, and marks it
    /// active. When a state parameter is supplied it must match one issued
    /// by [`Self::authorization_url`] for the same user and platform.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Auth` with the remote payload when the
    /// platform rejects the code, and `EngineError::PermissionDenied` for
    /// an unknown or expired state.
    pub async fn connect(
        &self,
        user_id: Uuid,
        platform: Platform,
        code: &str,
        state: Option<&str>,
    ) -> EngineResult<ExternalIntegration> {
        if let Some(state) = state {
            self.consume_state(state, user_id, platform).await?;
        }
        let provider = self.provider(platform)?;
        let token = provider.exchange_code(code).await?;

        let existing = self.store.integration(user_id, platform).await?;
        let mut integration = ExternalIntegration::oauth(
            user_id,
            platform,
            token.access_token,
            token.refresh_token,
            token.expires_at,
        );
        integration.refresh_token = integration.refresh_token.filter(|t| !t.is_empty());
        if let Some(previous) = existing {
            integration.last_sync_at = previous.last_sync_at;
            integration.auto_sync = previous.auto_sync;
        }
        self.store.upsert_integration(&integration).await?;
        info!("{platform} connected for user {user_id}");
        Ok(integration)
    }

    /// Refresh the token pair when it has expired, persisting the result
    ///
    /// Must be called before any authenticated remote call. Integrations
    /// without an expiry (push platforms) pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::TokenExpired` when no refresh token is stored
    /// or the refresh exchange fails; the user must reconnect.
    pub async fn ensure_valid_token(
        &self,
        integration: &ExternalIntegration,
    ) -> EngineResult<ExternalIntegration> {
        if !integration.token_expired(Utc::now()) {
            return Ok(integration.clone());
        }
        let platform = integration.platform;
        info!(
            "refreshing expired {platform} token for user {}",
            integration.user_id
        );

        let provider = self.provider(platform)?;
        let refresh = integration
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(EngineError::TokenExpired { platform })?;
        let token = provider.refresh_token(refresh).await.map_err(|e| {
            warn!("{platform} token refresh failed: {e}");
            EngineError::TokenExpired { platform }
        })?;

        let mut updated = integration.clone();
        updated.access_token = Some(token.access_token);
        updated.token_expires_at = Some(token.expires_at);
        let rotated = Some(token.refresh_token).filter(|t| !t.is_empty());
        if rotated.is_some() {
            updated.refresh_token = rotated;
        }
        self.store.upsert_integration(&updated).await?;
        Ok(updated)
    }

    /// Pull and reconcile remote activities for one integration
    ///
    /// Fetches a trailing window (since the last sync, or the default
    /// lookback when never synced), maps each remote record through the
    /// platform taxonomy, and upserts by `(user, platform, external id)`.
    /// Re-invoking against an unchanged remote set imports nothing and
    /// counts every matched record as updated. Runs for the same
    /// `(user, platform)` are serialized.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` without an integration row,
    /// `EngineError::TokenExpired` when refresh fails, and
    /// `EngineError::SyncFailure` when the remote fetch fails after
    /// bounded retries.
    pub async fn sync(&self, user_id: Uuid, platform: Platform) -> EngineResult<SyncReport> {
        let lock = {
            let entry = self
                .sync_locks
                .entry((user_id, platform))
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        let _guard = lock.lock().await;

        let integration = self
            .store
            .integration(user_id, platform)
            .await?
            .ok_or_else(|| {
                EngineError::not_found(format!("no {platform} integration for user {user_id}"))
            })?;
        let mut integration = self.ensure_valid_token(&integration).await?;
        let access_token = integration
            .access_token
            .clone()
            .ok_or(EngineError::TokenExpired { platform })?;
        let since = integration
            .last_sync_at
            .unwrap_or_else(|| Utc::now() - Duration::days(self.lookback_days));

        let provider = self.provider(platform)?;
        let remote = self
            .fetch_with_backoff(provider.as_ref(), &access_token, since)
            .await?;

        let mut report = SyncReport {
            total: remote.len(),
            ..SyncReport::default()
        };
        for record in remote {
            let Some(mut activity) = remote_to_activity(user_id, platform, record) else {
                report.skipped += 1;
                continue;
            };
            let external_id = activity.external_id.clone().unwrap_or_default();
            match self
                .store
                .activity_by_external_id(user_id, platform, &external_id)
                .await?
            {
                Some(existing) => {
                    activity.id = existing.id;
                    self.store.update_activity(&activity).await?;
                    report.updated += 1;
                }
                None => {
                    self.store.insert_activity(&activity).await?;
                    report.imported += 1;
                }
            }
            self.streaks.record_cardio_activity(user_id).await?;
        }

        integration.last_sync_at = Some(Utc::now());
        self.store.upsert_integration(&integration).await?;
        info!(
            "{platform} sync for user {user_id}: {} imported, {} updated, {} skipped of {}",
            report.imported, report.updated, report.skipped, report.total
        );
        Ok(report)
    }

    /// Disconnect a platform: best-effort remote revoke, then local delete
    ///
    /// The local row deletion is unconditional; a failed revoke is logged
    /// and never propagated, because local absence is the authoritative
    /// disconnected signal.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when no integration row exists.
    pub async fn disconnect(&self, user_id: Uuid, platform: Platform) -> EngineResult<()> {
        let integration = self
            .store
            .integration(user_id, platform)
            .await?
            .ok_or_else(|| {
                EngineError::not_found(format!("no {platform} integration for user {user_id}"))
            })?;

        if let Some(token) = integration.access_token.as_deref() {
            match self.provider(platform) {
                Ok(provider) => {
                    if let Err(e) = provider.revoke_token(token).await {
                        warn!("{platform} revoke failed, continuing with local disconnect: {e}");
                    }
                }
                Err(_) => warn!("no {platform} provider registered, skipping remote revoke"),
            }
        }

        self.store.delete_integration(user_id, platform).await?;
        info!("{platform} disconnected for user {user_id}");
        Ok(())
    }

    /// Ingest a caller-supplied batch from a push-based platform
    ///
    /// Marks the platform as seen with a token-less integration row, maps
    /// each record through the platform taxonomy, and inserts directly.
    /// There is no update pass: every push creates new records, keyed by
    /// each record's own identifier when it has one.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnsupportedPlatform` for pull-based platforms
    /// or when the platform is compiled out.
    pub async fn import_pushed(
        &self,
        user_id: Uuid,
        platform: Platform,
        batch: &[PushedActivity],
    ) -> EngineResult<SyncReport> {
        if !platform.is_push_based() {
            return Err(EngineError::UnsupportedPlatform(platform));
        }

        #[cfg(feature = "provider-apple-health")]
        {
            let mut integration = match self.store.integration(user_id, platform).await? {
                Some(existing) => existing,
                None => ExternalIntegration::push_seen(user_id, platform),
            };

            let mut report = SyncReport {
                total: batch.len(),
                ..SyncReport::default()
            };
            for pushed in batch {
                let Some(activity) = crate::providers::apple_health::normalize(user_id, pushed)
                else {
                    report.skipped += 1;
                    continue;
                };
                self.store.insert_activity(&activity).await?;
                report.imported += 1;
                self.streaks.record_cardio_activity(user_id).await?;
            }

            integration.last_sync_at = Some(Utc::now());
            self.store.upsert_integration(&integration).await?;
            info!(
                "{platform} push for user {user_id}: {} imported, {} skipped of {}",
                report.imported, report.skipped, report.total
            );
            Ok(report)
        }

        #[cfg(not(feature = "provider-apple-health"))]
        {
            let _ = batch;
            Err(EngineError::UnsupportedPlatform(platform))
        }
    }

    /// Record a locally produced activity (manual entry or GPS finish)
    ///
    /// The integration point for the app's own writes: inserts the record
    /// and triggers the streak updater, same as a sync import.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn record_local_activity(&self, activity: &CardioActivity) -> EngineResult<()> {
        self.store.insert_activity(activity).await?;
        self.streaks.record_cardio_activity(activity.user_id).await?;
        Ok(())
    }

    fn provider(&self, platform: Platform) -> EngineResult<Arc<dyn SyncProvider>> {
        self.registry
            .get(platform)
            .ok_or(EngineError::UnsupportedPlatform(platform))
    }

    async fn fetch_with_backoff(
        &self,
        provider: &dyn SyncProvider,
        access_token: &str,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<RemoteActivity>> {
        let platform = provider.platform();
        let mut attempt = 1u32;
        loop {
            match provider.fetch_activities(access_token, since).await {
                Ok(activities) => return Ok(activities),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay =
                        StdDuration::from_millis(self.retry.base_delay_ms << (attempt - 1));
                    warn!("{platform} fetch attempt {attempt} failed ({e}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn store_pending_state(&self, state: &str, user_id: Uuid, platform: Platform) {
        let now = Utc::now();
        let mut pending = self.pending_auth.write().await;
        pending.insert(
            state.to_owned(),
            PendingAuth {
                user_id,
                platform,
                expires_at: now + Duration::minutes(STATE_TTL_MINUTES),
            },
        );
        pending.retain(|_, auth| auth.expires_at > now);
    }

    async fn consume_state(
        &self,
        state: &str,
        user_id: Uuid,
        platform: Platform,
    ) -> EngineResult<()> {
        let mut pending = self.pending_auth.write().await;
        let auth = pending
            .remove(state)
            .ok_or_else(|| EngineError::PermissionDenied("unknown oauth state".into()))?;
        if auth.expires_at < Utc::now() || auth.user_id != user_id || auth.platform != platform {
            return Err(EngineError::PermissionDenied(
                "invalid or expired oauth state".into(),
            ));
        }
        Ok(())
    }
}

/// Validate one remote record and map it into a canonical activity
///
/// Records without an external id, a start time, or a positive duration
/// are logged and excluded; the caller counts them as skipped.
fn remote_to_activity(
    user_id: Uuid,
    platform: Platform,
    remote: RemoteActivity,
) -> Option<CardioActivity> {
    let Some(external_id) = remote.external_id.clone().filter(|id| !id.is_empty()) else {
        warn!("skipping {platform} activity without an external id");
        return None;
    };
    let Some(start_at) = remote.start_at else {
        warn!("skipping {platform} activity {external_id}: no start time");
        return None;
    };
    let Some(duration_seconds) = remote.duration_seconds.filter(|&secs| secs > 0) else {
        warn!("skipping {platform} activity {external_id}: no positive duration");
        return None;
    };
    let end_at = remote.end_at.unwrap_or_else(|| {
        start_at + Duration::seconds(i64::try_from(duration_seconds).unwrap_or(0))
    });

    Some(CardioActivity {
        id: Uuid::new_v4(),
        user_id,
        kind: canonical_kind(platform, &remote.activity_type),
        origin: platform.into(),
        external_id: Some(external_id),
        title: remote.title,
        duration_seconds,
        distance_km: remote.distance_meters.map(|meters| meters / 1000.0),
        calories: remote.calories,
        heart_rate_avg: remote.heart_rate_avg,
        heart_rate_max: remote.heart_rate_max,
        heart_rate_min: remote.heart_rate_min,
        start_at,
        end_at,
        route_points: None,
    })
}
