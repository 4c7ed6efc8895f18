// ABOUTME: Shared test utilities for pulse_engine integration tests
// ABOUTME: Provides quiet logging, a programmable fake provider, and gateway builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

//! Shared test setup for `pulse_engine`

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use pulse_engine::config::EngineConfig;
use pulse_engine::errors::{EngineError, EngineResult};
use pulse_engine::models::{ExternalIntegration, Platform, PushedActivity};
use pulse_engine::providers::{
    ProviderRegistry, RemoteActivity, RemoteActivityType, SyncProvider, TokenExchange,
};
use pulse_engine::storage::memory::InMemoryStore;
use pulse_engine::sync::SyncGateway;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory store
pub fn memory_store() -> Arc<InMemoryStore> {
    init_test_logging();
    Arc::new(InMemoryStore::new())
}

/// Programmable platform client standing in for a real provider
pub struct FakeProvider {
    pub platform: Platform,
    pub activities: Mutex<Vec<RemoteActivity>>,
    pub exchange_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub revoke_calls: AtomicUsize,
    pub fail_refresh: AtomicBool,
    pub fail_revoke: AtomicBool,
    pub fetch_failures_remaining: AtomicUsize,
    pub fetch_delay_ms: u64,
    pub overlap_detected: AtomicBool,
    in_flight: AtomicUsize,
    call_log: Mutex<Vec<&'static str>>,
}

impl FakeProvider {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            activities: Mutex::new(Vec::new()),
            exchange_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            revoke_calls: AtomicUsize::new(0),
            fail_refresh: AtomicBool::new(false),
            fail_revoke: AtomicBool::new(false),
            fetch_failures_remaining: AtomicUsize::new(0),
            fetch_delay_ms: 0,
            overlap_detected: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_activities(platform: Platform, activities: Vec<RemoteActivity>) -> Self {
        let provider = Self::new(platform);
        *provider.activities.lock().unwrap() = activities;
        provider
    }

    /// Ordered names of the provider calls made so far
    pub fn call_log(&self) -> Vec<&'static str> {
        self.call_log.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.call_log.lock().unwrap().push(call);
    }

    fn token(&self, label: &str) -> TokenExchange {
        TokenExchange {
            access_token: format!("{label}-access"),
            refresh_token: format!("{label}-refresh"),
            expires_at: Utc::now() + Duration::hours(6),
            scopes: Some("read".into()),
        }
    }
}

#[async_trait]
impl SyncProvider for FakeProvider {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> EngineResult<String> {
        Ok(format!(
            "https://auth.example.com/authorize?redirect_uri={redirect_uri}&state={state}"
        ))
    }

    async fn exchange_code(&self, code: &str) -> EngineResult<TokenExchange> {
        self.record("exchange");
        let count = self.exchange_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if code == "bad-code" {
            return Err(EngineError::auth(
                self.platform,
                "{\"message\":\"Bad Request\",\"errors\":[{\"code\":\"invalid\"}]}",
            ));
        }
        Ok(self.token(&format!("exchange-{count}")))
    }

    async fn refresh_token(&self, _refresh_token: &str) -> EngineResult<TokenExchange> {
        self.record("refresh");
        let count = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(EngineError::auth(self.platform, "refresh rejected"));
        }
        Ok(self.token(&format!("refresh-{count}")))
    }

    async fn revoke_token(&self, _access_token: &str) -> EngineResult<()> {
        self.record("revoke");
        self.revoke_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_revoke.load(Ordering::SeqCst) {
            return Err(EngineError::sync_failure(self.platform, 503, "revoke down"));
        }
        Ok(())
    }

    async fn fetch_activities(
        &self,
        _access_token: &str,
        _since: DateTime<Utc>,
    ) -> EngineResult<Vec<RemoteActivity>> {
        self.record("fetch");
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlap_detected.store(true, Ordering::SeqCst);
        }
        if self.fetch_delay_ms > 0 {
            tokio::time::sleep(StdDuration::from_millis(self.fetch_delay_ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self
            .fetch_failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
        {
            return Err(EngineError::sync_failure(self.platform, 502, "remote down"));
        }

        Ok(self.activities.lock().unwrap().clone())
    }
}

/// Gateway over a fresh memory store and the given provider, with a fast
/// retry policy so backoff tests stay quick
pub fn gateway_with(store: Arc<InMemoryStore>, provider: Arc<FakeProvider>) -> SyncGateway {
    let mut registry = ProviderRegistry::new();
    registry.register(provider);
    let mut config = EngineConfig::default();
    config.retry.base_delay_ms = 1;
    SyncGateway::new(store, registry, &config)
}

/// Remote running activity with a recent start, valid for import
pub fn remote_run(external_id: &str) -> RemoteActivity {
    let start = Utc::now() - Duration::minutes(30);
    RemoteActivity {
        external_id: Some(external_id.to_owned()),
        activity_type: RemoteActivityType::Named("Run".into()),
        title: Some("Morning Run".into()),
        start_at: Some(start),
        end_at: Some(start + Duration::minutes(25)),
        duration_seconds: Some(1500),
        distance_meters: Some(5000.0),
        calories: Some(320.0),
        heart_rate_avg: Some(152),
        heart_rate_max: Some(181),
        heart_rate_min: Some(97),
    }
}

/// Remote activity of a named type
pub fn remote_typed(external_id: &str, activity_type: &str) -> RemoteActivity {
    let mut activity = remote_run(external_id);
    activity.activity_type = RemoteActivityType::Named(activity_type.to_owned());
    activity
}

/// Valid pushed workout for push-platform tests
pub fn pushed_workout(external_id: &str) -> PushedActivity {
    let start = Utc::now() - Duration::minutes(45);
    PushedActivity {
        external_type: "running".into(),
        external_id: Some(external_id.to_owned()),
        start_time: Some(start),
        end_time: Some(start + Duration::minutes(40)),
        duration_seconds: Some(2400),
        distance_km: Some(7.2),
        calories: Some(410.0),
        heart_rate_avg: Some(149),
        heart_rate_max: Some(176),
        heart_rate_min: Some(92),
    }
}

/// Manually entered cardio activity starting within the current day
pub fn manual_activity(user_id: Uuid) -> pulse_engine::models::CardioActivity {
    let start = Utc::now() - Duration::minutes(20);
    pulse_engine::models::CardioActivity {
        id: Uuid::new_v4(),
        user_id,
        kind: pulse_engine::models::ActivityKind::Run,
        origin: pulse_engine::models::ActivityOrigin::Manual,
        external_id: None,
        title: Some("Treadmill Run".into()),
        duration_seconds: 1200,
        distance_km: Some(3.5),
        calories: Some(210.0),
        heart_rate_avg: Some(141),
        heart_rate_max: Some(168),
        heart_rate_min: Some(101),
        start_at: start,
        end_at: start + Duration::minutes(20),
        route_points: None,
    }
}

/// Integration row with an already-expired access token
pub fn expired_integration(user_id: Uuid, platform: Platform) -> ExternalIntegration {
    ExternalIntegration::oauth(
        user_id,
        platform,
        "stale-access".into(),
        "stale-refresh".into(),
        Utc::now() - Duration::hours(1),
    )
}
