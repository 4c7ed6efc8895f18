// ABOUTME: Tests for the external sync gateway
// ABOUTME: Validates OAuth lifecycle, reconciliation idempotence, retries, and push import
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{expired_integration, gateway_with, memory_store, pushed_workout, remote_run, remote_typed, FakeProvider};
use pulse_engine::errors::EngineError;
use pulse_engine::models::{ActivityKind, Platform, PushedActivity, StreakType};
use pulse_engine::storage::StateStore;
use uuid::Uuid;

#[tokio::test]
async fn connect_exchanges_the_code_and_persists_an_active_integration() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(Arc::clone(&store), Arc::clone(&provider));
    let user = Uuid::new_v4();

    let integration = gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    assert!(integration.active);
    assert_eq!(integration.access_token.as_deref(), Some("exchange-1-access"));
    assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 1);

    let stored = store.integration(user, Platform::Strava).await.unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn connect_with_a_rejected_code_surfaces_the_remote_payload() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();

    let err = gateway
        .connect(user, Platform::Strava, "bad-code", None)
        .await
        .unwrap_err();
    match err {
        EngineError::Auth { platform, detail } => {
            assert_eq!(platform, Platform::Strava);
            assert!(detail.contains("Bad Request"));
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
    assert!(store
        .integration(user, Platform::Strava)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn reconnect_overwrites_tokens_in_place() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();

    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();
    let second = gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();
    assert_eq!(second.access_token.as_deref(), Some("exchange-2-access"));
}

#[tokio::test]
async fn sync_imports_everything_then_reruns_idempotently() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::with_activities(
        Platform::Strava,
        vec![remote_run("a-1"), remote_run("a-2"), remote_run("a-3")],
    ));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    let first = gateway.sync(user, Platform::Strava).await.unwrap();
    assert_eq!(first.imported, 3);
    assert_eq!(first.updated, 0);
    assert_eq!(first.skipped, 0);
    assert_eq!(first.total, 3);

    let second = gateway.sync(user, Platform::Strava).await.unwrap();
    assert_eq!(second.imported, 0);
    assert_eq!(second.updated, 3);
    assert_eq!(second.total, 3);

    // reconciliation keeps one row per external id
    assert_eq!(store.activities_for(user).await.len(), 3);
}

#[tokio::test]
async fn sync_updates_last_sync_at() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::with_activities(
        Platform::Strava,
        vec![remote_run("a-1")],
    ));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    gateway.sync(user, Platform::Strava).await.unwrap();
    let integration = store
        .integration(user, Platform::Strava)
        .await
        .unwrap()
        .unwrap();
    assert!(integration.last_sync_at.is_some());
}

#[tokio::test]
async fn expired_token_triggers_exactly_one_refresh_before_the_fetch() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::with_activities(
        Platform::Strava,
        vec![remote_run("a-1")],
    ));
    let gateway = gateway_with(Arc::clone(&store), Arc::clone(&provider));
    let user = Uuid::new_v4();
    store
        .upsert_integration(&expired_integration(user, Platform::Strava))
        .await
        .unwrap();

    gateway.sync(user, Platform::Strava).await.unwrap();

    assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.call_log(), vec!["refresh", "fetch"]);

    let integration = store
        .integration(user, Platform::Strava)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        integration.access_token.as_deref(),
        Some("refresh-1-access")
    );
}

#[tokio::test]
async fn valid_token_is_not_refreshed() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::with_activities(
        Platform::Strava,
        vec![remote_run("a-1")],
    ));
    let gateway = gateway_with(Arc::clone(&store), Arc::clone(&provider));
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    gateway.sync(user, Platform::Strava).await.unwrap();
    assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_refresh_surfaces_token_expired() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    provider.fail_refresh.store(true, Ordering::SeqCst);
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();
    store
        .upsert_integration(&expired_integration(user, Platform::Strava))
        .await
        .unwrap();

    let err = gateway.sync(user, Platform::Strava).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::TokenExpired {
            platform: Platform::Strava
        }
    ));
}

#[tokio::test]
async fn sync_without_an_integration_is_not_found() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(store, provider);

    let err = gateway
        .sync(Uuid::new_v4(), Platform::Strava)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn transient_fetch_failures_are_retried_with_backoff() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::with_activities(
        Platform::Strava,
        vec![remote_run("a-1")],
    ));
    provider.fetch_failures_remaining.store(2, Ordering::SeqCst);
    let gateway = gateway_with(Arc::clone(&store), Arc::clone(&provider));
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    let report = gateway.sync(user, Platform::Strava).await.unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn persistent_fetch_failure_stops_after_bounded_attempts() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    provider.fetch_failures_remaining.store(10, Ordering::SeqCst);
    let gateway = gateway_with(Arc::clone(&store), Arc::clone(&provider));
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    let err = gateway.sync(user, Platform::Strava).await.unwrap_err();
    assert!(matches!(err, EngineError::SyncFailure { status: 502, .. }));
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn malformed_remote_records_are_counted_as_skipped() {
    let store = memory_store();
    let mut missing_id = remote_run("ignored");
    missing_id.external_id = None;
    let mut missing_duration = remote_run("d-1");
    missing_duration.duration_seconds = None;
    let provider = Arc::new(FakeProvider::with_activities(
        Platform::Strava,
        vec![remote_run("ok-1"), missing_id, missing_duration],
    ));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    let report = gateway.sync(user, Platform::Strava).await.unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.total, 3);
}

#[tokio::test]
async fn unrecognized_activity_type_imports_under_the_fallback_category() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::with_activities(
        Platform::Strava,
        vec![remote_typed("k-1", "Kitesurf")],
    ));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    let report = gateway.sync(user, Platform::Strava).await.unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 0);

    let activities = store.activities_for(user).await;
    assert_eq!(activities[0].kind, ActivityKind::FALLBACK);
}

#[tokio::test]
async fn sync_import_updates_the_cardio_streak() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::with_activities(
        Platform::Strava,
        vec![remote_run("s-1")],
    ));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    gateway.sync(user, Platform::Strava).await.unwrap();
    let streak = store.streak(user, StreakType::Cardio).await.unwrap();
    assert!(streak.current >= 1);
    assert!(streak.best >= streak.current);
}

#[tokio::test]
async fn disconnect_deletes_locally_even_when_the_remote_revoke_fails() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    provider.fail_revoke.store(true, Ordering::SeqCst);
    let gateway = gateway_with(Arc::clone(&store), Arc::clone(&provider));
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    gateway.disconnect(user, Platform::Strava).await.unwrap();
    assert_eq!(provider.revoke_calls.load(Ordering::SeqCst), 1);
    assert!(store
        .integration(user, Platform::Strava)
        .await
        .unwrap()
        .is_none());

    // a second disconnect has nothing to delete
    let err = gateway.disconnect(user, Platform::Strava).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn push_import_validates_counts_and_marks_the_platform_seen() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();

    let mut invalid = pushed_workout("p-3");
    invalid.start_time = None;
    let batch = vec![pushed_workout("p-1"), pushed_workout("p-2"), invalid];

    let report = gateway
        .import_pushed(user, Platform::AppleHealth, &batch)
        .await
        .unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.total, 3);

    let integration = store
        .integration(user, Platform::AppleHealth)
        .await
        .unwrap()
        .expect("push platform marked as seen");
    assert!(integration.access_token.is_none());
    assert!(integration.last_sync_at.is_some());
}

#[tokio::test]
async fn repeated_pushes_create_new_records_without_dedup() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();
    let batch = vec![pushed_workout("same-id")];

    gateway
        .import_pushed(user, Platform::AppleHealth, &batch)
        .await
        .unwrap();
    gateway
        .import_pushed(user, Platform::AppleHealth, &batch)
        .await
        .unwrap();

    assert_eq!(store.activities_for(user).await.len(), 2);
}

#[tokio::test]
async fn push_import_rejects_pull_platforms() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(store, provider);

    let err = gateway
        .import_pushed(Uuid::new_v4(), Platform::Strava, &[] as &[PushedActivity])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedPlatform(_)));
}

#[tokio::test]
async fn authorization_state_is_single_use() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(store, provider);
    let user = Uuid::new_v4();

    let request = gateway
        .authorization_url(user, Platform::Strava, "https://app.example.com/callback")
        .await
        .unwrap();
    assert!(request.url.contains("state="));

    gateway
        .connect(user, Platform::Strava, "good-code", Some(&request.state))
        .await
        .unwrap();

    // the state was consumed by the first connect
    let err = gateway
        .connect(user, Platform::Strava, "good-code", Some(&request.state))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::PermissionDenied(_)));
}

#[tokio::test]
async fn unknown_authorization_state_is_rejected() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(store, provider);

    let err = gateway
        .connect(
            Uuid::new_v4(),
            Platform::Strava,
            "good-code",
            Some("forged-state"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::PermissionDenied(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_syncs_for_the_same_user_and_platform_are_serialized() {
    let store = memory_store();
    let mut provider = FakeProvider::with_activities(Platform::Strava, vec![remote_run("c-1")]);
    provider.fetch_delay_ms = 50;
    let provider = Arc::new(provider);

    let gateway = Arc::new(gateway_with(Arc::clone(&store), Arc::clone(&provider)));
    let user = Uuid::new_v4();
    gateway
        .connect(user, Platform::Strava, "good-code", None)
        .await
        .unwrap();

    let first = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move { gateway.sync(user, Platform::Strava).await }
    });
    let second = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move { gateway.sync(user, Platform::Strava).await }
    });

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert!(
        !provider.overlap_detected.load(Ordering::SeqCst),
        "two fetches for the same (user, platform) overlapped"
    );
    assert_eq!(store.activities_for(user).await.len(), 1);
}

#[tokio::test]
async fn record_local_activity_triggers_the_streak_updater() {
    let store = memory_store();
    let provider = Arc::new(FakeProvider::new(Platform::Strava));
    let gateway = gateway_with(Arc::clone(&store), provider);
    let user = Uuid::new_v4();

    gateway
        .record_local_activity(&common::manual_activity(user))
        .await
        .unwrap();
    let streak = store.streak(user, StreakType::Cardio).await.unwrap();
    assert_eq!(streak.current, 1);
}
