// ABOUTME: Tests for the session actor runtime
// ABOUTME: Validates event funneling, auto-finalization, close semantics, and telemetry bridging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use pulse_engine::models::{HeartRateSample, PrescribedExercise};
use pulse_engine::session::{spawn_session, SessionController};
use pulse_engine::storage::memory::InMemoryStore;
use pulse_engine::storage::StateStore;
use pulse_engine::telemetry::HeartRateMonitor;
use uuid::Uuid;

fn single_set_session(exercise_id: Uuid) -> SessionController {
    SessionController::new(
        "Quick Session",
        vec![PrescribedExercise::new(exercise_id, "Press", "1")],
    )
}

async fn wait_for_workout(store: &InMemoryStore, user: Uuid) {
    for _ in 0..100 {
        if store.workout_count(user).await > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("workout was never persisted");
}

#[tokio::test(start_paused = true)]
async fn completed_sessions_auto_finalize_and_persist() {
    let store = common::memory_store();
    let user = Uuid::new_v4();
    let exercise = Uuid::new_v4();

    let handle = spawn_session(
        user,
        single_set_session(exercise),
        Arc::clone(&store) as Arc<dyn StateStore>,
        None,
    );

    assert!(handle.start_set(exercise).await);
    wait_for_workout(&store, user).await;

    let workouts = store.workouts_for(user).await;
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].title, "Quick Session");

    // the session is gone; further events are not deliverable
    handle.finished().await;
    assert_eq!(store.workout_count(user).await, 1);
}

#[tokio::test(start_paused = true)]
async fn closing_with_progress_persists_a_partial_summary() {
    let store = common::memory_store();
    let user = Uuid::new_v4();
    let exercise = Uuid::new_v4();
    let controller = SessionController::new(
        "Partial",
        vec![PrescribedExercise::new(exercise, "Squat", "5")],
    );

    let handle = spawn_session(
        user,
        controller,
        Arc::clone(&store) as Arc<dyn StateStore>,
        None,
    );
    assert!(handle.start_set(exercise).await);
    assert!(handle.close().await);
    handle.finished().await;

    let workouts = store.workouts_for(user).await;
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].exercises[0].completed_sets, 1);
    assert_eq!(workouts[0].exercises[0].required_sets, 5);
}

#[tokio::test(start_paused = true)]
async fn closing_without_progress_discards_the_session() {
    let store = common::memory_store();
    let user = Uuid::new_v4();

    let handle = spawn_session(
        user,
        single_set_session(Uuid::new_v4()),
        Arc::clone(&store) as Arc<dyn StateStore>,
        None,
    );
    assert!(handle.close().await);
    handle.finished().await;

    assert_eq!(store.workout_count(user).await, 0);
}

#[tokio::test(start_paused = true)]
async fn monitor_samples_are_bridged_into_the_session_record() {
    let store = common::memory_store();
    let user = Uuid::new_v4();
    let exercise = Uuid::new_v4();
    let monitor = HeartRateMonitor::new();

    let handle = spawn_session(
        user,
        single_set_session(exercise),
        Arc::clone(&store) as Arc<dyn StateStore>,
        Some(monitor.clone()),
    );

    monitor.publish(HeartRateSample::real(132));
    monitor.publish(HeartRateSample::real(137));
    // give the actor a turn to drain its inbox before completing the set
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(handle.start_set(exercise).await);
    wait_for_workout(&store, user).await;

    let workouts = store.workouts_for(user).await;
    assert_eq!(workouts[0].heart_rate_samples.len(), 2);
    assert_eq!(workouts[0].heart_rate_samples[0].bpm, 132);
}

#[tokio::test(start_paused = true)]
async fn direct_samples_reach_the_controller_without_a_monitor() {
    let store = common::memory_store();
    let user = Uuid::new_v4();
    let exercise = Uuid::new_v4();

    let handle = spawn_session(
        user,
        single_set_session(exercise),
        Arc::clone(&store) as Arc<dyn StateStore>,
        None,
    );

    assert!(handle.record_sample(HeartRateSample::simulated(118)).await);
    assert!(handle.start_set(exercise).await);
    wait_for_workout(&store, user).await;

    let workouts = store.workouts_for(user).await;
    assert_eq!(workouts[0].heart_rate_samples.len(), 1);
}
