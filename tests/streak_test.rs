// ABOUTME: Tests for the consecutive-day streak updater
// ABOUTME: Validates lazy creation, increments, best tracking, and the no-reset behavior
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use pulse_engine::models::{Streak, StreakType};
use pulse_engine::storage::StateStore;
use pulse_engine::streaks::StreakTracker;
use uuid::Uuid;

#[tokio::test]
async fn streaks_materialize_lazily_with_zero_values() {
    let store = common::memory_store();
    let user = Uuid::new_v4();

    let streak = store.streak(user, StreakType::Cardio).await.unwrap();
    assert_eq!(streak.current, 0);
    assert_eq!(streak.best, 0);
    assert!(streak.last_updated_at.is_none());
}

#[tokio::test]
async fn activity_today_increments_current_and_best() {
    let store = common::memory_store();
    let tracker = StreakTracker::new(Arc::clone(&store) as Arc<dyn StateStore>);
    let user = Uuid::new_v4();
    store
        .insert_activity(&common::manual_activity(user))
        .await
        .unwrap();

    let updated = tracker
        .record_cardio_activity(user)
        .await
        .unwrap()
        .expect("streak mutation");
    assert_eq!(updated.current, 1);
    assert_eq!(updated.best, 1);
    assert!(updated.last_updated_at.is_some());

    // a second write the same day increments again
    let updated = tracker
        .record_cardio_activity(user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.current, 2);
    assert_eq!(updated.best, 2);
}

#[tokio::test]
async fn no_activity_today_leaves_the_streak_untouched() {
    let store = common::memory_store();
    let tracker = StreakTracker::new(Arc::clone(&store) as Arc<dyn StateStore>);
    let user = Uuid::new_v4();

    let result = tracker.record_cardio_activity(user).await.unwrap();
    assert!(result.is_none());

    // nothing was persisted either
    let streak = store.streak(user, StreakType::Cardio).await.unwrap();
    assert_eq!(streak.current, 0);
    assert!(streak.last_updated_at.is_none());
}

#[tokio::test]
async fn best_is_preserved_when_current_is_below_it() {
    let store = common::memory_store();
    let tracker = StreakTracker::new(Arc::clone(&store) as Arc<dyn StateStore>);
    let user = Uuid::new_v4();

    let mut seeded = Streak::fresh(user, StreakType::Cardio);
    seeded.current = 2;
    seeded.best = 9;
    store.upsert_streak(&seeded).await.unwrap();

    store
        .insert_activity(&common::manual_activity(user))
        .await
        .unwrap();
    let updated = tracker
        .record_cardio_activity(user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.current, 3);
    assert_eq!(updated.best, 9);
}

#[tokio::test]
async fn streak_types_are_tracked_independently() {
    let store = common::memory_store();
    let tracker = StreakTracker::new(Arc::clone(&store) as Arc<dyn StateStore>);
    let user = Uuid::new_v4();
    store
        .insert_activity(&common::manual_activity(user))
        .await
        .unwrap();
    tracker.record_cardio_activity(user).await.unwrap();

    let workout = store.streak(user, StreakType::Workout).await.unwrap();
    assert_eq!(workout.current, 0);
    let calorie = store.streak(user, StreakType::CalorieGoal).await.unwrap();
    assert_eq!(calorie.current, 0);
}
