// ABOUTME: Consecutive-day streak updates triggered after cardio activity writes
// ABOUTME: Increments current/best counters when the user has activity today
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Streak Updater
//!
//! Invoked synchronously after any cardio activity write: manual entry, a
//! finished GPS session, or a sync import. A day without activity leaves
//! the counter unchanged; there is no reset-on-gap rule.

use std::sync::Arc;

use chrono::{Duration, NaiveTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::errors::EngineResult;
use crate::models::{Streak, StreakType};
use crate::storage::StateStore;

/// Derived-state trigger for cardio streaks
#[derive(Clone)]
pub struct StreakTracker {
    store: Arc<dyn StateStore>,
}

impl StreakTracker {
    /// Tracker over the given store
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Update the cardio streak after an activity write
    ///
    /// When the user has at least one cardio activity starting within the
    /// current calendar day, the current counter is incremented and the
    /// best-ever value raised to match if needed. Otherwise nothing is
    /// mutated, and `None` is returned.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn record_cardio_activity(&self, user_id: Uuid) -> EngineResult<Option<Streak>> {
        let now = Utc::now();
        let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        let today = self
            .store
            .activities_started_between(user_id, day_start, day_end)
            .await?;
        if today.is_empty() {
            debug!("no cardio activity today for user {user_id}, streak unchanged");
            return Ok(None);
        }

        let mut streak = self.store.streak(user_id, StreakType::Cardio).await?;
        streak.current += 1;
        streak.best = streak.best.max(streak.current);
        streak.last_updated_at = Some(now);
        self.store.upsert_streak(&streak).await?;
        Ok(Some(streak))
    }
}
