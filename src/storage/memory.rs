// ABOUTME: In-memory StateStore implementation for tests and embedders
// ABOUTME: Hash map tables behind async RwLocks, mirroring the relational layout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::StateStore;
use crate::errors::EngineResult;
use crate::models::{
    ActivityOrigin, CardioActivity, ExternalIntegration, Platform, Streak, StreakType,
    WorkoutSummary,
};

/// Reference store keeping everything in process memory
#[derive(Default)]
pub struct InMemoryStore {
    integrations: RwLock<HashMap<(Uuid, Platform), ExternalIntegration>>,
    activities: RwLock<HashMap<Uuid, CardioActivity>>,
    workouts: RwLock<Vec<(Uuid, WorkoutSummary)>>,
    streaks: RwLock<HashMap<(Uuid, StreakType), Streak>>,
}

impl InMemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored activities for a user, unordered
    pub async fn activities_for(&self, user_id: Uuid) -> Vec<CardioActivity> {
        self.activities
            .read()
            .await
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Number of finalized workouts stored for a user
    pub async fn workout_count(&self, user_id: Uuid) -> usize {
        self.workouts_for(user_id).await.len()
    }

    /// Finalized workouts stored for a user, in insertion order
    pub async fn workouts_for(&self, user_id: Uuid) -> Vec<WorkoutSummary> {
        self.workouts
            .read()
            .await
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, summary)| summary.clone())
            .collect()
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn upsert_integration(&self, integration: &ExternalIntegration) -> EngineResult<()> {
        self.integrations.write().await.insert(
            (integration.user_id, integration.platform),
            integration.clone(),
        );
        Ok(())
    }

    async fn integration(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> EngineResult<Option<ExternalIntegration>> {
        Ok(self
            .integrations
            .read()
            .await
            .get(&(user_id, platform))
            .cloned())
    }

    async fn delete_integration(&self, user_id: Uuid, platform: Platform) -> EngineResult<bool> {
        Ok(self
            .integrations
            .write()
            .await
            .remove(&(user_id, platform))
            .is_some())
    }

    async fn insert_activity(&self, activity: &CardioActivity) -> EngineResult<()> {
        self.activities
            .write()
            .await
            .insert(activity.id, activity.clone());
        Ok(())
    }

    async fn update_activity(&self, activity: &CardioActivity) -> EngineResult<()> {
        self.activities
            .write()
            .await
            .insert(activity.id, activity.clone());
        Ok(())
    }

    async fn activity_by_external_id(
        &self,
        user_id: Uuid,
        platform: Platform,
        external_id: &str,
    ) -> EngineResult<Option<CardioActivity>> {
        let origin = ActivityOrigin::from(platform);
        Ok(self
            .activities
            .read()
            .await
            .values()
            .find(|a| {
                a.user_id == user_id
                    && a.origin == origin
                    && a.external_id.as_deref() == Some(external_id)
            })
            .cloned())
    }

    async fn activities_started_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Vec<CardioActivity>> {
        Ok(self
            .activities
            .read()
            .await
            .values()
            .filter(|a| a.user_id == user_id && a.start_at >= start && a.start_at < end)
            .cloned()
            .collect())
    }

    async fn insert_workout(&self, user_id: Uuid, summary: &WorkoutSummary) -> EngineResult<()> {
        self.workouts.write().await.push((user_id, summary.clone()));
        Ok(())
    }

    async fn streak(&self, user_id: Uuid, kind: StreakType) -> EngineResult<Streak> {
        Ok(self
            .streaks
            .read()
            .await
            .get(&(user_id, kind))
            .cloned()
            .unwrap_or_else(|| Streak::fresh(user_id, kind)))
    }

    async fn upsert_streak(&self, streak: &Streak) -> EngineResult<()> {
        self.streaks
            .write()
            .await
            .insert((streak.user_id, streak.kind), streak.clone());
        Ok(())
    }
}
