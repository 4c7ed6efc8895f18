// ABOUTME: Persistence collaborator trait consumed by the engine
// ABOUTME: Abstracts integration, activity, workout, and streak storage behind async methods
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Storage Abstraction
//!
//! The engine never talks to a database directly. Everything it persists
//! goes through [`StateStore`], implemented by the application's storage
//! layer. [`memory::InMemoryStore`] is the reference implementation used by
//! tests and lightweight embedders.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::EngineResult;
use crate::models::{
    CardioActivity, ExternalIntegration, Platform, Streak, StreakType, WorkoutSummary,
};

/// Async persistence operations the engine depends on
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Create or overwrite the integration row for `(user, platform)`
    async fn upsert_integration(&self, integration: &ExternalIntegration) -> EngineResult<()>;

    /// Fetch the integration row for `(user, platform)`
    async fn integration(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> EngineResult<Option<ExternalIntegration>>;

    /// Delete the integration row; returns whether a row existed
    async fn delete_integration(&self, user_id: Uuid, platform: Platform) -> EngineResult<bool>;

    /// Insert a new canonical activity record
    async fn insert_activity(&self, activity: &CardioActivity) -> EngineResult<()>;

    /// Overwrite an existing activity record, matched by id
    async fn update_activity(&self, activity: &CardioActivity) -> EngineResult<()>;

    /// Look up an imported activity by its reconciliation key
    async fn activity_by_external_id(
        &self,
        user_id: Uuid,
        platform: Platform,
        external_id: &str,
    ) -> EngineResult<Option<CardioActivity>>;

    /// All of a user's activities with `start_at` in `[start, end)`
    async fn activities_started_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Vec<CardioActivity>>;

    /// Persist a finalized workout session
    async fn insert_workout(&self, user_id: Uuid, summary: &WorkoutSummary) -> EngineResult<()>;

    /// The user's streak of the given kind, zeroed if never written
    async fn streak(&self, user_id: Uuid, kind: StreakType) -> EngineResult<Streak>;

    /// Create or overwrite a streak row
    async fn upsert_streak(&self, streak: &Streak) -> EngineResult<()>;
}
