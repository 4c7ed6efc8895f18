// ABOUTME: Consecutive-day engagement streak model
// ABOUTME: One row per (user, streak type) with current and best-ever counters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which engagement dimension a streak counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakType {
    /// Completed strength workouts
    Workout,
    /// Cardio activities of any origin
    Cardio,
    /// Daily calorie goals met
    CalorieGoal,
}

/// Per-user streak counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Streak {
    /// Owning user
    pub user_id: Uuid,
    /// Counted dimension
    pub kind: StreakType,
    /// Current run length
    pub current: u32,
    /// Best run length ever recorded
    pub best: u32,
    /// Last mutation time
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl Streak {
    /// Zeroed streak, materialized lazily on first read
    #[must_use]
    pub const fn fresh(user_id: Uuid, kind: StreakType) -> Self {
        Self {
            user_id,
            kind,
            current: 0,
            best: 0,
            last_updated_at: None,
        }
    }
}
