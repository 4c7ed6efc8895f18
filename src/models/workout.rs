// ABOUTME: Workout prescription input and the finalized session summary
// ABOUTME: Defines what enters a live session and what is handed to persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sample::HeartRateSample;

/// One exercise as prescribed by the workout template
///
/// Set counts arrive as strings because templates are user-edited; a value
/// that does not parse to a positive integer excludes the exercise from
/// progress tracking without failing the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescribedExercise {
    /// Exercise id from the template
    pub exercise_id: Uuid,
    /// Display name
    pub name: String,
    /// Prescribed set count, as stored in the template
    pub sets: String,
    /// Rest between sets in seconds, when the template specifies one
    pub rest_seconds: Option<u32>,
}

impl PrescribedExercise {
    /// Prescription with the default rest duration
    #[must_use]
    pub fn new(exercise_id: Uuid, name: impl Into<String>, sets: impl Into<String>) -> Self {
        Self {
            exercise_id,
            name: name.into(),
            sets: sets.into(),
            rest_seconds: None,
        }
    }

    /// Prescription with an explicit rest duration
    #[must_use]
    pub fn with_rest(
        exercise_id: Uuid,
        name: impl Into<String>,
        sets: impl Into<String>,
        rest_seconds: u32,
    ) -> Self {
        Self {
            exercise_id,
            name: name.into(),
            sets: sets.into(),
            rest_seconds: Some(rest_seconds),
        }
    }
}

/// Per-exercise outcome inside a finalized session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSummary {
    /// Exercise id from the template
    pub exercise_id: Uuid,
    /// Display name
    pub name: String,
    /// Sets the prescription asked for, zero when unparseable
    pub required_sets: u32,
    /// Sets actually completed
    pub completed_sets: u32,
}

/// The completed-session record handed to the persistence collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Session title
    pub title: String,
    /// Per-exercise outcomes in prescription order
    pub exercises: Vec<ExerciseSummary>,
    /// Wall-clock session length in seconds
    pub duration_seconds: u64,
    /// Estimated energy expenditure in kcal
    pub calories_estimate: f64,
    /// Every heart rate sample recorded during the session
    pub heart_rate_samples: Vec<HeartRateSample>,
}
