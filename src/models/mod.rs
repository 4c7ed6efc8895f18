// ABOUTME: Core data models for the live activity and sync engine
// ABOUTME: Groups activity, integration, sample, streak, taxonomy, and workout types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Data Models
//!
//! Validated, explicitly typed records at every boundary: platforms and
//! activity origins are closed enums, and external payloads are normalized
//! into these types before anything touches persistence.

pub mod activity;
pub mod integration;
pub mod sample;
pub mod streak;
pub mod taxonomy;
pub mod workout;

pub use activity::{ActivityOrigin, CardioActivity, PushedActivity, RoutePoint};
pub use integration::{ExternalIntegration, Platform};
pub use sample::{HeartRateSample, SampleSource};
pub use streak::{Streak, StreakType};
pub use taxonomy::ActivityKind;
pub use workout::{ExerciseSummary, PrescribedExercise, WorkoutSummary};
