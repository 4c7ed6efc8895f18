// ABOUTME: Canonical activity taxonomy and per-platform type mapping tables
// ABOUTME: Maps Strava, Google Fit, and Apple Health native types into ActivityKind
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Canonical Activity Taxonomy
//!
//! The internal, platform-independent set of cardio categories. Each
//! platform ships its own lookup table; an unrecognized native type maps to
//! [`ActivityKind::FALLBACK`] instead of failing the batch it arrived in.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Canonical cardio activity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Running, outdoors or treadmill
    Run,
    /// Cycling of any flavor
    Ride,
    /// Swimming
    Swim,
    /// Walking
    Walk,
    /// Hiking
    Hike,
    /// Rowing, on water or machine
    Rowing,
    /// Elliptical trainer
    Elliptical,
    /// Stair climbing
    StairClimbing,
}

impl ActivityKind {
    /// Category assigned to native types no table recognizes
    pub const FALLBACK: Self = Self::Run;

    /// Map a Strava activity type string
    #[must_use]
    pub fn from_strava(raw: &str) -> Self {
        match raw {
            "Run" | "VirtualRun" | "TrailRun" => Self::Run,
            "Ride" | "VirtualRide" | "EBikeRide" | "MountainBikeRide" | "GravelRide" => Self::Ride,
            "Swim" => Self::Swim,
            "Walk" => Self::Walk,
            "Hike" => Self::Hike,
            "Rowing" => Self::Rowing,
            "Elliptical" => Self::Elliptical,
            "StairStepper" => Self::StairClimbing,
            other => {
                debug!("unmapped strava activity type {other:?}, using fallback");
                Self::FALLBACK
            }
        }
    }

    /// Map a Google Fit numeric activity type code
    #[must_use]
    pub fn from_google_fit(code: u32) -> Self {
        match code {
            8 => Self::Run,
            1 => Self::Ride,
            82 => Self::Swim,
            7 => Self::Walk,
            35 => Self::Hike,
            53 => Self::Rowing,
            25 => Self::Elliptical,
            77 => Self::StairClimbing,
            other => {
                debug!("unmapped google fit activity code {other}, using fallback");
                Self::FALLBACK
            }
        }
    }

    /// Map a HealthKit workout activity type string
    #[must_use]
    pub fn from_apple_health(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "running" => Self::Run,
            "cycling" => Self::Ride,
            "swimming" => Self::Swim,
            "walking" => Self::Walk,
            "hiking" => Self::Hike,
            "rowing" => Self::Rowing,
            "elliptical" => Self::Elliptical,
            "stairclimbing" | "stairs" => Self::StairClimbing,
            other => {
                debug!("unmapped healthkit workout type {other:?}, using fallback");
                Self::FALLBACK
            }
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Ride => "bike ride",
            Self::Swim => "swim",
            Self::Walk => "walk",
            Self::Hike => "hike",
            Self::Rowing => "rowing session",
            Self::Elliptical => "elliptical session",
            Self::StairClimbing => "stair climb",
        }
    }
}
