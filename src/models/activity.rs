// ABOUTME: Canonical cardio activity record and push-batch input types
// ABOUTME: Defines CardioActivity, its origin tagging, route points, and PushedActivity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::integration::Platform;
use super::taxonomy::ActivityKind;

/// Where a canonical activity record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityOrigin {
    /// Entered by hand in the app
    Manual,
    /// Recorded by the app's own GPS tracker
    GpsInternal,
    /// Imported from Strava
    Strava,
    /// Pushed from the Apple Health collector
    AppleHealth,
    /// Imported from Google Fit
    GoogleFit,
}

impl From<Platform> for ActivityOrigin {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Strava => Self::Strava,
            Platform::AppleHealth => Self::AppleHealth,
            Platform::GoogleFit => Self::GoogleFit,
        }
    }
}

/// One recorded GPS position inside an activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// When the position was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Canonical, persisted cardio activity
///
/// For externally imported records, `(user_id, origin platform,
/// external_id)` identifies at most one row and drives reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardioActivity {
    /// Record id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Canonical activity category
    pub kind: ActivityKind,
    /// Source of the record
    pub origin: ActivityOrigin,
    /// Platform-specific identifier, absent for local records
    pub external_id: Option<String>,
    /// Display title carried over from the source when it provides one
    pub title: Option<String>,
    /// Total duration in seconds
    pub duration_seconds: u64,
    /// Distance covered in kilometers
    pub distance_km: Option<f64>,
    /// Energy expended in kcal
    pub calories: Option<f64>,
    /// Average heart rate in bpm
    pub heart_rate_avg: Option<u16>,
    /// Maximum heart rate in bpm
    pub heart_rate_max: Option<u16>,
    /// Minimum heart rate in bpm
    pub heart_rate_min: Option<u16>,
    /// Start of the activity
    pub start_at: DateTime<Utc>,
    /// End of the activity
    pub end_at: DateTime<Utc>,
    /// Recorded GPS track, present only for GPS-origin records
    pub route_points: Option<Vec<RoutePoint>>,
}

/// One element of a caller-supplied push batch
///
/// Device-side collectors for push platforms deliver activities already
/// flattened to this shape; the gateway validates and maps them through the
/// platform's taxonomy table before anything is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushedActivity {
    /// Platform-native activity type string
    pub external_type: String,
    /// Platform-specific identifier, when the collector has one
    pub external_id: Option<String>,
    /// Start of the activity
    pub start_time: Option<DateTime<Utc>>,
    /// End of the activity
    pub end_time: Option<DateTime<Utc>>,
    /// Total duration in seconds, when the collector reports it directly
    pub duration_seconds: Option<u64>,
    /// Distance covered in kilometers
    pub distance_km: Option<f64>,
    /// Energy expended in kcal
    pub calories: Option<f64>,
    /// Average heart rate in bpm
    pub heart_rate_avg: Option<u16>,
    /// Maximum heart rate in bpm
    pub heart_rate_max: Option<u16>,
    /// Minimum heart rate in bpm
    pub heart_rate_min: Option<u16>,
}
