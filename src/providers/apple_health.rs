// ABOUTME: Apple Health push-batch normalization (token-less platform)
// ABOUTME: Validates collector-supplied workouts and maps them into canonical records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Apple Health Ingestion
//!
//! Apple Health has no server-side API: a device-side collector reads
//! HealthKit and pushes already-flattened workout batches. Each record is
//! validated and mapped through the HealthKit taxonomy table here; a record
//! that cannot be validated is logged and dropped, never the whole batch.

use chrono::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::models::{ActivityKind, ActivityOrigin, CardioActivity, PushedActivity};

/// Validate and map one pushed workout into a canonical activity
///
/// Returns `None` for records without a usable start time or with a
/// nonpositive duration; the gateway accounts for those as skipped.
#[must_use]
pub fn normalize(user_id: Uuid, pushed: &PushedActivity) -> Option<CardioActivity> {
    let Some(start_at) = pushed.start_time else {
        warn!("skipping pushed workout without a start time");
        return None;
    };

    let duration_seconds = pushed.duration_seconds.or_else(|| {
        pushed
            .end_time
            .and_then(|end| u64::try_from((end - start_at).num_seconds()).ok())
    });
    let Some(duration_seconds) = duration_seconds.filter(|&secs| secs > 0) else {
        warn!("skipping pushed workout without a positive duration");
        return None;
    };

    let end_at = pushed.end_time.unwrap_or_else(|| {
        start_at + Duration::seconds(i64::try_from(duration_seconds).unwrap_or(0))
    });

    Some(CardioActivity {
        id: Uuid::new_v4(),
        user_id,
        kind: ActivityKind::from_apple_health(&pushed.external_type),
        origin: ActivityOrigin::AppleHealth,
        external_id: pushed.external_id.clone(),
        title: None,
        duration_seconds,
        distance_km: pushed.distance_km,
        calories: pushed.calories,
        heart_rate_avg: pushed.heart_rate_avg,
        heart_rate_max: pushed.heart_rate_max,
        heart_rate_min: pushed.heart_rate_min,
        start_at,
        end_at,
        route_points: None,
    })
}
