// ABOUTME: Tests for the canonical activity taxonomy mapping tables
// ABOUTME: Validates per-platform lookups and the documented fallback category
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use pulse_engine::models::{ActivityKind, Platform};
use pulse_engine::providers::{canonical_kind, RemoteActivityType};

#[test]
fn strava_core_types_map_to_their_canonical_categories() {
    assert_eq!(ActivityKind::from_strava("Run"), ActivityKind::Run);
    assert_eq!(ActivityKind::from_strava("Ride"), ActivityKind::Ride);
    assert_eq!(ActivityKind::from_strava("Swim"), ActivityKind::Swim);
    assert_eq!(ActivityKind::from_strava("Walk"), ActivityKind::Walk);
    assert_eq!(ActivityKind::from_strava("Hike"), ActivityKind::Hike);
    assert_eq!(ActivityKind::from_strava("Rowing"), ActivityKind::Rowing);
}

#[test]
fn strava_variants_collapse_into_the_same_category() {
    assert_eq!(ActivityKind::from_strava("VirtualRun"), ActivityKind::Run);
    assert_eq!(ActivityKind::from_strava("TrailRun"), ActivityKind::Run);
    assert_eq!(ActivityKind::from_strava("VirtualRide"), ActivityKind::Ride);
    assert_eq!(ActivityKind::from_strava("EBikeRide"), ActivityKind::Ride);
    assert_eq!(ActivityKind::from_strava("GravelRide"), ActivityKind::Ride);
}

#[test]
fn unrecognized_strava_type_falls_back_without_failing() {
    assert_eq!(ActivityKind::from_strava("Kitesurf"), ActivityKind::FALLBACK);
    assert_eq!(ActivityKind::from_strava(""), ActivityKind::FALLBACK);
}

#[test]
fn google_fit_codes_map_to_their_canonical_categories() {
    assert_eq!(ActivityKind::from_google_fit(8), ActivityKind::Run);
    assert_eq!(ActivityKind::from_google_fit(1), ActivityKind::Ride);
    assert_eq!(ActivityKind::from_google_fit(82), ActivityKind::Swim);
    assert_eq!(ActivityKind::from_google_fit(7), ActivityKind::Walk);
    assert_eq!(ActivityKind::from_google_fit(35), ActivityKind::Hike);
    assert_eq!(ActivityKind::from_google_fit(53), ActivityKind::Rowing);
    assert_eq!(ActivityKind::from_google_fit(25), ActivityKind::Elliptical);
    assert_eq!(
        ActivityKind::from_google_fit(77),
        ActivityKind::StairClimbing
    );
    assert_eq!(ActivityKind::from_google_fit(9999), ActivityKind::FALLBACK);
}

#[test]
fn apple_health_types_map_case_insensitively() {
    assert_eq!(ActivityKind::from_apple_health("running"), ActivityKind::Run);
    assert_eq!(ActivityKind::from_apple_health("Running"), ActivityKind::Run);
    assert_eq!(ActivityKind::from_apple_health("cycling"), ActivityKind::Ride);
    assert_eq!(
        ActivityKind::from_apple_health("StairClimbing"),
        ActivityKind::StairClimbing
    );
    assert_eq!(
        ActivityKind::from_apple_health("mindfulness"),
        ActivityKind::FALLBACK
    );
}

#[test]
fn canonical_kind_dispatches_to_the_platform_table() {
    assert_eq!(
        canonical_kind(Platform::Strava, &RemoteActivityType::Named("Ride".into())),
        ActivityKind::Ride
    );
    assert_eq!(
        canonical_kind(Platform::GoogleFit, &RemoteActivityType::Coded(82)),
        ActivityKind::Swim
    );
    assert_eq!(
        canonical_kind(
            Platform::AppleHealth,
            &RemoteActivityType::Named("rowing".into())
        ),
        ActivityKind::Rowing
    );
}

#[test]
fn mismatched_type_representation_falls_back() {
    // a numeric code arriving for a string-typed platform is unmappable
    assert_eq!(
        canonical_kind(Platform::Strava, &RemoteActivityType::Coded(8)),
        ActivityKind::FALLBACK
    );
}

#[test]
fn display_names_are_stable() {
    assert_eq!(ActivityKind::Run.display_name(), "run");
    assert_eq!(ActivityKind::Ride.display_name(), "bike ride");
    assert_eq!(ActivityKind::StairClimbing.display_name(), "stair climb");
}
