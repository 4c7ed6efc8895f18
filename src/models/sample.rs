// ABOUTME: Heart rate sample model produced by the telemetry client
// ABOUTME: Tags every sample with its real-device or simulated origin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a sample came from a real device or the fallback generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    /// Decoded from a device notification
    Real,
    /// Produced by the simulated generator
    Simulated,
}

/// One heart rate reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// When the reading was produced
    pub timestamp: DateTime<Utc>,
    /// Beats per minute
    pub bpm: u16,
    /// Reading origin
    pub source: SampleSource,
}

impl HeartRateSample {
    /// Sample decoded from a device notification, stamped now
    #[must_use]
    pub fn real(bpm: u16) -> Self {
        Self {
            timestamp: Utc::now(),
            bpm,
            source: SampleSource::Real,
        }
    }

    /// Sample produced by the simulator, stamped now
    #[must_use]
    pub fn simulated(bpm: u16) -> Self {
        Self {
            timestamp: Utc::now(),
            bpm,
            source: SampleSource::Simulated,
        }
    }
}
