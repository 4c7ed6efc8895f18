// ABOUTME: Simulated heart rate generator used when no real device is connected
// ABOUTME: Bounded random walk in [90, 185] bpm with per-tick calorie accrual
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;

use super::monitor::MonitorInner;
use crate::constants::simulator::{KCAL_PER_TICK, MAX_BPM, MAX_STEP, MIN_BPM};
use crate::models::HeartRateSample;

/// Spawn the generator task producing one sample per `period`
///
/// Each tick moves the bpm by at most `MAX_STEP` from the previous value,
/// clamped to `[MIN_BPM, MAX_BPM]`, and accrues a flat calorie amount so
/// the session still gets a usable energy estimate without a device.
pub(crate) fn spawn(inner: Arc<MonitorInner>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        let mut bpm: i32 = rng.gen_range(95..=115);
        let millical_per_tick = (KCAL_PER_TICK * 1000.0) as u64;

        let mut interval = tokio::time::interval(period);
        // the first tick of a tokio interval completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let step = rng.gen_range(-MAX_STEP..=MAX_STEP);
            bpm = (bpm + step).clamp(i32::from(MIN_BPM), i32::from(MAX_BPM));
            inner.accrue_calories(millical_per_tick);
            let reading = u16::try_from(bpm).unwrap_or(MIN_BPM);
            inner.broadcast(HeartRateSample::simulated(reading));
        }
    })
}
