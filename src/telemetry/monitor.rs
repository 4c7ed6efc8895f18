// ABOUTME: Heart rate monitor owning device lifecycle, listener fan-out, and fallback
// ABOUTME: Broadcasts decoded or simulated samples to listeners in registration order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Heart Rate Monitor
//!
//! Capability-polymorphic telemetry client: samples come either from a real
//! measurement source (any [`MeasurementSource`], the `ble` feature
//! provides one) or from the simulated generator. Listeners are broadcast
//! to in registration order against a snapshot, so removing a listener
//! mid-broadcast never affects the broadcast already in flight. The first
//! real sample stops a running simulator; a source that ends falls back to
//! simulation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::decoder::decode_heart_rate;
use super::simulator;
use crate::constants::physiology::MAX_NORMAL_HR;
use crate::models::{HeartRateSample, SampleSource};

/// Callback invoked with every broadcast sample
pub type SampleListener = Arc<dyn Fn(HeartRateSample) + Send + Sync>;

/// Handle for removing a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// An async stream of raw Heart Rate Measurement frames
///
/// Implemented by the BLE transport; tests drive the monitor with channel
/// or vector backed sources.
#[async_trait]
pub trait MeasurementSource: Send + 'static {
    /// Next raw frame, or `None` when the transport has ended
    async fn next_frame(&mut self) -> Option<Vec<u8>>;
}

/// Telemetry client for one session
///
/// Cheap to clone; clones share the same listener set and tasks.
#[derive(Clone)]
pub struct HeartRateMonitor {
    inner: Arc<MonitorInner>,
}

pub(crate) struct MonitorInner {
    listeners: Mutex<Vec<(ListenerId, SampleListener)>>,
    next_listener_id: AtomicU64,
    /// Simulated energy accrued so far, in thousandths of a kcal
    sim_millical: AtomicU64,
    sim_period: Mutex<Duration>,
    tasks: Mutex<Tasks>,
}

#[derive(Default)]
struct Tasks {
    simulator: Option<JoinHandle<()>>,
    device: Option<JoinHandle<()>>,
}

/// Listener callbacks run outside this lock and cannot poison it; recover
/// the guard rather than unwinding the whole monitor.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for HeartRateMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartRateMonitor {
    /// Monitor with no source attached and no listeners
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                sim_millical: AtomicU64::new(0),
                sim_period: Mutex::new(Duration::from_secs(1)),
                tasks: Mutex::new(Tasks::default()),
            }),
        }
    }

    /// Register a listener; listeners receive samples in registration order
    pub fn subscribe(
        &self,
        listener: impl Fn(HeartRateSample) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered. Removal during
    /// a broadcast does not affect that broadcast.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.inner.listeners);
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    /// Broadcast a sample to every current listener
    pub fn publish(&self, sample: HeartRateSample) {
        self.inner.broadcast(sample);
    }

    /// Start the fallback generator at the standard one-second cadence
    pub fn start_simulation(&self) {
        self.start_simulation_with_period(Duration::from_secs(1));
    }

    /// Start the fallback generator with an explicit tick period
    pub fn start_simulation_with_period(&self, period: Duration) {
        *lock(&self.inner.sim_period) = period;
        info!("starting simulated heart rate generator");
        MonitorInner::start_simulator(&self.inner);
    }

    /// Attach a real measurement source
    ///
    /// Each frame is decoded and broadcast tagged [`SampleSource::Real`].
    /// When the source ends the monitor logs and resumes simulation so the
    /// session keeps receiving samples.
    pub fn attach_source<S: MeasurementSource>(&self, mut source: S) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            while let Some(frame) = source.next_frame().await {
                let bpm = decode_heart_rate(&frame);
                if bpm == 0 || bpm > MAX_NORMAL_HR {
                    debug!("discarding out-of-range heart rate reading: {bpm}");
                    continue;
                }
                inner.broadcast(HeartRateSample::real(bpm));
            }
            warn!("heart rate source ended, resuming simulated samples");
            MonitorInner::start_simulator(&inner);
        });

        if let Some(previous) = lock(&self.inner.tasks).device.replace(handle) {
            previous.abort();
        }
    }

    /// Stop device and simulator tasks and clear all listeners
    ///
    /// Idempotent: disconnecting an already-disconnected monitor is a no-op.
    pub fn disconnect(&self) {
        {
            let mut tasks = lock(&self.inner.tasks);
            if let Some(simulator) = tasks.simulator.take() {
                simulator.abort();
            }
            if let Some(device) = tasks.device.take() {
                device.abort();
            }
        }
        lock(&self.inner.listeners).clear();
    }

    /// Whether the fallback generator is currently producing samples
    #[must_use]
    pub fn is_simulating(&self) -> bool {
        lock(&self.inner.tasks)
            .simulator
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Energy the simulator has accrued so far, in kcal
    #[must_use]
    pub fn estimated_calories(&self) -> f64 {
        self.inner.sim_millical.load(Ordering::Relaxed) as f64 / 1000.0
    }
}

impl MonitorInner {
    pub(crate) fn broadcast(&self, sample: HeartRateSample) {
        if sample.source == SampleSource::Real {
            self.stop_simulator();
        }
        let snapshot: Vec<SampleListener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(sample);
        }
    }

    pub(crate) fn accrue_calories(&self, millical: u64) {
        self.sim_millical.fetch_add(millical, Ordering::Relaxed);
    }

    fn stop_simulator(&self) {
        if let Some(simulator) = lock(&self.tasks).simulator.take() {
            simulator.abort();
            debug!("real samples arrived, simulated generator stopped");
        }
    }

    pub(crate) fn start_simulator(inner: &Arc<Self>) {
        let period = *lock(&inner.sim_period);
        let handle = simulator::spawn(Arc::clone(inner), period);
        if let Some(previous) = lock(&inner.tasks).simulator.replace(handle) {
            previous.abort();
        }
    }
}
