// ABOUTME: Actor runtime wrapping a session controller in a single-consumer task
// ABOUTME: Funnels user events, telemetry samples, and timer ticks through one channel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Session Runtime
//!
//! One tokio task per live session owns the controller. User actions and
//! telemetry samples arrive on the same mpsc channel and a one-second
//! interval drives ticks, so a "skip rest" click racing an inbound BLE
//! sample serializes through the single consumer; their relative order is
//! not deterministic and does not need to be.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use uuid::Uuid;

use super::controller::SessionController;
use crate::models::HeartRateSample;
use crate::storage::StateStore;
use crate::telemetry::HeartRateMonitor;

/// Events consumed by the session task
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The user completed a set of the given exercise
    StartSet {
        /// Exercise the set belongs to
        exercise_id: Uuid,
    },
    /// The user skipped the rest countdown
    SkipRest,
    /// A telemetry sample arrived
    Sample(HeartRateSample),
    /// The user exited the session
    Close,
}

/// Handle to a running session task
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Record a completed set; returns whether the session was still running
    pub async fn start_set(&self, exercise_id: Uuid) -> bool {
        self.send(SessionEvent::StartSet { exercise_id }).await
    }

    /// Skip the current rest countdown
    pub async fn skip_rest(&self) -> bool {
        self.send(SessionEvent::SkipRest).await
    }

    /// Feed a telemetry sample directly (bypassing a monitor subscription)
    pub async fn record_sample(&self, sample: HeartRateSample) -> bool {
        self.send(SessionEvent::Sample(sample)).await
    }

    /// Ask the session to close
    pub async fn close(&self) -> bool {
        self.send(SessionEvent::Close).await
    }

    /// Wait for the session task to finish and persist its outcome
    pub async fn finished(self) {
        let Self { events, task } = self;
        drop(events);
        if task.await.is_err() {
            error!("session task terminated abnormally");
        }
    }

    async fn send(&self, event: SessionEvent) -> bool {
        self.events.send(event).await.is_ok()
    }
}

/// Spawn the actor task owning a session controller
///
/// When a monitor is supplied its samples are bridged into the event
/// channel; a full channel drops the sample, which is acceptable because
/// the display only needs the latest value. On finalization or close the
/// summary, if any, is handed to the persistence collaborator and the
/// session state is discarded.
pub fn spawn_session(
    user_id: Uuid,
    controller: SessionController,
    store: Arc<dyn StateStore>,
    monitor: Option<HeartRateMonitor>,
) -> SessionHandle {
    let (events, mut inbox) = mpsc::channel::<SessionEvent>(64);

    let listener = monitor.as_ref().map(|m| {
        let sample_events = events.clone();
        m.subscribe(move |sample| {
            let _ = sample_events.try_send(SessionEvent::Sample(sample));
        })
    });

    let task = tokio::spawn(async move {
        let mut controller = controller;
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick of a tokio interval completes immediately
        interval.tick().await;

        let summary = loop {
            tokio::select! {
                event = inbox.recv() => match event {
                    Some(SessionEvent::StartSet { exercise_id }) => {
                        controller.start_set(exercise_id);
                    }
                    Some(SessionEvent::SkipRest) => {
                        controller.skip_rest();
                    }
                    Some(SessionEvent::Sample(sample)) => controller.record_sample(sample),
                    Some(SessionEvent::Close) | None => break controller.close(),
                },
                _ = interval.tick() => {
                    if let Some(summary) = controller.tick() {
                        break Some(summary);
                    }
                }
            }
        };

        if let (Some(monitor), Some(listener)) = (monitor.as_ref(), listener) {
            monitor.unsubscribe(listener);
        }

        if let Some(summary) = summary {
            match store.insert_workout(user_id, &summary).await {
                Ok(()) => info!(
                    "persisted workout \"{}\" ({} s, {} samples)",
                    summary.title,
                    summary.duration_seconds,
                    summary.heart_rate_samples.len()
                ),
                Err(e) => error!("failed to persist finalized workout: {e}"),
            }
        }
    });

    SessionHandle { events, task }
}
