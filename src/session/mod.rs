// ABOUTME: Live workout session module: state machine plus actor runtime
// ABOUTME: Re-exports the controller, phases, events, and the session spawner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Live Workout Sessions
//!
//! [`controller::SessionController`] is a pure, tick-driven state machine:
//! no I/O, no clocks, no locks. [`runtime::spawn_session`] wraps one
//! controller in a tokio task that funnels user actions, telemetry samples,
//! and a one-second timer through a single consumer, so session state has
//! exactly one writer.

pub mod controller;
pub mod runtime;

pub use controller::{ExerciseProgress, SessionController, SessionPhase, SetOutcome};
pub use runtime::{spawn_session, SessionEvent, SessionHandle};
