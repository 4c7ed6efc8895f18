// ABOUTME: Main library entry point for the Pulse live activity engine
// ABOUTME: Exposes the session state machine, heart rate telemetry, and platform sync modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

#![deny(unsafe_code)]

//! # Pulse Engine
//!
//! The live activity engine behind the Pulse fitness app: the in-progress
//! workout state machine, the Bluetooth LE heart rate telemetry client, and
//! the external fitness platform synchronization gateway.
//!
//! ## Features
//!
//! - **Session controller**: set/rest progression, rest countdowns, and
//!   auto-completion driven by a single-consumer event loop
//! - **Heart rate telemetry**: BLE Heart Rate Measurement decoding with a
//!   simulated fallback generator when no device is available
//! - **Platform sync**: OAuth token lifecycle, activity-type taxonomy
//!   mapping, and idempotent reconciliation for Strava, Google Fit, and
//!   Apple Health
//! - **Streaks**: consecutive-day engagement counters updated after every
//!   cardio activity write
//!
//! ## Architecture
//!
//! The engine is persistence-agnostic: everything it stores goes through the
//! [`storage::StateStore`] trait, and the caller supplies the authenticated
//! user id on every call. An in-memory store is provided for tests and
//! embedders.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pulse_engine::session::controller::SessionController;
//! use pulse_engine::models::workout::PrescribedExercise;
//! use uuid::Uuid;
//!
//! let bench = PrescribedExercise::new(Uuid::new_v4(), "Bench Press", "3");
//! let mut session = SessionController::new("Push Day", vec![bench]);
//! session.start_set(session.exercises()[0].exercise_id);
//! ```

/// Environment-driven engine configuration
pub mod config;

/// Application constants shared across modules
pub mod constants;

/// Unified error taxonomy for the engine
pub mod errors;

/// Structured logging configuration
pub mod logging;

/// Core data models: activities, integrations, samples, streaks, taxonomy
pub mod models;

/// Fitness platform clients (OAuth exchange, activity fetch, push ingestion)
pub mod providers;

/// Live workout session state machine and its actor runtime
pub mod session;

/// Persistence collaborator trait and the in-memory reference store
pub mod storage;

/// Consecutive-day streak updates triggered by cardio activity writes
pub mod streaks;

/// External synchronization gateway and reconciliation
pub mod sync;

/// Heart rate telemetry: wire decoding, device client, simulator
pub mod telemetry;

/// Shared HTTP client helpers
pub mod utils;
