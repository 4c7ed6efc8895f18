// ABOUTME: Heart rate telemetry module: wire decoding, device client, simulator
// ABOUTME: Organizes the decoder, the monitor with listener fan-out, and the BLE transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Heart Rate Telemetry
//!
//! A [`monitor::HeartRateMonitor`] owns the telemetry lifecycle for one
//! session: listeners subscribe for samples, a real device feeds frames
//! through the [`decoder`], and when no device is available a simulated
//! generator keeps samples flowing so the session UI never goes dark.
//!
//! The monitor is an explicitly constructed instance with explicit
//! teardown; nothing here hangs off a process-wide global.

pub mod decoder;
pub mod monitor;
pub(crate) mod simulator;

#[cfg(feature = "ble")]
pub mod ble;

pub use decoder::decode_heart_rate;
pub use monitor::{HeartRateMonitor, ListenerId, MeasurementSource, SampleListener};
