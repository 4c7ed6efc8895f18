// ABOUTME: Bluetooth LE transport for the heart rate monitor (feature "ble")
// ABOUTME: Discovers heart rate peripherals and streams measurement notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # BLE Heart Rate Transport
//!
//! Discovery and connection against the standard Heart Rate service
//! (0x180D) and Measurement characteristic (0x2A37). Transport failures
//! never reach the caller as errors: both entry points log diagnostics and
//! return `None`, leaving the monitor to fall back to simulation.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter, ValueNotification};
use btleplug::platform::{Manager, Peripheral};
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use super::monitor::MeasurementSource;
use crate::constants::ble_gatt::{HEART_RATE_MEASUREMENT, HEART_RATE_SERVICE, SCAN_WINDOW_SECS};
use crate::errors::{EngineError, EngineResult};

/// A connected peripheral streaming Heart Rate Measurement frames
pub struct BleMeasurementSource {
    peripheral: Peripheral,
    notifications: Pin<Box<dyn Stream<Item = ValueNotification> + Send>>,
}

/// Discover a peripheral advertising the Heart Rate service
///
/// Scans for a short window and returns the first matching peripheral.
/// Never errors to the caller: adapter and scan failures are logged and
/// reported as "no device".
pub async fn select_device() -> Option<Peripheral> {
    match discover().await {
        Ok(Some(peripheral)) => Some(peripheral),
        Ok(None) => {
            info!("no heart rate device found");
            None
        }
        Err(e) => {
            warn!("bluetooth discovery failed: {e}");
            None
        }
    }
}

/// Connect to a discovered peripheral and subscribe to measurements
///
/// Returns `None` on any transport failure, logged for diagnosis; the
/// caller treats that as "stay on the simulator".
pub async fn connect(peripheral: Peripheral) -> Option<BleMeasurementSource> {
    match subscribe(peripheral).await {
        Ok(source) => Some(source),
        Err(e) => {
            warn!("heart rate device connection failed: {e}");
            None
        }
    }
}

async fn discover() -> EngineResult<Option<Peripheral>> {
    let manager = Manager::new().await.map_err(device_error)?;
    let adapters = manager.adapters().await.map_err(device_error)?;
    let Some(adapter) = adapters.into_iter().next() else {
        return Err(EngineError::DeviceUnavailable(
            "no bluetooth adapter present".into(),
        ));
    };

    adapter
        .start_scan(ScanFilter {
            services: vec![HEART_RATE_SERVICE],
        })
        .await
        .map_err(device_error)?;
    tokio::time::sleep(Duration::from_secs(SCAN_WINDOW_SECS)).await;
    adapter.stop_scan().await.map_err(device_error)?;

    for peripheral in adapter.peripherals().await.map_err(device_error)? {
        let Ok(Some(properties)) = peripheral.properties().await else {
            continue;
        };
        if properties.services.contains(&HEART_RATE_SERVICE) {
            debug!(
                "found heart rate peripheral: {}",
                properties.local_name.as_deref().unwrap_or("<unnamed>")
            );
            return Ok(Some(peripheral));
        }
    }
    Ok(None)
}

async fn subscribe(peripheral: Peripheral) -> EngineResult<BleMeasurementSource> {
    peripheral.connect().await.map_err(device_error)?;
    peripheral.discover_services().await.map_err(device_error)?;

    let measurement = peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == HEART_RATE_MEASUREMENT)
        .ok_or_else(|| {
            EngineError::DeviceUnavailable(
                "peripheral lacks the heart rate measurement characteristic".into(),
            )
        })?;

    peripheral
        .subscribe(&measurement)
        .await
        .map_err(device_error)?;
    let notifications = peripheral.notifications().await.map_err(device_error)?;

    info!("subscribed to heart rate measurement notifications");
    Ok(BleMeasurementSource {
        peripheral,
        notifications,
    })
}

fn device_error(e: btleplug::Error) -> EngineError {
    EngineError::DeviceUnavailable(e.to_string())
}

impl BleMeasurementSource {
    /// Unsubscribe and drop the transport connection; failures are logged
    pub async fn shutdown(self) {
        if let Err(e) = self.peripheral.disconnect().await {
            debug!("peripheral disconnect failed: {e}");
        }
    }
}

#[async_trait]
impl MeasurementSource for BleMeasurementSource {
    async fn next_frame(&mut self) -> Option<Vec<u8>> {
        loop {
            let notification = self.notifications.next().await?;
            if notification.uuid == HEART_RATE_MEASUREMENT {
                return Some(notification.value);
            }
        }
    }
}
