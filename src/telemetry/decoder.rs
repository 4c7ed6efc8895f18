// ABOUTME: Pure decoder for the BLE Heart Rate Measurement wire format
// ABOUTME: Extracts the bpm value from notification frames per the GATT spec
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Heart Rate Measurement Decoding
//!
//! Byte 0 of a Heart Rate Measurement frame is a flags bitfield; bit 0
//! selects the value width. Energy-expended and RR-interval flag bits are
//! not interpreted here, and trailing bytes are ignored.

/// Flags bit selecting a 16-bit little-endian bpm value
pub const FLAG_HR_VALUE_16BIT: u8 = 0b0000_0001;

/// Decode the bpm value from a Heart Rate Measurement frame
///
/// Pure and total: the same input always yields the same output. Callers
/// only invoke this with frames delivered by a Heart Rate Measurement
/// notification; a truncated frame decodes its missing bytes as zero.
#[must_use]
pub fn decode_heart_rate(frame: &[u8]) -> u16 {
    let flags = frame.first().copied().unwrap_or(0);
    let lo = frame.get(1).copied().unwrap_or(0);
    if flags & FLAG_HR_VALUE_16BIT != 0 {
        let hi = frame.get(2).copied().unwrap_or(0);
        u16::from_le_bytes([lo, hi])
    } else {
        u16::from(lo)
    }
}
