// ABOUTME: Application constants and default values shared across engine modules
// ABOUTME: Centralizes BLE UUIDs, session defaults, simulator tuning, and HTTP limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

/// Bluetooth GATT identifiers for the standard heart rate profile
pub mod ble_gatt {
    use uuid::Uuid;

    /// Heart Rate service (assigned number 0x180D)
    pub const HEART_RATE_SERVICE: Uuid =
        Uuid::from_u128(0x0000_180d_0000_1000_8000_0080_5f9b_34fb);

    /// Heart Rate Measurement characteristic (assigned number 0x2A37)
    pub const HEART_RATE_MEASUREMENT: Uuid =
        Uuid::from_u128(0x0000_2a37_0000_1000_8000_0080_5f9b_34fb);

    /// How long discovery scans before inspecting advertisements
    pub const SCAN_WINDOW_SECS: u64 = 4;
}

/// Live session defaults
pub mod session {
    /// Rest applied when a prescription carries no usable rest duration
    pub const DEFAULT_REST_SECONDS: u32 = 90;

    /// Ticks between total completion and finalization, so the user sees
    /// the finished state before the session is handed off
    pub const AUTO_FINISH_GRACE_TICKS: u32 = 3;
}

/// Simulated heart rate generator tuning
pub mod simulator {
    /// Lower bound of the simulated bpm random walk
    pub const MIN_BPM: u16 = 90;

    /// Upper bound of the simulated bpm random walk
    pub const MAX_BPM: u16 = 185;

    /// Largest per-tick change in simulated bpm
    pub const MAX_STEP: i32 = 5;

    /// Simulated energy accrued per generator tick, in kcal
    pub const KCAL_PER_TICK: f64 = 0.12;
}

/// Physiological bounds and calorie estimation factors
pub mod physiology {
    /// Heart rate readings above this are treated as sensor noise
    pub const MAX_NORMAL_HR: u16 = 220;

    /// Calorie estimate slope per bpm of session-average heart rate,
    /// kcal per minute
    pub const KCAL_PER_MINUTE_SLOPE: f64 = 0.1;

    /// Calorie estimate intercept, kcal per minute
    pub const KCAL_PER_MINUTE_OFFSET: f64 = 5.5;

    /// Flat per-minute estimate used when a session recorded no samples
    pub const KCAL_PER_MINUTE_FALLBACK: f64 = 6.0;
}

/// Synchronization gateway defaults
pub mod sync {
    /// Trailing fetch window for integrations that have never synced
    pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

    /// Lifetime of a pending OAuth state parameter
    pub const STATE_TTL_MINUTES: i64 = 10;

    /// Activities requested per page from remote APIs
    pub const FETCH_PAGE_SIZE: usize = 100;

    /// Upper bound on pages fetched in one sync run
    pub const MAX_FETCH_PAGES: usize = 5;
}

/// HTTP client limits
pub mod http {
    /// Request timeout for activity fetches, seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Connection establishment timeout, seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Request timeout for OAuth token exchanges, seconds
    pub const OAUTH_TIMEOUT_SECS: u64 = 15;
}

/// Retry policy bounds for remote activity fetches
pub mod retry {
    /// Total attempts per fetch, including the first
    pub const MAX_FETCH_ATTEMPTS: u32 = 3;

    /// Base backoff delay, doubled per attempt
    pub const BACKOFF_BASE_MS: u64 = 250;
}

/// OAuth scopes requested from each platform
pub mod oauth {
    /// Minimum Strava grant covering activity history reads
    pub const STRAVA_DEFAULT_SCOPES: &str = "read,activity:read_all";

    /// Minimum Google Fit grant covering activity session reads
    pub const GOOGLE_FIT_DEFAULT_SCOPES: &str =
        "https://www.googleapis.com/auth/fitness.activity.read";
}
