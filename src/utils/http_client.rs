// ABOUTME: Shared HTTP client construction with bounded timeout configuration
// ABOUTME: Provides API and OAuth flavored reqwest clients built from engine config
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::config::HttpConfig;

/// HTTP client for activity fetches, with connection pooling and the
/// configured request and connect timeouts
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn api_client(config: &HttpConfig) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// HTTP client for OAuth flows
///
/// Token exchanges should be fast operations, so this client carries a
/// shorter request timeout than the API client.
#[must_use]
pub fn oauth_client(config: &HttpConfig) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.oauth_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}
