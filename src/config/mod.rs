// ABOUTME: Configuration module for the engine
// ABOUTME: Re-exports the environment-driven configuration tree
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

pub mod environment;

pub use environment::{
    EngineConfig, HttpConfig, OAuthConfig, OAuthProviderConfig, RetryConfig, SyncConfig,
};
