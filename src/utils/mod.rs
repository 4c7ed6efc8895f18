// ABOUTME: Shared utility modules
// ABOUTME: Currently just the HTTP client helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

pub mod http_client;
