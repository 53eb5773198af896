// ABOUTME: Configuration management module for server startup settings
// ABOUTME: Environment-driven settings that seed the default configuration context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Server configuration
//!
//! Runtime camera parameters live in the registry and the configuration
//! contexts; this module only covers how the process itself starts.

/// Environment and server configuration
pub mod environment;

pub use environment::{Environment, LogLevel, ServerConfig};
