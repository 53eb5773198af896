// ABOUTME: Main library entry point for the motion camera configuration control plane
// ABOUTME: Parameter registry, edit engine, hot reload, secure file serving and mask rasterizing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # motionctl
//!
//! Runtime configuration control plane for a multi-camera motion device.
//!
//! ## Architecture
//!
//! - **Registry**: immutable catalog of typed parameter descriptors
//! - **Dispatch**: validating edit engine with per-parameter handlers
//! - **Hot reload**: applies edits to the live process and attached cameras
//! - **Files**: resolves client identifiers strictly inside a permitted root
//! - **Mask**: rasterizes polygons into PGM motion and privacy masks
//! - **Routes**: thin axum adapter over all of the above
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use motionctl::hot_reload::{HotReloadController, Scope};
//! use motionctl::registry::ParameterRegistry;
//!
//! # async fn example() {
//! let controller = HotReloadController::new(ParameterRegistry::shared());
//! let outcome = controller.apply("threshold", "2000", Scope::AllCameras).await;
//! println!("{:?}", outcome.status);
//! # }
//! ```

/// Server configuration from environment variables
pub mod config;

/// Configuration contexts and the camera arena
pub mod context;

/// Validating edit engine
pub mod dispatch;

/// Configuration document served to clients
pub mod document;

/// Unified error handling
pub mod errors;

/// Secure file resolution and chunked streaming
pub mod files;

/// Live application of configuration changes
pub mod hot_reload;

/// Structured logging setup
pub mod logging;

/// Mask rasterizing and persistence
pub mod mask;

/// Host power operations
pub mod power;

/// Parameter catalog and registry
pub mod registry;

/// HTTP routes
pub mod routes;

/// Audit logging, action policy and CSRF protection
pub mod security;
