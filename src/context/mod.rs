// ABOUTME: Configuration contexts for the default scope and every attached camera
// ABOUTME: Re-exports the value store and the camera arena
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Arena of attached cameras
pub mod cameras;
/// Per-scope typed value store
pub mod config;

pub use cameras::{Arena, CameraIndex, CameraSlot};
pub use config::ConfigContext;
