// ABOUTME: Unified error handling re-exported from the core crate
// ABOUTME: AppError, ErrorCode and AppResult shared by every module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The error types live in `motionctl-core` so the HTTP response mapping can be
//! compiled behind a feature; this module re-exports them under the crate root.

pub use motionctl_core::errors::*;
