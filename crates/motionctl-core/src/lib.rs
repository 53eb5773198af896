// ABOUTME: Core types and constants for the motionctl camera control plane
// ABOUTME: Foundation crate with error handling and shared constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # motionctl core
//!
//! Foundation crate providing shared types and constants for the motionctl
//! configuration control plane. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Defaults, limits and environment variable names

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;
