// ABOUTME: Security module grouping audit logging, action gating and request integrity
// ABOUTME: Shared by the edit, file, mask and power paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Per-action enablement from `webcontrol_actions`
pub mod actions;
/// Structured security audit events
pub mod audit;
/// Process-wide CSRF token
pub mod csrf;

pub use actions::ActionPolicy;
pub use audit::{AuditEvent, AuditEventType, AuditSeverity};
pub use csrf::CsrfTokenManager;
