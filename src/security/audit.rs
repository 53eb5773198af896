// ABOUTME: Security audit events for remote edits, file requests and host power operations
// ABOUTME: Emits structured tracing records under the security_audit target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Security Audit Module
//!
//! Audit logging for security-sensitive operations including:
//! - remote configuration changes and their rejections
//! - blocked path traversal and rejected file requests
//! - failed request integrity checks
//! - host reboot and shutdown requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Types of audit events tracked by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Configuration Events
    /// A parameter value changed
    ConfigurationChanged,
    /// A remote edit was refused by tier or hot-reload rules
    RemoteEditRejected,
    /// A remote edit targeted the reserved namespace
    ReservedParameterBlocked,

    // File Events
    /// A requested path resolved outside its permitted root
    PathTraversalBlocked,
    /// A requested file was missing or unusable
    FileRequestRejected,
    /// A mask bitmap was written or removed
    MaskChanged,

    // Request Events
    /// Request integrity token mismatch
    IntegrityCheckFailed,

    // Administrative Events
    /// Reboot or shutdown requested
    PowerOperationRequested,
}

/// Severity levels for audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Routine, expected event
    Info,
    /// Refused request that may be a probe
    Warning,
    /// Active attack pattern
    Critical,
}

/// Security audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier
    pub event_id: Uuid,
    /// Type of audit event
    pub event_type: AuditEventType,
    /// Severity level
    pub severity: AuditSeverity,
    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,
    /// Requester address (if available)
    pub source_ip: Option<String>,
    /// Event description
    pub description: String,
    /// Additional event metadata
    pub metadata: serde_json::Value,
    /// Resource affected by the event (e.g., "parameter:threshold", "file:cam1/01.mkv")
    pub resource: Option<String>,
    /// Action performed (e.g., "set", "read", "reboot")
    pub action: String,
    /// Result of the action (e.g., "success", "denied")
    pub result: String,
}

impl AuditEvent {
    /// Create a new audit event
    #[must_use]
    pub fn new(
        event_type: AuditEventType,
        severity: AuditSeverity,
        description: impl Into<String>,
        action: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            severity,
            timestamp: Utc::now(),
            source_ip: None,
            description: description.into(),
            metadata: serde_json::Value::Null,
            resource: None,
            action: action.into(),
            result: result.into(),
        }
    }

    /// Set source address
    #[must_use]
    pub fn with_source_ip(mut self, source_ip: Option<&str>) -> Self {
        self.source_ip = source_ip.map(ToOwned::to_owned);
        self
    }

    /// Set resource affected
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Add metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Write the event to the audit log
    pub fn emit(&self) {
        let source_ip = self.source_ip.as_deref().unwrap_or("unknown");
        let resource = self.resource.as_deref().unwrap_or("");
        match self.severity {
            AuditSeverity::Info => tracing::info!(
                target: "security_audit",
                event_id = %self.event_id,
                event_type = ?self.event_type,
                source_ip,
                resource,
                action = %self.action,
                result = %self.result,
                metadata = %self.metadata,
                "Security audit event: {}",
                self.description
            ),
            AuditSeverity::Warning => tracing::warn!(
                target: "security_audit",
                event_id = %self.event_id,
                event_type = ?self.event_type,
                source_ip,
                resource,
                action = %self.action,
                result = %self.result,
                metadata = %self.metadata,
                "Security audit warning: {}",
                self.description
            ),
            AuditSeverity::Critical => tracing::error!(
                target: "security_audit",
                event_id = %self.event_id,
                event_type = ?self.event_type,
                source_ip,
                resource,
                action = %self.action,
                result = %self.result,
                metadata = %self.metadata,
                "CRITICAL security audit event: {}",
                self.description
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let event = AuditEvent::new(
            AuditEventType::PathTraversalBlocked,
            AuditSeverity::Critical,
            "Path traversal attempt blocked",
            "read",
            "denied",
        )
        .with_source_ip(Some("192.168.1.20"))
        .with_resource("file:../../etc/passwd")
        .with_metadata(serde_json::json!({ "root": "/data/videos" }));

        assert_eq!(event.source_ip.as_deref(), Some("192.168.1.20"));
        assert_eq!(event.metadata["root"], "/data/videos");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "path_traversal_blocked");
        assert_eq!(json["severity"], "critical");
        event.emit();
    }
}
