// ABOUTME: Host reboot and shutdown requests, detached from the request that asked for them
// ABOUTME: Gated by the power action and delayed so the triggering call completes first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use motionctl_core::constants::limits::POWER_DELAY_SECS;

use crate::errors::{AppError, AppResult};
use crate::hot_reload::HotReloadController;
use crate::security::actions::ACTION_POWER;
use crate::security::{AuditEvent, AuditEventType, AuditSeverity};

/// Host power operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerOperation {
    /// Restart the host
    Reboot,
    /// Power the host off
    Shutdown,
}

impl PowerOperation {
    /// Commands tried in order until one succeeds
    #[must_use]
    pub const fn command_chain(self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Reboot => &[
                &["/sbin/reboot"],
                &["shutdown", "-r", "now"],
                &["systemctl", "reboot"],
                &["init", "6"],
            ],
            Self::Shutdown => &[
                &["/sbin/poweroff"],
                &["shutdown", "-h", "now"],
                &["systemctl", "poweroff"],
                &["init", "0"],
            ],
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Reboot => "reboot",
            Self::Shutdown => "shut down",
        }
    }
}

impl fmt::Display for PowerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reboot => "reboot",
            Self::Shutdown => "shutdown",
        })
    }
}

impl FromStr for PowerOperation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reboot" | "restart" => Ok(Self::Reboot),
            "shutdown" | "poweroff" => Ok(Self::Shutdown),
            other => Err(AppError::not_found(format!("System operation '{other}'"))),
        }
    }
}

/// Carries out a power operation on the host
#[async_trait]
pub trait PowerExecutor: Send + Sync {
    /// Perform `operation`
    ///
    /// # Errors
    ///
    /// Returns an error when the host could not be made to comply
    async fn execute(&self, operation: PowerOperation) -> AppResult<()>;
}

/// Runs the platform commands of [`PowerOperation::command_chain`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

#[async_trait]
impl PowerExecutor for SystemCommandExecutor {
    async fn execute(&self, operation: PowerOperation) -> AppResult<()> {
        for argv in operation.command_chain() {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            match Command::new(program).args(args).status().await {
                Ok(status) if status.success() => {
                    info!(%operation, program, "Power command accepted");
                    return Ok(());
                }
                Ok(status) => warn!(%operation, program, %status, "Power command failed"),
                Err(e) => warn!(%operation, program, error = %e, "Power command unavailable"),
            }
        }
        Err(AppError::internal(format!(
            "No command could {} the host",
            operation.verb()
        )))
    }
}

/// Response to an accepted power request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerScheduled {
    /// Operation that will run
    pub operation: PowerOperation,
    /// Seconds until it runs
    pub delay_secs: u64,
    /// Operator message
    pub message: String,
}

/// Schedules power operations behind the action policy
pub struct PowerController {
    controller: Arc<HotReloadController>,
    executor: Arc<dyn PowerExecutor>,
    delay: Duration,
}

impl PowerController {
    /// Controller using the host's commands and the default delay
    #[must_use]
    pub fn new(controller: Arc<HotReloadController>) -> Self {
        Self::with_executor(controller, Arc::new(SystemCommandExecutor))
    }

    /// Controller with a custom executor
    #[must_use]
    pub fn with_executor(
        controller: Arc<HotReloadController>,
        executor: Arc<dyn PowerExecutor>,
    ) -> Self {
        Self {
            controller,
            executor,
            delay: Duration::from_secs(POWER_DELAY_SECS),
        }
    }

    /// Override the delay before the operation runs
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Schedule `operation` after the configured delay
    ///
    /// The returned handle resolves once the executor has run; callers are free
    /// to drop it.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `webcontrol_actions` enables `power`
    pub async fn schedule(
        &self,
        operation: PowerOperation,
        requester: Option<&str>,
    ) -> AppResult<(PowerScheduled, JoinHandle<()>)> {
        let policy = self.controller.action_policy().await;
        let permitted = policy.is_enabled(ACTION_POWER);
        AuditEvent::new(
            AuditEventType::PowerOperationRequested,
            if permitted {
                AuditSeverity::Warning
            } else {
                AuditSeverity::Info
            },
            format!("Host {operation} requested"),
            operation.to_string(),
            if permitted { "scheduled" } else { "denied" },
        )
        .with_source_ip(requester)
        .emit();
        if !permitted {
            return Err(AppError::permission_denied(format!(
                "System {operation} is disabled"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = executor.execute(operation).await {
                error!(%operation, error = %e.message, "Power operation failed");
            }
        });

        let delay_secs = self.delay.as_secs();
        Ok((
            PowerScheduled {
                operation,
                delay_secs,
                message: format!("System will {} in {delay_secs} seconds", operation.verb()),
            },
            handle,
        ))
    }
}
