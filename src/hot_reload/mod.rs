// ABOUTME: Hot-reload controller applying validated changes to live camera contexts
// ABOUTME: Owns the camera arena, enforces remote-edit eligibility and drives peripheral setters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Hot-Reload Controller
//!
//! Every mutation of a live configuration runs read-old, validate, write-new and
//! apply-side-effect as one unit while holding the lock of the context(s) it
//! touches:
//!
//! - single-camera edits hold the arena read guard plus that camera's mutex;
//! - all-camera edits, device id edits, attach and detach hold the arena write
//!   guard, so no other edit can observe a half-applied change.
//!
//! Lock order is always arena, then default context, then cameras by index.

/// Live peripheral setters and the parameter mapping
pub mod controls;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use motionctl_core::constants::limits::MAX_DEVICE_ID;

use crate::context::{Arena, CameraIndex, CameraSlot, ConfigContext};
use crate::dispatch::{EditAction, EditEngine, EditEnv, EditOutcome, EditStatus};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::registry::{CustomHandler, ParameterDescriptor, ParameterRegistry, VisibilityTier};
use crate::security::{ActionPolicy, AuditEvent, AuditEventType, AuditSeverity};
use controls::{CameraControl, LiveControl};

/// Which contexts an edit touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The default context and every attached camera
    AllCameras,
    /// One camera
    SingleCamera(CameraIndex),
    /// The default context only; attached cameras keep their values
    DefaultOnly,
}

/// Batch totals; unchanged entries count as successes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Entries processed
    pub total: usize,
    /// Entries applied or already at the requested value
    pub success: usize,
    /// Entries rejected
    pub errors: usize,
}

/// Per-entry outcomes of a batch plus totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Outcomes in request order
    pub entries: Vec<EditOutcome>,
    /// Totals
    pub summary: BatchSummary,
}

/// Identity of an attached camera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSummary {
    /// Arena index
    pub index: CameraIndex,
    /// Device id
    pub id: i64,
    /// Display name; `camera N` when `device_name` is empty
    pub name: String,
}

/// Consistent copy of every context, taken under one read guard
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Remote-edit ceiling in force
    pub ceiling: VisibilityTier,
    /// Default context
    pub default: ConfigContext,
    /// Cameras with their contexts, in index order
    pub cameras: Vec<(CameraSummary, ConfigContext)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trust {
    Remote,
    Local,
}

/// Applies configuration changes to the live process
pub struct HotReloadController {
    engine: EditEngine,
    arena: RwLock<Arena>,
}

impl HotReloadController {
    /// Controller with a default context seeded from `registry`
    #[must_use]
    pub fn new(registry: Arc<ParameterRegistry>) -> Self {
        let default = ConfigContext::from_registry(&registry, "default");
        Self::with_default(registry, default)
    }

    /// Controller around an already populated default context
    #[must_use]
    pub fn with_default(registry: Arc<ParameterRegistry>, default: ConfigContext) -> Self {
        Self {
            engine: EditEngine::new(registry),
            arena: RwLock::new(Arena::new(default)),
        }
    }

    /// The edit engine used for every write
    #[must_use]
    pub const fn engine(&self) -> &EditEngine {
        &self.engine
    }

    // ========================================================================
    // Eligibility
    // ========================================================================

    /// Remote-edit ceiling from the default context
    pub async fn ceiling(&self) -> VisibilityTier {
        ceiling_of(&self.arena.read().await.default)
    }

    /// Whether a remote caller may change `name` on the live process
    pub async fn validate(&self, name: &str) -> bool {
        self.eligibility(name).await.is_ok()
    }

    /// Why a remote caller may not change `name`, if they may not
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown names, `SecurityViolation` for the reserved
    /// namespace and `PermissionDenied` for tier or restart-only parameters
    pub async fn eligibility(&self, name: &str) -> AppResult<()> {
        let ceiling = self.ceiling().await;
        self.check_eligibility(name, ceiling).map(|_| ())
    }

    fn check_eligibility(
        &self,
        name: &str,
        ceiling: VisibilityTier,
    ) -> AppResult<&ParameterDescriptor> {
        let descriptor = self.engine.registry().lookup(name)?;
        if descriptor.is_reserved() {
            return Err(AppError::security(format!(
                "{name} cannot be modified remotely (reserved parameter)"
            ))
            .with_resource_id(name));
        }
        if matches!(
            descriptor.tier,
            VisibilityTier::Never | VisibilityTier::Restricted
        ) || descriptor.tier > ceiling
        {
            return Err(
                AppError::permission_denied(format!("{name} is above the remote edit level"))
                    .with_resource_id(name),
            );
        }
        if !descriptor.hot_reload {
            return Err(AppError::permission_denied(format!(
                "{name} requires a daemon restart"
            ))
            .with_resource_id(name));
        }
        Ok(descriptor)
    }

    fn admit(
        &self,
        default: &ConfigContext,
        name: &str,
        trust: Trust,
        requester: Option<&str>,
    ) -> AppResult<()> {
        if trust == Trust::Local {
            return self.engine.registry().lookup(name).map(|_| ());
        }
        self.check_eligibility(name, ceiling_of(default))
            .map(|_| ())
            .inspect_err(|error| {
                if error.code == ErrorCode::SecurityViolation {
                    AuditEvent::new(
                        AuditEventType::ReservedParameterBlocked,
                        AuditSeverity::Warning,
                        "Remote edit of reserved parameter blocked",
                        "set",
                        "denied",
                    )
                    .with_source_ip(requester)
                    .with_resource(format!("parameter:{name}"))
                    .emit();
                } else {
                    AuditEvent::new(
                        AuditEventType::RemoteEditRejected,
                        AuditSeverity::Info,
                        "Remote edit refused",
                        "set",
                        "denied",
                    )
                    .with_source_ip(requester)
                    .with_resource(format!("parameter:{name}"))
                    .with_metadata(serde_json::json!({ "reason": error.message }))
                    .emit();
                }
            })
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Remote edit of `name` in `scope`
    pub async fn apply(&self, name: &str, raw: &str, scope: Scope) -> EditOutcome {
        self.apply_inner(name, raw, scope, Trust::Remote, None).await
    }

    /// Remote edit recorded against `requester`
    pub async fn apply_as(
        &self,
        requester: &str,
        name: &str,
        raw: &str,
        scope: Scope,
    ) -> EditOutcome {
        self.apply_inner(name, raw, scope, Trust::Remote, Some(requester))
            .await
    }

    /// Edit made by the process itself; skips remote eligibility
    pub async fn apply_local(&self, name: &str, raw: &str, scope: Scope) -> EditOutcome {
        self.apply_inner(name, raw, scope, Trust::Local, None).await
    }

    /// Apply each entry independently, in order
    pub async fn apply_batch(&self, entries: &[(String, String)], scope: Scope) -> BatchReport {
        self.apply_batch_inner(entries, scope, None).await
    }

    /// Batch recorded against `requester`
    pub async fn apply_batch_as(
        &self,
        requester: &str,
        entries: &[(String, String)],
        scope: Scope,
    ) -> BatchReport {
        self.apply_batch_inner(entries, scope, Some(requester))
            .await
    }

    async fn apply_batch_inner(
        &self,
        entries: &[(String, String)],
        scope: Scope,
        requester: Option<&str>,
    ) -> BatchReport {
        let mut outcomes = Vec::with_capacity(entries.len());
        for (name, raw) in entries {
            outcomes.push(
                self.apply_inner(name, raw, scope, Trust::Remote, requester)
                    .await,
            );
        }
        let success = outcomes
            .iter()
            .filter(|outcome| outcome.status.is_success())
            .count();
        let summary = BatchSummary {
            total: outcomes.len(),
            success,
            errors: outcomes.len() - success,
        };
        info!(
            total = summary.total,
            success = summary.success,
            errors = summary.errors,
            "Batch configuration update processed"
        );
        BatchReport {
            entries: outcomes,
            summary,
        }
    }

    /// Current value of `name` in `scope` (`AllCameras` reads the default context)
    pub async fn get(&self, name: &str, scope: Scope) -> EditOutcome {
        self.read(name, EditAction::Get, scope).await
    }

    /// Read-only action in `scope`
    pub async fn read(&self, name: &str, action: EditAction, scope: Scope) -> EditOutcome {
        let arena = self.arena.read().await;
        match scope {
            Scope::AllCameras | Scope::DefaultOnly => {
                self.engine.read(&arena.default, name, action)
            }
            Scope::SingleCamera(index) => match arena.slot(index) {
                Some(slot) => {
                    let config = slot.config.lock().await;
                    self.engine.read(&config, name, action)
                }
                None => EditOutcome::rejected(name, action, &camera_not_found(index)),
            },
        }
    }

    async fn apply_inner(
        &self,
        name: &str,
        raw: &str,
        scope: Scope,
        trust: Trust,
        requester: Option<&str>,
    ) -> EditOutcome {
        let outcome = match scope {
            Scope::AllCameras => {
                let mut arena = self.arena.write().await;
                if let Err(error) = self.admit(&arena.default, name, trust, requester) {
                    return EditOutcome::rejected(name, EditAction::Set, &error);
                }
                self.apply_all(&mut arena, name, raw).await
            }
            Scope::DefaultOnly => {
                let mut arena = self.arena.write().await;
                if let Err(error) = self.admit(&arena.default, name, trust, requester) {
                    return EditOutcome::rejected(name, EditAction::Set, &error);
                }
                self.engine
                    .edit(&mut arena.default, name, raw, EditAction::Set, &EditEnv::standalone())
            }
            Scope::SingleCamera(index) if self.is_identity(name) => {
                let arena = self.arena.write().await;
                if let Err(error) = self.admit(&arena.default, name, trust, requester) {
                    return EditOutcome::rejected(name, EditAction::Set, &error);
                }
                self.apply_single(&arena, index, name, raw).await
            }
            Scope::SingleCamera(index) => {
                let arena = self.arena.read().await;
                if let Err(error) = self.admit(&arena.default, name, trust, requester) {
                    return EditOutcome::rejected(name, EditAction::Set, &error);
                }
                self.apply_single(&arena, index, name, raw).await
            }
        };
        if outcome.applied() && trust == Trust::Remote {
            AuditEvent::new(
                AuditEventType::ConfigurationChanged,
                AuditSeverity::Info,
                "Configuration parameter changed",
                "set",
                "success",
            )
            .with_source_ip(requester)
            .with_resource(format!("parameter:{name}"))
            .with_metadata(serde_json::json!({
                "scope": format!("{scope:?}"),
                "old_value": outcome.old_value,
                "new_value": outcome.new_value,
            }))
            .emit();
        }
        outcome
    }

    async fn apply_single(
        &self,
        arena: &Arena,
        index: CameraIndex,
        name: &str,
        raw: &str,
    ) -> EditOutcome {
        let Some(slot) = arena.slot(index) else {
            return EditOutcome::rejected(name, EditAction::Set, &camera_not_found(index));
        };
        let taken = if self.is_identity(name) {
            arena.taken_device_ids(Some(index)).await
        } else {
            Vec::new()
        };
        let env = EditEnv {
            taken_device_ids: &taken,
        };

        let mut config = slot.config.lock().await;
        let mut outcome = self
            .engine
            .edit(&mut config, name, raw, EditAction::Set, &env);
        if outcome.applied() {
            info!(
                camera = %index,
                parameter = name,
                old_value = outcome.old_value.as_deref().unwrap_or(""),
                new_value = outcome.new_value.as_deref().unwrap_or(""),
                "Parameter hot-reloaded"
            );
            push_live(name, &config, slot, &mut outcome);
        } else if outcome.status == EditStatus::Unchanged {
            push_action(name, &config, slot, &mut outcome);
        }
        outcome
    }

    async fn apply_all(&self, arena: &mut Arena, name: &str, raw: &str) -> EditOutcome {
        if self.is_identity(name) && arena.camera_count() > 0 {
            let error = AppError::conflict("device_id must be set per camera").with_resource_id(name);
            return EditOutcome::rejected(name, EditAction::Set, &error);
        }
        let env = EditEnv::standalone();
        let (default, slots) = arena.split_default();

        let mut configs = Vec::with_capacity(slots.len());
        for slot in &slots {
            configs.push(slot.config.lock().await);
        }

        // Validate every context before writing any of them
        let (descriptor, normalized) = match self
            .engine
            .plan(default, name, raw, EditAction::Set, &env)
        {
            Ok(planned) => planned,
            Err(error) => return EditOutcome::rejected(name, EditAction::Set, &error),
        };
        let mut planned = Vec::with_capacity(configs.len());
        for config in &configs {
            match self.engine.plan(config, name, raw, EditAction::Set, &env) {
                Ok((_, camera_value)) => planned.push(camera_value),
                Err(error) => return EditOutcome::rejected(name, EditAction::Set, &error),
            }
        }

        let mut outcome = self
            .engine
            .commit(default, descriptor, normalized, EditAction::Set);
        let mut any_applied = outcome.applied();
        for ((slot, config), camera_value) in slots.iter().zip(configs.iter_mut()).zip(planned) {
            let mut camera_outcome =
                self.engine
                    .commit(config, descriptor, camera_value, EditAction::Set);
            if camera_outcome.applied() {
                any_applied = true;
                push_live(name, config, slot, &mut camera_outcome);
                if let Some(notice) = camera_outcome.notice {
                    outcome.add_notice(notice);
                }
            } else if camera_outcome.status == EditStatus::Unchanged {
                push_action(name, config, slot, &mut outcome);
            }
        }
        if any_applied {
            outcome.status = EditStatus::Applied;
            info!(
                parameter = name,
                cameras = slots.len(),
                new_value = outcome.new_value.as_deref().unwrap_or(""),
                "Parameter hot-reloaded on all cameras"
            );
        }
        outcome
    }

    fn is_identity(&self, name: &str) -> bool {
        self.engine
            .registry()
            .get(name)
            .is_some_and(|descriptor| descriptor.handler == Some(CustomHandler::DeviceId))
    }

    // ========================================================================
    // Camera lifecycle
    // ========================================================================

    /// Attach a camera cloned from the default context
    ///
    /// Without `device_id` the smallest unused id is assigned. Overrides go
    /// through the edit engine; rejected overrides are logged and skipped.
    ///
    /// # Errors
    ///
    /// `Conflict` when the id is taken or none is left, validation errors for an
    /// out-of-range id
    pub async fn attach_camera(
        &self,
        device_id: Option<i64>,
        overrides: &[(String, String)],
        control: Arc<dyn CameraControl>,
    ) -> AppResult<CameraIndex> {
        let mut arena = self.arena.write().await;
        let taken = arena.taken_device_ids(None).await;
        let id = match device_id {
            Some(id) => id,
            None => (1..=MAX_DEVICE_ID)
                .find(|candidate| !taken.contains(candidate))
                .ok_or_else(|| AppError::conflict("No free device id left"))?,
        };
        let env = EditEnv {
            taken_device_ids: &taken,
        };

        let mut config = arena.default.derive(format!("cam{id}"));
        let (descriptor, normalized) =
            self.engine
                .plan(&config, "device_id", &id.to_string(), EditAction::Set, &env)?;
        self.engine
            .commit(&mut config, descriptor, normalized, EditAction::Set);

        for (name, raw) in overrides {
            let outcome = self
                .engine
                .edit(&mut config, name, raw, EditAction::Set, &env);
            if !outcome.status.is_success() {
                warn!(
                    device_id = id,
                    parameter = %name,
                    status = ?outcome.status,
                    "Camera override rejected"
                );
            }
        }

        let index = arena.push(config, control);
        info!(camera = %index, device_id = id, "Camera attached");
        Ok(index)
    }

    /// Detach a camera and drop its context
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing is attached at `index`
    pub async fn detach_camera(&self, index: CameraIndex) -> AppResult<()> {
        let mut arena = self.arena.write().await;
        arena.vacate(index).ok_or_else(|| camera_not_found(index))?;
        info!(camera = %index, "Camera detached");
        Ok(())
    }

    /// Reserve a device id for a non-camera peripheral
    ///
    /// # Errors
    ///
    /// `Conflict` when the id is in use, `ValueOutOfRange` when outside 1..=32000
    pub async fn register_peripheral(&self, device_id: i64) -> AppResult<()> {
        if !(1..=MAX_DEVICE_ID).contains(&device_id) {
            return Err(AppError::out_of_range(format!(
                "device id must be between 1 and {MAX_DEVICE_ID}"
            )));
        }
        let mut arena = self.arena.write().await;
        if arena.taken_device_ids(None).await.contains(&device_id) {
            return Err(AppError::conflict(format!(
                "Device id {device_id} is already in use"
            )));
        }
        arena.add_peripheral(device_id);
        info!(device_id, "Peripheral registered");
        Ok(())
    }

    /// Attached cameras in index order
    pub async fn cameras(&self) -> Vec<CameraSummary> {
        let arena = self.arena.read().await;
        let mut summaries = Vec::with_capacity(arena.camera_count());
        for slot in arena.attached() {
            summaries.push(summarize(slot.index, &*slot.config.lock().await));
        }
        summaries
    }

    /// Arena index of the camera with `device_id`
    pub async fn find_camera(&self, device_id: i64) -> Option<CameraIndex> {
        self.cameras()
            .await
            .into_iter()
            .find(|camera| camera.id == device_id)
            .map(|camera| camera.index)
    }

    /// Copy of one camera's context
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing is attached at `index`
    pub async fn camera_config(&self, index: CameraIndex) -> AppResult<ConfigContext> {
        let arena = self.arena.read().await;
        let slot = arena.slot(index).ok_or_else(|| camera_not_found(index))?;
        let config = slot.config.lock().await.clone();
        Ok(config)
    }

    /// Consistent copy of all contexts
    pub async fn snapshot(&self) -> ConfigSnapshot {
        let arena = self.arena.read().await;
        let mut cameras = Vec::with_capacity(arena.camera_count());
        for slot in arena.attached() {
            let config = slot.config.lock().await.clone();
            cameras.push((summarize(slot.index, &config), config));
        }
        ConfigSnapshot {
            ceiling: ceiling_of(&arena.default),
            default: arena.default.clone(),
            cameras,
        }
    }

    /// Action policy from the default `webcontrol_actions`
    pub async fn action_policy(&self) -> ActionPolicy {
        let arena = self.arena.read().await;
        ActionPolicy::parse(arena.default.text("webcontrol_actions").unwrap_or(""))
    }
}

fn ceiling_of(default: &ConfigContext) -> VisibilityTier {
    default
        .int("webcontrol_parms")
        .and_then(VisibilityTier::from_level)
        .unwrap_or(VisibilityTier::Never)
}

fn camera_not_found(index: CameraIndex) -> AppError {
    AppError::not_found(format!("Camera {index}")).with_resource_id(index.to_string())
}

fn summarize(index: CameraIndex, config: &ConfigContext) -> CameraSummary {
    let id = config.device_id();
    let name = match config.text("device_name") {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => format!("camera {id}"),
    };
    CameraSummary { index, id, name }
}

/// Re-send a command control after a Set that left its value unchanged
fn push_action(name: &str, config: &ConfigContext, slot: &CameraSlot, outcome: &mut EditOutcome) {
    if LiveControl::for_parameter(name).is_some_and(LiveControl::is_action) {
        push_live(name, config, slot, outcome);
    }
}

fn push_live(name: &str, config: &ConfigContext, slot: &CameraSlot, outcome: &mut EditOutcome) {
    let Some(control) = LiveControl::for_parameter(name) else {
        return;
    };
    match control.apply(config, slot.control.as_ref()) {
        Ok(()) => debug!(camera = %slot.index, ?control, "Live control updated"),
        Err(error) => {
            warn!(camera = %slot.index, ?control, error = %error, "Live control not applied");
            outcome.add_notice(format!("camera {}: {error}", slot.index));
        }
    }
}
