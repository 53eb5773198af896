// ABOUTME: Per-camera motion and privacy masks rasterized from polygons and persisted as PGM
// ABOUTME: Writes happen outside the config lock; the resulting path is recorded through the controller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Polygon scanline rasterizer and PGM codec
pub mod raster;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use motionctl_core::constants::paths::{DEFAULT_TARGET_DIR, MASK_EXTENSION};

use crate::context::{CameraIndex, ConfigContext};
use crate::errors::{AppError, AppResult};
use crate::files::{FileRequest, ResolveError, SecureFileResolver};
use crate::hot_reload::{HotReloadController, Scope};
use crate::security::actions::ACTION_DELETE;
use crate::security::{AuditEvent, AuditEventType, AuditSeverity};
pub use raster::{MaskBitmap, MaskRequest, PgmHeader, Point};

const HEADER_PROBE_BYTES: u64 = 512;

/// Which mask of a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskKind {
    /// Excludes regions from motion detection
    Motion,
    /// Blanks regions in every output image
    Privacy,
}

impl MaskKind {
    /// Parameter that records the mask path
    #[must_use]
    pub const fn parameter(self) -> &'static str {
        match self {
            Self::Motion => "mask_file",
            Self::Privacy => "mask_privacy",
        }
    }

    /// Lowercase name used in paths and URLs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Motion => "motion",
            Self::Privacy => "privacy",
        }
    }
}

impl fmt::Display for MaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaskKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motion" => Ok(Self::Motion),
            "privacy" => Ok(Self::Privacy),
            other => Err(AppError::invalid_input(format!(
                "Invalid mask type '{other}'. Use 'motion' or 'privacy'"
            ))),
        }
    }
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskSaved {
    /// Where the bitmap was written
    pub path: String,
    /// Bitmap width
    pub width: u32,
    /// Bitmap height
    pub height: u32,
    /// Operator hint
    pub message: String,
}

/// What is known about a configured mask
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskInfo {
    /// Mask kind
    #[serde(rename = "type")]
    pub kind: MaskKind,
    /// A readable file is configured
    pub exists: bool,
    /// Configured path, empty when none
    pub path: String,
    /// Width from the file header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height from the file header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Why a configured file could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskDeleted {
    /// A file was actually removed
    pub deleted: bool,
    /// Operator hint
    pub message: String,
}

/// Deterministic location of a camera's mask: `<target_dir>/cam<id>_<kind>.pgm`
#[must_use]
pub fn mask_path(config: &ConfigContext, kind: MaskKind) -> PathBuf {
    let target = match config.text("target_dir") {
        Some(dir) if !dir.is_empty() => dir,
        _ => DEFAULT_TARGET_DIR,
    };
    let target = target.strip_suffix('/').unwrap_or(target);
    PathBuf::from(format!(
        "{target}/cam{}_{kind}.{MASK_EXTENSION}",
        config.device_id()
    ))
}

/// Saves, inspects and removes camera masks
pub struct MaskService {
    controller: Arc<HotReloadController>,
}

impl MaskService {
    /// Service recording mask paths through `controller`
    #[must_use]
    pub const fn new(controller: Arc<HotReloadController>) -> Self {
        Self { controller }
    }

    /// Rasterize `request`, write it and record its path on the camera
    ///
    /// # Errors
    ///
    /// Validation errors for bad dimensions, `NotFound` for an unknown camera and
    /// `StorageError` when the file cannot be written; no configuration changes
    /// on any error
    pub async fn save(
        &self,
        camera: CameraIndex,
        kind: MaskKind,
        request: MaskRequest,
        requester: Option<&str>,
    ) -> AppResult<MaskSaved> {
        request.validate()?;
        let config = self.controller.camera_config(camera).await?;
        let path = mask_path(&config, kind);

        let bitmap = tokio::task::spawn_blocking(move || request.rasterize())
            .await
            .map_err(|e| AppError::internal(format!("Mask rasterization task failed: {e}")))??;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| write_failed(&path, e))?;
        }
        fs::write(&path, bitmap.to_pgm_bytes())
            .await
            .map_err(|e| write_failed(&path, e))?;

        let recorded = path.display().to_string();
        let outcome = self
            .controller
            .apply_local(kind.parameter(), &recorded, Scope::SingleCamera(camera))
            .await;
        if !outcome.status.is_success() {
            let reason = outcome
                .error
                .map_or_else(|| format!("{:?}", outcome.status), |error| error.message);
            return Err(AppError::internal(format!(
                "Mask written to {recorded} but not recorded: {reason}"
            )));
        }

        info!(
            camera = %camera,
            kind = %kind,
            path = %recorded,
            width = bitmap.width(),
            height = bitmap.height(),
            "Mask saved"
        );
        audit(kind, camera, requester, "save", &recorded);
        Ok(MaskSaved {
            path: recorded,
            width: bitmap.width(),
            height: bitmap.height(),
            message: "Mask saved. Reload camera to apply.".to_owned(),
        })
    }

    /// Configured mask of `camera` with its dimensions
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown camera
    pub async fn info(&self, camera: CameraIndex, kind: MaskKind) -> AppResult<MaskInfo> {
        let config = self.controller.camera_config(camera).await?;
        let path = config.text(kind.parameter()).unwrap_or_default().to_owned();
        let mut info = MaskInfo {
            kind,
            exists: false,
            path,
            width: None,
            height: None,
            error: None,
        };
        if info.path.is_empty() {
            return Ok(info);
        }
        match read_header(Path::new(&info.path)).await {
            Ok(header) => {
                info.exists = true;
                info.width = header.map(|h| h.width);
                info.height = header.map(|h| h.height);
            }
            Err(error) => {
                warn!(camera = %camera, path = %info.path, error = %error, "Mask file not accessible");
                info.error = Some("File not accessible".to_owned());
            }
        }
        Ok(info)
    }

    /// Remove the mask file and clear the parameter
    ///
    /// Only the file this service writes for `camera` and `kind` is ever
    /// removed. The parameter is cleared on the camera and in the default
    /// context.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` when the `delete` action is disabled, `NotFound` for an
    /// unknown camera and `SecurityViolation` when the recorded path is not the
    /// camera's own mask file
    pub async fn delete(
        &self,
        camera: CameraIndex,
        kind: MaskKind,
        requester: Option<&str>,
    ) -> AppResult<MaskDeleted> {
        if !self.controller.action_policy().await.is_enabled(ACTION_DELETE) {
            return Err(AppError::permission_denied("Mask deletion is disabled"));
        }
        let config = self.controller.camera_config(camera).await?;
        let path = config.text(kind.parameter()).unwrap_or_default().to_owned();

        let mut deleted = false;
        if !path.is_empty() {
            let expected = mask_path(&config, kind);
            if Path::new(&path) != expected.as_path() {
                blocked(camera, kind, requester, &path, "recorded path is not the camera mask file");
                return Err(AppError::security("Invalid path"));
            }
            deleted = remove_mask(camera, kind, requester, &expected).await?;
        }

        for scope in [Scope::SingleCamera(camera), Scope::DefaultOnly] {
            let outcome = self
                .controller
                .apply_local(kind.parameter(), "", scope)
                .await;
            if !outcome.status.is_success() {
                warn!(camera = %camera, kind = %kind, ?scope, status = ?outcome.status, "Mask parameter not cleared");
            }
        }
        audit(kind, camera, requester, "delete", &path);
        Ok(MaskDeleted {
            deleted,
            message: "Mask removed. Reload camera to apply.".to_owned(),
        })
    }
}

/// Remove `path` after resolving it under its own directory
///
/// A symlink at the mask location that points elsewhere is refused.
async fn remove_mask(
    camera: CameraIndex,
    kind: MaskKind,
    requester: Option<&str>,
    path: &Path,
) -> AppResult<bool> {
    let (Some(root), Some(file_name)) = (path.parent(), path.file_name().and_then(|n| n.to_str()))
    else {
        return Ok(false);
    };
    let request = FileRequest {
        identifier: file_name,
        root,
        requester,
    };
    let resolved = match SecureFileResolver::resolve(&request).await {
        Ok(resolved) => resolved,
        Err(ResolveError::Traversal { resolved }) => {
            blocked(
                camera,
                kind,
                requester,
                &resolved.display().to_string(),
                "mask file resolves outside its directory",
            );
            return Err(AppError::security("Invalid path"));
        }
        Err(_) => return Ok(false),
    };
    match fs::remove_file(&resolved.path).await {
        Ok(()) => {
            info!(camera = %camera, kind = %kind, path = %resolved.path.display(), "Mask file deleted");
            Ok(true)
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => {
            warn!(camera = %camera, path = %resolved.path.display(), error = %error, "Failed to delete mask file");
            Ok(false)
        }
    }
}

fn blocked(camera: CameraIndex, kind: MaskKind, requester: Option<&str>, path: &str, reason: &str) {
    AuditEvent::new(
        AuditEventType::PathTraversalBlocked,
        AuditSeverity::Critical,
        "Mask deletion outside the mask location blocked",
        "delete",
        "denied",
    )
    .with_source_ip(requester)
    .with_resource(format!("mask:{camera}:{kind}"))
    .with_metadata(serde_json::json!({ "path": path, "reason": reason }))
    .emit();
}

fn write_failed(path: &Path, error: io::Error) -> AppError {
    warn!(path = %path.display(), error = %error, "Cannot write mask file");
    AppError::storage(format!("Cannot write mask file {}", path.display())).with_source(error)
}

async fn read_header(path: &Path) -> io::Result<Option<PgmHeader>> {
    let file = fs::File::open(path).await?;
    let mut probe = Vec::new();
    file.take(HEADER_PROBE_BYTES).read_to_end(&mut probe).await?;
    Ok(PgmHeader::parse(&probe))
}

fn audit(kind: MaskKind, camera: CameraIndex, requester: Option<&str>, action: &str, path: &str) {
    AuditEvent::new(
        AuditEventType::MaskChanged,
        AuditSeverity::Info,
        format!("{kind} mask {action}"),
        action,
        "success",
    )
    .with_source_ip(requester)
    .with_resource(format!("mask:{camera}:{kind}"))
    .with_metadata(serde_json::json!({ "path": path }))
    .emit();
}
