// ABOUTME: Route module organization for the control plane HTTP adapter
// ABOUTME: Shared application state, camera path resolution, CSRF checks and the router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the controller and services. The camera path segment is a device
//! id; `0` addresses the default context and every camera at once.

/// Parameter read, edit and document routes
pub mod config;
/// Recorded file download routes
pub mod files;
/// Motion and privacy mask routes
pub mod mask;
/// Host power routes
pub mod system;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::context::CameraIndex;
use crate::dispatch::{EditOutcome, EditStatus};
use crate::errors::{AppError, AppResult};
use crate::hot_reload::{HotReloadController, Scope};
use crate::mask::MaskService;
use crate::power::PowerController;
use crate::security::{AuditEvent, AuditEventType, AuditSeverity, CsrfTokenManager};
pub use config::ConfigRoutes;
pub use files::FileRoutes;
pub use mask::MaskRoutes;
pub use system::SystemRoutes;

/// Header carrying the CSRF token on state-changing requests
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Everything the handlers share
pub struct AppState {
    /// Configuration controller
    pub controller: Arc<HotReloadController>,
    /// Mask persistence
    pub masks: MaskService,
    /// Host power scheduling
    pub power: PowerController,
    /// Process CSRF token
    pub csrf: CsrfTokenManager,
}

impl AppState {
    /// State with services wired to `controller`
    #[must_use]
    pub fn new(controller: Arc<HotReloadController>, csrf: CsrfTokenManager) -> Self {
        Self {
            masks: MaskService::new(Arc::clone(&controller)),
            power: PowerController::new(Arc::clone(&controller)),
            controller,
            csrf,
        }
    }

    /// Replace the power controller
    #[must_use]
    pub fn with_power(mut self, power: PowerController) -> Self {
        self.power = power;
        self
    }
}

/// Complete router with request tracing
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(ConfigRoutes::routes(Arc::clone(&state)))
        .merge(FileRoutes::routes(Arc::clone(&state)))
        .merge(MaskRoutes::routes(Arc::clone(&state)))
        .merge(SystemRoutes::routes(state))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %format!("req_{}", Uuid::new_v4().simple()),
                )
            }),
        )
}

/// Source address of the request, when the server recorded it
pub(crate) fn requester(connect: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    connect.map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// Reject state-changing requests without the process token
pub(crate) fn require_csrf(
    state: &AppState,
    headers: &HeaderMap,
    requester: Option<&str>,
    action: &str,
) -> AppResult<()> {
    let candidate = headers.get(CSRF_HEADER).and_then(|value| value.to_str().ok());
    state.csrf.validate_token(candidate).inspect_err(|error| {
        AuditEvent::new(
            AuditEventType::IntegrityCheckFailed,
            AuditSeverity::Warning,
            "Request integrity check failed",
            action,
            "denied",
        )
        .with_source_ip(requester)
        .with_metadata(serde_json::json!({ "reason": error.message }))
        .emit();
    })
}

/// Scope addressed by a camera path segment
pub(crate) async fn resolve_scope(state: &AppState, camera: i64) -> AppResult<Scope> {
    if camera == 0 {
        return Ok(Scope::AllCameras);
    }
    resolve_camera(state, camera).await.map(Scope::SingleCamera)
}

/// Camera addressed by a camera path segment; `0` is not a camera
pub(crate) async fn resolve_camera(state: &AppState, camera: i64) -> AppResult<CameraIndex> {
    if camera == 0 {
        return Err(AppError::invalid_input("Camera not specified"));
    }
    state
        .controller
        .find_camera(camera)
        .await
        .ok_or_else(|| AppError::not_found(format!("Camera {camera}")))
}

/// HTTP status for an edit outcome
pub(crate) const fn outcome_status(status: EditStatus) -> StatusCode {
    match status {
        EditStatus::Applied | EditStatus::Unchanged | EditStatus::Read => StatusCode::OK,
        EditStatus::NotFound => StatusCode::NOT_FOUND,
        EditStatus::RejectedPermission | EditStatus::RejectedSecurity => StatusCode::FORBIDDEN,
        EditStatus::RejectedValidation => StatusCode::BAD_REQUEST,
        EditStatus::RejectedConflict => StatusCode::CONFLICT,
    }
}

/// Outcome as a JSON response with a matching status
pub(crate) fn outcome_response(outcome: EditOutcome) -> Response {
    (outcome_status(outcome.status), Json(outcome)).into_response()
}
