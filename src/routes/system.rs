// ABOUTME: Host power route scheduling reboot or shutdown behind the action policy
// ABOUTME: Only addressed through camera 0; responds before the operation runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::{require_csrf, requester, AppState};
use crate::errors::AppError;
use crate::power::PowerOperation;

/// Host power routes
pub struct SystemRoutes;

impl SystemRoutes {
    /// Create the system routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/:cam/system/:operation", post(Self::handle_power))
            .with_state(state)
    }

    /// Handle a reboot or shutdown request
    async fn handle_power(
        State(state): State<Arc<AppState>>,
        Path((cam, operation)): Path<(i64, String)>,
        connect: Option<ConnectInfo<SocketAddr>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let requester = requester(connect.as_ref());
        require_csrf(&state, &headers, requester.as_deref(), "power")?;
        if cam != 0 {
            return Err(AppError::not_found(format!("System operation for camera {cam}")));
        }
        let operation: PowerOperation = operation.parse()?;
        let (scheduled, _handle) = state
            .power
            .schedule(operation, requester.as_deref())
            .await?;
        Ok((StatusCode::ACCEPTED, Json(scheduled)).into_response())
    }
}
