// ABOUTME: Mask route handlers for reading, saving and deleting per-camera masks
// ABOUTME: Saving and deleting require the CSRF header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::{require_csrf, requester, resolve_camera, AppState};
use crate::errors::AppError;
use crate::mask::{MaskKind, MaskRequest};

/// Mask routes
pub struct MaskRoutes;

impl MaskRoutes {
    /// Create the mask routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route(
                "/:cam/mask/:kind",
                get(Self::handle_info)
                    .post(Self::handle_save)
                    .delete(Self::handle_delete),
            )
            .with_state(state)
    }

    /// Handle mask information
    async fn handle_info(
        State(state): State<Arc<AppState>>,
        Path((cam, kind)): Path<(i64, String)>,
    ) -> Result<Response, AppError> {
        let kind: MaskKind = kind.parse()?;
        let camera = resolve_camera(&state, cam).await?;
        let info = state.masks.info(camera, kind).await?;
        Ok((StatusCode::OK, Json(info)).into_response())
    }

    /// Handle a mask save
    async fn handle_save(
        State(state): State<Arc<AppState>>,
        Path((cam, kind)): Path<(i64, String)>,
        connect: Option<ConnectInfo<SocketAddr>>,
        headers: HeaderMap,
        Json(request): Json<MaskRequest>,
    ) -> Result<Response, AppError> {
        let requester = requester(connect.as_ref());
        require_csrf(&state, &headers, requester.as_deref(), "mask_save")?;
        let kind: MaskKind = kind.parse()?;
        let camera = resolve_camera(&state, cam).await?;
        let saved = state
            .masks
            .save(camera, kind, request, requester.as_deref())
            .await?;
        Ok((StatusCode::OK, Json(saved)).into_response())
    }

    /// Handle a mask delete
    async fn handle_delete(
        State(state): State<Arc<AppState>>,
        Path((cam, kind)): Path<(i64, String)>,
        connect: Option<ConnectInfo<SocketAddr>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let requester = requester(connect.as_ref());
        require_csrf(&state, &headers, requester.as_deref(), "mask_delete")?;
        let kind: MaskKind = kind.parse()?;
        let camera = resolve_camera(&state, cam).await?;
        let deleted = state
            .masks
            .delete(camera, kind, requester.as_deref())
            .await?;
        Ok((StatusCode::OK, Json(deleted)).into_response())
    }
}
