// ABOUTME: File download route streaming recorded files from a camera's target directory
// ABOUTME: Every rejection surfaces as the same not-found response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use motionctl_core::constants::paths::DEFAULT_TARGET_DIR;

use super::{requester, resolve_camera, AppState};
use crate::errors::AppError;
use crate::files::{FileRequest, FileService};

/// File download routes
pub struct FileRoutes;

impl FileRoutes {
    /// Create the file routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/:cam/files/*identifier", get(Self::handle_download))
            .with_state(state)
    }

    /// Handle a file download
    async fn handle_download(
        State(state): State<Arc<AppState>>,
        Path((cam, identifier)): Path<(i64, String)>,
        connect: Option<ConnectInfo<SocketAddr>>,
    ) -> Result<Response, AppError> {
        let requester = requester(connect.as_ref());
        let camera = resolve_camera(&state, cam)
            .await
            .map_err(|_| AppError::not_found("File"))?;
        let config = state.controller.camera_config(camera).await?;
        let root = match config.text("target_dir") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(DEFAULT_TARGET_DIR),
        };
        let policy = state.controller.action_policy().await;

        let request = FileRequest {
            identifier: &identifier,
            root: &root,
            requester: requester.as_deref(),
        };
        let stream = FileService::open(&request, &policy).await?;
        let file_name = stream
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().replace('"', ""))
            .unwrap_or_default();

        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
                (header::CONTENT_LENGTH, stream.size().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{file_name}\""),
                ),
            ],
            Body::from_stream(stream.into_stream()),
        )
            .into_response())
    }
}
