// ABOUTME: axum IntoResponse integration for AppError
// ABOUTME: Maps error codes to HTTP status and renders the JSON error envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use super::{AppError, ErrorResponse};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = ?self.code, error = %self.message, "Request failed");
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}
