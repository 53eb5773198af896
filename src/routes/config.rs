// ABOUTME: Configuration route handlers for parameter reads, single edits and batch updates
// ABOUTME: Serves the configuration document and maps edit outcomes onto HTTP statuses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration routes
//!
//! Reads need no token. `POST /:cam/config/set` and `PATCH /:cam/config` require
//! the CSRF header. A batch body is a JSON object whose members are applied in
//! the order they appear.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use super::{outcome_response, require_csrf, requester, resolve_scope, AppState};
use crate::dispatch::{EditAction, EditOutcome};
use crate::document::ConfigDocument;
use crate::errors::AppError;

/// Body of `POST /:cam/config/set`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// Parameter name
    pub name: String,
    /// Raw value; numbers and booleans are accepted and converted
    #[serde(deserialize_with = "raw_value")]
    pub value: String,
}

/// Body of `PATCH /:cam/config`: parameter/value pairs in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRequest(pub Vec<(String, String)>);

impl<'de> Deserialize<'de> for BatchRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedPairs;

        impl<'de> Visitor<'de> for OrderedPairs {
            type Value = BatchRequest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of parameter names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, Value>()? {
                    pairs.push((name, stringify(value).map_err(de::Error::custom)?));
                }
                Ok(BatchRequest(pairs))
            }
        }

        deserializer.deserialize_map(OrderedPairs)
    }
}

fn raw_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    stringify(Value::deserialize(deserializer)?).map_err(de::Error::custom)
}

fn stringify(value: Value) -> Result<String, &'static str> {
    match value {
        Value::String(text) => Ok(text),
        Value::Bool(true) => Ok("on".to_owned()),
        Value::Bool(false) => Ok("off".to_owned()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err("parameter values must be scalars"),
    }
}

/// Configuration routes
pub struct ConfigRoutes;

impl ConfigRoutes {
    /// Create all configuration routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/config", get(Self::handle_document))
            .route("/:cam/config", patch(Self::handle_batch))
            .route("/:cam/config/set", post(Self::handle_set))
            .route("/:cam/config/:name", get(Self::handle_get))
            .route("/:cam/config/:name/list", get(Self::handle_list))
            .with_state(state)
    }

    /// Handle the full configuration document
    async fn handle_document(State(state): State<Arc<AppState>>) -> Response {
        let snapshot = state.controller.snapshot().await;
        let document = ConfigDocument::build(
            state.controller.engine().registry(),
            &snapshot,
            Some(state.csrf.token()),
        );
        (StatusCode::OK, Json(document)).into_response()
    }

    /// Handle a single parameter read
    async fn handle_get(
        State(state): State<Arc<AppState>>,
        Path((cam, name)): Path<(i64, String)>,
    ) -> Result<Response, AppError> {
        let scope = resolve_scope(&state, cam).await?;
        Ok(outcome_response(state.controller.get(&name, scope).await))
    }

    /// Handle the allowed tokens of a list parameter
    async fn handle_list(
        State(state): State<Arc<AppState>>,
        Path((cam, name)): Path<(i64, String)>,
    ) -> Result<Response, AppError> {
        let scope = resolve_scope(&state, cam).await?;
        let outcome = state
            .controller
            .read(&name, EditAction::ListAllowed, scope)
            .await;
        Ok(outcome_response(outcome))
    }

    /// Handle a single edit
    async fn handle_set(
        State(state): State<Arc<AppState>>,
        Path(cam): Path<i64>,
        connect: Option<ConnectInfo<SocketAddr>>,
        headers: HeaderMap,
        Json(request): Json<SetRequest>,
    ) -> Result<Response, AppError> {
        let requester = requester(connect.as_ref());
        require_csrf(&state, &headers, requester.as_deref(), "set")?;
        let scope = resolve_scope(&state, cam).await?;
        let outcome: EditOutcome = match requester.as_deref() {
            Some(addr) => {
                state
                    .controller
                    .apply_as(addr, &request.name, &request.value, scope)
                    .await
            }
            None => {
                state
                    .controller
                    .apply(&request.name, &request.value, scope)
                    .await
            }
        };
        Ok(outcome_response(outcome))
    }

    /// Handle a batch update
    async fn handle_batch(
        State(state): State<Arc<AppState>>,
        Path(cam): Path<i64>,
        connect: Option<ConnectInfo<SocketAddr>>,
        headers: HeaderMap,
        Json(BatchRequest(entries)): Json<BatchRequest>,
    ) -> Result<Response, AppError> {
        let requester = requester(connect.as_ref());
        require_csrf(&state, &headers, requester.as_deref(), "batch")?;
        let scope = resolve_scope(&state, cam).await?;
        let report = match requester.as_deref() {
            Some(addr) => state.controller.apply_batch_as(addr, &entries, scope).await,
            None => state.controller.apply_batch(&entries, scope).await,
        };
        Ok((StatusCode::OK, Json(report)).into_response())
    }
}
