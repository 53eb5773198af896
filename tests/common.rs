// ABOUTME: Shared test utilities for the control plane integration tests
// ABOUTME: Quiet logging, a recording camera control and controller/router builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Mutex, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde::Serialize;
use tower::ServiceExt;

use motionctl::context::CameraIndex;
use motionctl::hot_reload::controls::{CameraControl, ControlError, ControlResult};
use motionctl::hot_reload::{HotReloadController, Scope};
use motionctl::registry::ParameterRegistry;
use motionctl::routes::{self, AppState, CSRF_HEADER};
use motionctl::security::CsrfTokenManager;

/// Token used by every test router
pub const TEST_CSRF_TOKEN: &str = "0123456789abcdef0123456789abcdef";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// A setter call observed by [`RecordingControl`]
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCall {
    Brightness(f64),
    Iso(f64),
    ColourGains(f64, f64),
    AfTrigger,
    AfCancel,
}

/// Camera control that records brightness, ISO, gains and autofocus calls
///
/// Everything else keeps the default `Unsupported` behavior. When `refuse` is
/// set, brightness changes are rejected by the "device".
#[derive(Debug, Default)]
pub struct RecordingControl {
    calls: Mutex<Vec<ControlCall>>,
    refuse_brightness: bool,
}

impl RecordingControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing_brightness() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            refuse_brightness: true,
        })
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ControlCall) -> ControlResult {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl CameraControl for RecordingControl {
    fn set_brightness(&self, value: f64) -> ControlResult {
        if self.refuse_brightness {
            return Err(ControlError::Device {
                control: "brightness",
                reason: "sensor busy".to_owned(),
            });
        }
        self.record(ControlCall::Brightness(value))
    }

    fn set_iso(&self, value: f64) -> ControlResult {
        self.record(ControlCall::Iso(value))
    }

    fn set_colour_gains(&self, red: f64, blue: f64) -> ControlResult {
        self.record(ControlCall::ColourGains(red, blue))
    }

    fn trigger_af_scan(&self) -> ControlResult {
        self.record(ControlCall::AfTrigger)
    }

    fn cancel_af_scan(&self) -> ControlResult {
        self.record(ControlCall::AfCancel)
    }
}

/// Controller over the builtin catalog with the remote ceiling at `level`
pub async fn create_test_controller(level: i64) -> Arc<HotReloadController> {
    init_test_logging();
    let controller = Arc::new(HotReloadController::new(ParameterRegistry::shared()));
    let outcome = controller
        .apply_local("webcontrol_parms", &level.to_string(), Scope::AllCameras)
        .await;
    assert!(outcome.status.is_success(), "ceiling not set: {outcome:?}");
    controller
}

/// Attach a camera with `device_id` and a recording control
pub async fn attach_recording_camera(
    controller: &HotReloadController,
    device_id: i64,
) -> (CameraIndex, Arc<RecordingControl>) {
    let control = RecordingControl::new();
    let index = controller
        .attach_camera(Some(device_id), &[], control.clone())
        .await
        .unwrap();
    (index, control)
}

/// Router over `controller` with the fixed test token
pub fn create_test_router(controller: Arc<HotReloadController>) -> Router {
    let state = AppState::new(controller, CsrfTokenManager::with_token(TEST_CSRF_TOKEN));
    routes::router(Arc::new(state))
}

/// Helper to build and execute HTTP requests against the router
pub struct TestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl TestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn patch(uri: &str) -> Self {
        Self::new(Method::PATCH, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Attach the valid CSRF token
    pub fn csrf(self) -> Self {
        self.header(CSRF_HEADER, TEST_CSRF_TOKEN)
    }

    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).expect("Failed to serialize JSON"));
        self.headers.push((
            header::CONTENT_TYPE.as_str().to_owned(),
            "application/json".to_owned(),
        ));
        self
    }

    /// Attach a literal JSON body, preserving key order exactly as written
    pub fn raw_json(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self.headers.push((
            header::CONTENT_TYPE.as_str().to_owned(),
            "application/json".to_owned(),
        ));
        self
    }

    pub async fn send(self, app: Router) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }
        let request = builder
            .body(Body::from(self.body.unwrap_or_default()))
            .expect("Failed to build request");

        let response = app
            .oneshot(request)
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Eagerly read response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Failed to deserialize JSON response")
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
