// ABOUTME: Server binary exposing the camera configuration control plane over HTTP
// ABOUTME: Seeds the default context from the environment, attaches cameras and serves axum
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Motion Control Server Binary
//!
//! Starts the control plane with the configured number of cameras. Cameras are
//! attached with no live control surface; device drivers register their own
//! [`CameraControl`](motionctl::hot_reload::controls::CameraControl) when embedded.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use motionctl::{
    config::ServerConfig,
    hot_reload::{controls::NoControls, HotReloadController, Scope},
    logging,
    power::PowerController,
    registry::ParameterRegistry,
    routes::{self, AppState},
    security::CsrfTokenManager,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "motionctl-server")]
#[command(about = "Runtime configuration control plane for multi-camera motion devices")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the number of cameras attached at startup
    #[arg(long)]
    cameras: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(cameras) = args.cameras {
        config.cameras = cameras;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());

    let controller = Arc::new(HotReloadController::new(ParameterRegistry::shared()));
    for (name, value) in config.default_overrides() {
        let outcome = controller
            .apply_local(&name, &value, Scope::AllCameras)
            .await;
        if !outcome.status.is_success() {
            warn!(parameter = %name, status = ?outcome.status, "Startup override rejected");
        }
    }
    for _ in 0..config.cameras {
        let index = controller
            .attach_camera(None, &[], Arc::new(NoControls))
            .await
            .context("Failed to attach camera")?;
        info!(camera = %index, "Camera ready");
    }

    let csrf = config
        .csrf_token
        .clone()
        .map_or_else(CsrfTokenManager::new, CsrfTokenManager::with_token);
    let power = PowerController::new(Arc::clone(&controller))
        .with_delay(Duration::from_secs(config.power_delay_secs));
    let state = Arc::new(AppState::new(controller, csrf).with_power(power));
    let app = routes::router(state);

    let address = format!("{}:{}", config.host, config.http_port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(%address, "HTTP server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
