// ABOUTME: Integration tests for server configuration loaded from the process environment
// ABOUTME: Serialized because they mutate environment variables shared by the test binary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use serial_test::serial;

use motionctl::config::{Environment, ServerConfig};
use motionctl::hot_reload::{HotReloadController, Scope};
use motionctl::registry::{ParameterRegistry, VisibilityTier};
use motionctl_core::constants::env_config;

const ALL_KEYS: [&str; 9] = [
    env_config::HTTP_PORT,
    env_config::HOST,
    env_config::ENVIRONMENT,
    env_config::TARGET_DIR,
    env_config::REMOTE_TIER,
    env_config::CAMERAS,
    env_config::WEBCONTROL_ACTIONS,
    env_config::CSRF_TOKEN,
    env_config::POWER_DELAY_SECS,
];

fn clear_environment() {
    for key in ALL_KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_environment();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8080);
    assert_eq!(config.target_dir, PathBuf::from("/var/lib/motion"));
    assert_eq!(config.remote_tier, None);
    assert!(config.csrf_token.is_none());
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_environment();
    env::set_var(env_config::HTTP_PORT, "9191");
    env::set_var(env_config::ENVIRONMENT, "production");
    env::set_var(env_config::REMOTE_TIER, "2");
    env::set_var(env_config::CAMERAS, "3");
    env::set_var(env_config::CSRF_TOKEN, "fixed-token");

    let config = ServerConfig::from_env().unwrap();
    clear_environment();

    assert_eq!(config.http_port, 9191);
    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.remote_tier, Some(VisibilityTier::Advanced));
    assert_eq!(config.cameras, 3);
    assert_eq!(config.csrf_token.as_deref(), Some("fixed-token"));
    assert!(!config.summary().contains("fixed-token"));
}

#[test]
#[serial]
fn test_invalid_values_are_errors() {
    clear_environment();
    env::set_var(env_config::REMOTE_TIER, "7");
    assert!(ServerConfig::from_env().is_err());

    env::set_var(env_config::REMOTE_TIER, "1");
    env::set_var(env_config::HTTP_PORT, "not-a-port");
    assert!(ServerConfig::from_env().is_err());
    clear_environment();
}

#[tokio::test]
#[serial]
async fn test_overrides_seed_the_default_context() {
    clear_environment();
    env::set_var(env_config::TARGET_DIR, "/srv/motion/");
    env::set_var(env_config::REMOTE_TIER, "2");
    env::set_var(env_config::WEBCONTROL_ACTIONS, "power=on");
    let config = ServerConfig::from_env().unwrap();
    clear_environment();

    common::init_test_logging();
    let controller = Arc::new(HotReloadController::new(ParameterRegistry::shared()));
    for (name, value) in config.default_overrides() {
        let outcome = controller.apply_local(&name, &value, Scope::AllCameras).await;
        assert!(outcome.status.is_success(), "{name}: {outcome:?}");
    }

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.default.text("target_dir"), Some("/srv/motion"));
    assert_eq!(snapshot.ceiling, VisibilityTier::Advanced);
    assert!(controller.action_policy().await.is_enabled("power"));
}
