// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Reads listen address, camera count and default-context seeds from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based server configuration

use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use motionctl_core::constants::{env_config, limits, paths, DEFAULT_HTTP_PORT};

use crate::registry::VisibilityTier;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Normal operation
    #[default]
    Info,
    /// Diagnostics
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    ///
    /// Only the first directive of an `EnvFilter` string is considered.
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        let first = s.split(',').next().unwrap_or_default();
        let level = first.rsplit('=').next().unwrap_or_default();
        match level.trim().to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Deployed device
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Process configuration assembled at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Log level summary of `RUST_LOG`
    pub log_level: LogLevel,
    /// Bind host
    pub host: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Root for served files and default mask directory
    pub target_dir: PathBuf,
    /// Remote-edit ceiling seeded into `webcontrol_parms`
    pub remote_tier: Option<VisibilityTier>,
    /// Cameras attached at startup
    pub cameras: usize,
    /// Seed for `webcontrol_actions`
    pub webcontrol_actions: Option<String>,
    /// Fixed CSRF token; generated when `None`
    pub csrf_token: Option<String>,
    /// Delay before a power operation runs
    pub power_delay_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: LogLevel::default(),
            host: "127.0.0.1".to_owned(),
            http_port: DEFAULT_HTTP_PORT,
            target_dir: PathBuf::from(paths::DEFAULT_TARGET_DIR),
            remote_tier: None,
            cameras: 1,
            webcontrol_actions: None,
            csrf_token: None,
            power_delay_secs: limits::POWER_DELAY_SECS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a numeric variable does not parse or the remote tier
    /// is outside 0-3
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let remote_tier = var(env_config::REMOTE_TIER)
            .map(|raw| {
                let level: i64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {} value", env_config::REMOTE_TIER))?;
                VisibilityTier::from_level(level).with_context(|| {
                    format!("{} must be between 0 and 3", env_config::REMOTE_TIER)
                })
            })
            .transpose()?;

        Ok(Self {
            environment: var(env_config::ENVIRONMENT)
                .map_or(defaults.environment, |raw| Environment::from_str_or_default(&raw)),
            log_level: var(env_config::LOG_LEVEL)
                .map_or(defaults.log_level, |raw| LogLevel::from_str_or_default(&raw)),
            host: var(env_config::HOST).unwrap_or(defaults.host),
            http_port: var(env_config::HTTP_PORT)
                .map(|raw| raw.trim().parse())
                .transpose()
                .context("Invalid HTTP_PORT value")?
                .unwrap_or(defaults.http_port),
            target_dir: var(env_config::TARGET_DIR).map_or(defaults.target_dir, PathBuf::from),
            remote_tier,
            cameras: var(env_config::CAMERAS)
                .map(|raw| raw.trim().parse())
                .transpose()
                .with_context(|| format!("Invalid {} value", env_config::CAMERAS))?
                .unwrap_or(defaults.cameras),
            webcontrol_actions: var(env_config::WEBCONTROL_ACTIONS),
            csrf_token: var(env_config::CSRF_TOKEN),
            power_delay_secs: var(env_config::POWER_DELAY_SECS)
                .map(|raw| raw.trim().parse())
                .transpose()
                .with_context(|| format!("Invalid {} value", env_config::POWER_DELAY_SECS))?
                .unwrap_or(defaults.power_delay_secs),
        })
    }

    /// Parameter values to seed into the default context before cameras attach
    #[must_use]
    pub fn default_overrides(&self) -> Vec<(String, String)> {
        let mut overrides = vec![(
            "target_dir".to_owned(),
            self.target_dir.display().to_string(),
        )];
        if let Some(tier) = self.remote_tier {
            overrides.push(("webcontrol_parms".to_owned(), tier.level().to_string()));
        }
        if let Some(actions) = &self.webcontrol_actions {
            overrides.push(("webcontrol_actions".to_owned(), actions.clone()));
        }
        overrides
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Motion Control Server Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Log Level: {}\n\
             - Target Dir: {}\n\
             - Cameras: {}\n\
             - Remote Tier: {}\n\
             - CSRF Token: {}\n\
             - Power Delay: {}s",
            self.environment,
            self.host,
            self.http_port,
            self.log_level,
            self.target_dir.display(),
            self.cameras,
            self.remote_tier
                .map_or_else(|| "catalog default".to_owned(), |tier| format!("{tier:?}")),
            if self.csrf_token.is_some() {
                "Fixed"
            } else {
                "Generated"
            },
            self.power_delay_secs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(
            LogLevel::from_str_or_default("motionctl=trace,hyper=warn"),
            LogLevel::Trace
        );
        assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert!(Environment::from_str_or_default("production").is_production());
        assert_eq!(
            Environment::from_str_or_default("anything"),
            Environment::Development
        );
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(config.default_overrides().len(), 1);
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HTTP_PORT", "9090"),
            ("MOTIONCTL_CAMERAS", "3"),
            ("MOTIONCTL_REMOTE_TIER", "2"),
            ("MOTIONCTL_WEBCONTROL_ACTIONS", "power=on"),
            ("MOTIONCTL_TARGET_DIR", "/srv/motion"),
        ]))
        .unwrap();
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.cameras, 3);
        assert_eq!(config.remote_tier, Some(VisibilityTier::Advanced));
        let overrides = config.default_overrides();
        assert!(overrides.contains(&("webcontrol_parms".to_owned(), "2".to_owned())));
        assert!(overrides.contains(&("webcontrol_actions".to_owned(), "power=on".to_owned())));
        assert!(overrides.contains(&("target_dir".to_owned(), "/srv/motion".to_owned())));
        assert!(config.summary().contains("Cameras: 3"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(ServerConfig::from_lookup(lookup(&[("HTTP_PORT", "eighty")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("MOTIONCTL_REMOTE_TIER", "7")])).is_err());
    }
}
