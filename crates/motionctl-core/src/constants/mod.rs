// ABOUTME: Application constants for the motionctl control plane
// ABOUTME: Service names, filesystem defaults, streaming limits and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Service identity used in logs
pub mod service_names {
    /// Name of the control plane server binary
    pub const MOTIONCTL_SERVER: &str = "motionctl-server";
    /// Crate name used for log filter directives
    pub const MOTIONCTL_CRATE: &str = "motionctl";
}

/// Filesystem defaults
pub mod paths {
    /// Where masks and recordings land when `target_dir` is empty
    pub const DEFAULT_TARGET_DIR: &str = "/var/lib/motion";
    /// Extension of persisted mask bitmaps
    pub const MASK_EXTENSION: &str = "pgm";
}

/// Limits applied to externally supplied input
pub mod limits {
    /// Chunk size for streamed file reads
    pub const FILE_CHUNK_SIZE: usize = 32 * 1024;
    /// Largest accepted mask width or height
    pub const MAX_MASK_DIMENSION: u32 = 9999;
    /// Highest assignable camera or peripheral device id
    pub const MAX_DEVICE_ID: i64 = 32000;
    /// Delay before a host power operation runs
    pub const POWER_DELAY_SECS: u64 = 2;
}

/// Parameter namespace rules
pub mod parameters {
    /// Prefix of stored query templates that are never remotely mutable
    pub const RESERVED_PREFIX: &str = "sql_";
    /// Placeholder allowed-set for list parameters the caller may not see
    pub const WITHHELD_LIST_TOKEN: &str = "na";
}

/// Environment variable names
pub mod env_config {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// HTTP bind host
    pub const HOST: &str = "HOST";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Log filter directive
    pub const LOG_LEVEL: &str = "RUST_LOG";
    /// Default mask/recording directory
    pub const TARGET_DIR: &str = "MOTIONCTL_TARGET_DIR";
    /// Remote-edit visibility ceiling (0-3)
    pub const REMOTE_TIER: &str = "MOTIONCTL_REMOTE_TIER";
    /// Number of cameras attached at startup
    pub const CAMERAS: &str = "MOTIONCTL_CAMERAS";
    /// Action policy (`key=value` list)
    pub const WEBCONTROL_ACTIONS: &str = "MOTIONCTL_WEBCONTROL_ACTIONS";
    /// Fixed CSRF token; generated when absent
    pub const CSRF_TOKEN: &str = "MOTIONCTL_CSRF_TOKEN";
    /// Seconds to wait before a power operation runs
    pub const POWER_DELAY_SECS: &str = "MOTIONCTL_POWER_DELAY_SECS";
}

/// Default listen port for the HTTP adapter
pub const DEFAULT_HTTP_PORT: u16 = 8080;
