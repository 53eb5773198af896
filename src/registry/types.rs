// ABOUTME: Type definitions for the camera parameter registry
// ABOUTME: Parameter types, categories, visibility tiers, value specs and stored values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

use motionctl_core::constants::parameters::RESERVED_PREFIX;

/// Data type for configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// on/off flag
    Bool,
    /// Signed integer with inclusive bounds
    Int,
    /// Floating point number with inclusive bounds
    Float,
    /// Free text
    String,
    /// One token out of a fixed allowed set
    List,
    /// Structured `key=value` blob
    Params,
}

impl ParameterType {
    /// Display name used by clients
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Params => "params",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display grouping of parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Process-level settings
    System,
    /// Camera identity and timeouts
    Camera,
    /// Capture source (v4l2, network, libcamera)
    Source,
    /// Frame geometry and orientation
    Image,
    /// Text and motion overlays
    Overlay,
    /// Detection method thresholds
    Method,
    /// Mask and noise handling
    Masks,
    /// Event detection timing
    Detect,
    /// External commands run on events
    Scripts,
    /// Still picture output
    Picture,
    /// Movie output
    Movies,
    /// Timelapse output
    Timelapse,
    /// Loopback video pipes
    Pipes,
    /// Web control listener
    WebControl,
    /// Live streams
    Streams,
    /// Database connection
    Database,
    /// Stored query templates
    Sql,
    /// Pan/tilt/zoom tracking
    Tracking,
    /// Sound devices
    Sound,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Self; 19] = [
        Self::System,
        Self::Camera,
        Self::Source,
        Self::Image,
        Self::Overlay,
        Self::Method,
        Self::Masks,
        Self::Detect,
        Self::Scripts,
        Self::Picture,
        Self::Movies,
        Self::Timelapse,
        Self::Pipes,
        Self::WebControl,
        Self::Streams,
        Self::Database,
        Self::Sql,
        Self::Tracking,
        Self::Sound,
    ];

    /// Machine name
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Camera => "camera",
            Self::Source => "source",
            Self::Image => "image",
            Self::Overlay => "overlay",
            Self::Method => "method",
            Self::Masks => "masks",
            Self::Detect => "detect",
            Self::Scripts => "scripts",
            Self::Picture => "picture",
            Self::Movies => "movies",
            Self::Timelapse => "timelapse",
            Self::Pipes => "pipes",
            Self::WebControl => "webcontrol",
            Self::Streams => "streams",
            Self::Database => "database",
            Self::Sql => "sql",
            Self::Tracking => "tracking",
            Self::Sound => "sound",
        }
    }

    /// Human readable name
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Camera => "Camera",
            Self::Source => "Source",
            Self::Image => "Image",
            Self::Overlay => "Overlays",
            Self::Method => "Method",
            Self::Masks => "Masks",
            Self::Detect => "Detection",
            Self::Scripts => "Scripts",
            Self::Picture => "Picture",
            Self::Movies => "Movies",
            Self::Timelapse => "Timelapse",
            Self::Pipes => "Pipes",
            Self::WebControl => "Web Control",
            Self::Streams => "Web Stream",
            Self::Database => "Database",
            Self::Sql => "SQL",
            Self::Tracking => "Tracking",
            Self::Sound => "Sound",
        }
    }

    /// Position in [`Category::ALL`]
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

/// Ordered visibility tier of a parameter
///
/// `Restricted` parameters are never remotely editable whatever the configured
/// ceiling is. `Never` parameters are not even listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityTier {
    /// Hidden from every remote listing
    Never = 0,
    /// Everyday controls
    Limited = 1,
    /// Tuning controls
    Advanced = 2,
    /// Process and security sensitive
    Restricted = 3,
}

impl VisibilityTier {
    /// Parse the numeric level used by `webcontrol_parms`
    #[must_use]
    pub const fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Self::Never),
            1 => Some(Self::Limited),
            2 => Some(Self::Advanced),
            3 => Some(Self::Restricted),
            _ => None,
        }
    }

    /// Numeric level
    #[must_use]
    pub const fn level(&self) -> i64 {
        *self as i64
    }
}

/// Parameters whose rules go beyond their plain type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomHandler {
    /// Identifier must be unique across cameras and peripherals
    DeviceId,
    /// List with legacy boolean spellings
    Pause,
    /// Trailing separators are stripped
    TargetDir,
    /// strftime template expanded at assignment
    LogFile,
    /// Leading separators are stripped
    FilenameTemplate,
    /// Right angles only
    Rotate,
}

/// Typed value specification of a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueSpec {
    /// on/off flag
    Bool {
        /// Default value
        default: bool,
    },
    /// Integer with inclusive bounds
    Int {
        /// Default value
        default: i64,
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound
        max: i64,
    },
    /// Float with inclusive bounds
    Float {
        /// Default value
        default: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },
    /// Free text
    String {
        /// Default value
        default: &'static str,
    },
    /// Token from a fixed set
    List {
        /// Default token
        default: &'static str,
        /// Accepted tokens, case-sensitive
        allowed: &'static [&'static str],
    },
    /// `key=value` blob
    Params {
        /// Default blob
        default: &'static str,
    },
}

impl ValueSpec {
    /// Parameter type of this spec
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        match self {
            Self::Bool { .. } => ParameterType::Bool,
            Self::Int { .. } => ParameterType::Int,
            Self::Float { .. } => ParameterType::Float,
            Self::String { .. } => ParameterType::String,
            Self::List { .. } => ParameterType::List,
            Self::Params { .. } => ParameterType::Params,
        }
    }

    /// Default as a stored value
    #[must_use]
    pub fn default_value(&self) -> ParamValue {
        match *self {
            Self::Bool { default } => ParamValue::Bool(default),
            Self::Int { default, .. } => ParamValue::Int(default),
            Self::Float { default, .. } => ParamValue::Float(default),
            Self::String { default }
            | Self::List { default, .. }
            | Self::Params { default } => ParamValue::Text(default.to_owned()),
        }
    }
}

/// Immutable description of one configuration parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDescriptor {
    /// Unique parameter name
    pub name: &'static str,
    /// Display grouping
    pub category: Category,
    /// Visibility tier
    pub tier: VisibilityTier,
    /// Whether a change may be applied to a running process
    pub hot_reload: bool,
    /// Type, default and bounds
    pub spec: ValueSpec,
    /// Dedicated validator, if any
    pub handler: Option<CustomHandler>,
}

impl ParameterDescriptor {
    /// Attach a custom handler
    #[must_use]
    pub const fn handled_by(mut self, handler: CustomHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Parameter type
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        self.spec.parameter_type()
    }

    /// Default as a stored value
    #[must_use]
    pub fn default_value(&self) -> ParamValue {
        self.spec.default_value()
    }

    /// Allowed tokens for list parameters
    #[must_use]
    pub const fn allowed_values(&self) -> Option<&'static [&'static str]> {
        match self.spec {
            ValueSpec::List { allowed, .. } => Some(allowed),
            _ => None,
        }
    }

    /// Whether the name lies in the namespace reserved from remote mutation
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.name.starts_with(RESERVED_PREFIX)
    }
}

/// A stored, already validated parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Bool parameter
    Bool(bool),
    /// Int parameter
    Int(i64),
    /// Float parameter
    Float(f64),
    /// String, List and Params parameters
    Text(String),
}

impl ParamValue {
    /// Boolean content, if this is a bool
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer content, if this is an int
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Float content; ints widen
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Text content, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("on"),
            Self::Bool(false) => f.write_str("off"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

// Table constructors used by the catalog

/// Bool descriptor
#[must_use]
pub const fn boolean(
    name: &'static str,
    category: Category,
    tier: VisibilityTier,
    hot_reload: bool,
    default: bool,
) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        category,
        tier,
        hot_reload,
        spec: ValueSpec::Bool { default },
        handler: None,
    }
}

/// Int descriptor
#[must_use]
pub const fn int(
    name: &'static str,
    category: Category,
    tier: VisibilityTier,
    hot_reload: bool,
    default: i64,
    min: i64,
    max: i64,
) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        category,
        tier,
        hot_reload,
        spec: ValueSpec::Int { default, min, max },
        handler: None,
    }
}

/// Float descriptor
#[must_use]
pub const fn float(
    name: &'static str,
    category: Category,
    tier: VisibilityTier,
    hot_reload: bool,
    default: f64,
    min: f64,
    max: f64,
) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        category,
        tier,
        hot_reload,
        spec: ValueSpec::Float { default, min, max },
        handler: None,
    }
}

/// String descriptor
#[must_use]
pub const fn string(
    name: &'static str,
    category: Category,
    tier: VisibilityTier,
    hot_reload: bool,
    default: &'static str,
) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        category,
        tier,
        hot_reload,
        spec: ValueSpec::String { default },
        handler: None,
    }
}

/// List descriptor
#[must_use]
pub const fn list(
    name: &'static str,
    category: Category,
    tier: VisibilityTier,
    hot_reload: bool,
    default: &'static str,
    allowed: &'static [&'static str],
) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        category,
        tier,
        hot_reload,
        spec: ValueSpec::List { default, allowed },
        handler: None,
    }
}

/// Params descriptor
#[must_use]
pub const fn params(
    name: &'static str,
    category: Category,
    tier: VisibilityTier,
    hot_reload: bool,
    default: &'static str,
) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        category,
        tier,
        hot_reload,
        spec: ValueSpec::Params { default },
        handler: None,
    }
}
