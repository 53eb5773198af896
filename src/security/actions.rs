// ABOUTME: Per-action enablement parsed from the webcontrol_actions parameter
// ABOUTME: Gates file serving, deletion and host power operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use tracing::warn;

use crate::dispatch::parse_params;

/// Serve recorded files
pub const ACTION_MOVIES: &str = "movies";
/// Reboot or shut the host down
pub const ACTION_POWER: &str = "power";
/// Delete masks
pub const ACTION_DELETE: &str = "delete";

/// Which remote actions are enabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPolicy {
    overrides: HashMap<String, bool>,
}

impl ActionPolicy {
    /// Parse a `webcontrol_actions` blob such as `movies=on,power=off`
    ///
    /// Malformed blobs leave every action at its default.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let pairs = match parse_params(raw) {
            Ok(pairs) => pairs,
            Err(error) => {
                warn!(error = %error.message, "Ignoring malformed webcontrol_actions");
                return Self::default();
            }
        };
        let overrides = pairs
            .into_iter()
            .filter_map(|pair| match pair.value.to_ascii_lowercase().as_str() {
                "on" => Some((pair.key, true)),
                "off" => Some((pair.key, false)),
                other => {
                    warn!(action = %pair.key, value = other, "Ignoring action value");
                    None
                }
            })
            .collect();
        Self { overrides }
    }

    /// Whether `action` is enabled
    #[must_use]
    pub fn is_enabled(&self, action: &str) -> bool {
        self.overrides
            .get(action)
            .copied()
            .unwrap_or_else(|| Self::default_for(action))
    }

    fn default_for(action: &str) -> bool {
        action != ACTION_POWER
    }
}
