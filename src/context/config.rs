// ABOUTME: Live value set of the default configuration or of one camera
// ABOUTME: Typed values keyed by parameter name, seeded from registry defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use crate::registry::{ParamValue, ParameterRegistry};

/// Typed values for one configuration scope
///
/// Values are only ever written by the edit engine, which has already
/// validated them against their descriptor.
#[derive(Debug, Clone)]
pub struct ConfigContext {
    label: String,
    values: HashMap<&'static str, ParamValue>,
}

impl ConfigContext {
    /// Context holding every registry default
    #[must_use]
    pub fn from_registry(registry: &ParameterRegistry, label: impl Into<String>) -> Self {
        let values = registry
            .iter()
            .map(|descriptor| (descriptor.name, descriptor.default_value()))
            .collect();
        Self {
            label: label.into(),
            values,
        }
    }

    /// Copy of this context under a new label
    #[must_use]
    pub fn derive(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: self.values.clone(),
        }
    }

    /// Label used in logs (`default`, `cam3`, ...)
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stored value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Stored value rendered for clients
    #[must_use]
    pub fn render(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }

    /// Bool value
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    /// Int value
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// Float value
    #[must_use]
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_float)
    }

    /// Text value
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_text)
    }

    /// Camera device id; zero when unassigned
    #[must_use]
    pub fn device_id(&self) -> i64 {
        self.int("device_id").unwrap_or(0)
    }

    pub(crate) fn store(&mut self, name: &'static str, value: ParamValue) -> Option<ParamValue> {
        self.values.insert(name, value)
    }
}
