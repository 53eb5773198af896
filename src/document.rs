// ABOUTME: Read-only configuration document listing cameras, parameters and categories
// ABOUTME: Built from one consistent snapshot and serialized once with serde
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use motionctl_core::constants::parameters::WITHHELD_LIST_TOKEN;

use crate::context::ConfigContext;
use crate::dispatch::{parse_params, ParamPair};
use crate::hot_reload::{CameraSummary, ConfigSnapshot};
use crate::registry::{
    Access, Category, ParamValue, ParameterRegistry, ParameterType, VisibilityTier,
    VisibleParameter,
};

/// One parameter as shown to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    /// Typed value; empty string when withheld
    pub value: Value,
    /// Whether the client may edit it
    pub enabled: bool,
    /// Category index
    pub category: usize,
    /// Type name
    #[serde(rename = "type")]
    pub kind: String,
    /// Allowed tokens of list parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<String>>,
    /// Pair count of params parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Parsed pairs of params parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Vec<ParamPair>>,
}

/// Parameters of the default context and of every camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSection {
    /// Default context
    pub default: BTreeMap<String, ParameterEntry>,
    /// `cam<device id>` contexts
    #[serde(flatten)]
    pub cameras: BTreeMap<String, BTreeMap<String, ParameterEntry>>,
}

/// Category names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Short machine name
    pub name: String,
    /// Display name
    pub display: String,
}

/// Whole configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Server version
    pub version: String,
    /// Token required on state-changing requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    /// Attached cameras
    pub cameras: Vec<CameraSummary>,
    /// Parameter values per context
    pub configuration: ConfigurationSection,
    /// Categories in display order
    pub categories: Vec<CategoryEntry>,
}

impl ConfigDocument {
    /// Document for `snapshot` as seen under its ceiling
    #[must_use]
    pub fn build(
        registry: &ParameterRegistry,
        snapshot: &ConfigSnapshot,
        csrf_token: Option<&str>,
    ) -> Self {
        let visible = registry.list_visible(snapshot.ceiling);
        let cameras = snapshot
            .cameras
            .iter()
            .map(|(summary, config)| {
                (
                    format!("cam{}", summary.id),
                    context_entries(&visible, config, snapshot.ceiling),
                )
            })
            .collect();
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            csrf_token: csrf_token.map(ToOwned::to_owned),
            cameras: snapshot
                .cameras
                .iter()
                .map(|(summary, _)| summary.clone())
                .collect(),
            configuration: ConfigurationSection {
                default: context_entries(&visible, &snapshot.default, snapshot.ceiling),
                cameras,
            },
            categories: ParameterRegistry::categories()
                .iter()
                .map(|category: &Category| CategoryEntry {
                    name: category.short_name().to_owned(),
                    display: category.display_name().to_owned(),
                })
                .collect(),
        }
    }
}

fn context_entries(
    visible: &[VisibleParameter<'_>],
    config: &ConfigContext,
    ceiling: VisibilityTier,
) -> BTreeMap<String, ParameterEntry> {
    visible
        .iter()
        .map(|entry| {
            (
                entry.descriptor.name.to_owned(),
                parameter_entry(entry, config, ceiling),
            )
        })
        .collect()
}

fn parameter_entry(
    entry: &VisibleParameter<'_>,
    config: &ConfigContext,
    ceiling: VisibilityTier,
) -> ParameterEntry {
    let descriptor = entry.descriptor;
    let parameter_type = descriptor.parameter_type();
    let mut rendered = ParameterEntry {
        value: Value::String(String::new()),
        enabled: false,
        category: descriptor.category.index(),
        kind: ParameterRegistry::describe_type(parameter_type).to_owned(),
        list: None,
        count: None,
        parsed: None,
    };

    if entry.access == Access::Withheld {
        if parameter_type == ParameterType::List {
            rendered.list = Some(vec![WITHHELD_LIST_TOKEN.to_owned()]);
        }
        return rendered;
    }

    rendered.enabled = entry.access == Access::Editable && ceiling >= VisibilityTier::Limited;
    let value = config
        .get(descriptor.name)
        .cloned()
        .unwrap_or_else(|| descriptor.default_value());
    rendered.value = json_value(&value);
    match parameter_type {
        ParameterType::List => {
            rendered.list = descriptor
                .allowed_values()
                .map(|allowed| allowed.iter().map(|token| (*token).to_owned()).collect());
        }
        ParameterType::Params => {
            let pairs = value
                .as_text()
                .and_then(|raw| parse_params(raw).ok())
                .unwrap_or_default();
            rendered.count = Some(pairs.len());
            rendered.parsed = Some(pairs);
        }
        _ => {}
    }
    rendered
}

fn json_value(value: &ParamValue) -> Value {
    match value {
        ParamValue::Bool(flag) => Value::Bool(*flag),
        ParamValue::Int(number) => Value::from(*number),
        ParamValue::Float(number) => Value::from(*number),
        ParamValue::Text(text) => Value::String(text.clone()),
    }
}
