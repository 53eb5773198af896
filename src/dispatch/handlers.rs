// ABOUTME: Custom handlers for parameters with rules beyond their plain type
// ABOUTME: Device id uniqueness, pause legacy spellings, path normalization and log file templates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use tracing::warn;

use motionctl_core::constants::limits::MAX_DEVICE_ID;

use crate::errors::{AppError, AppResult};
use crate::registry::{CustomHandler, ParamValue, ParameterDescriptor};

use super::validators::{parse_int, validate};
use super::{EditEnv, Normalized};

const ROTATIONS: [i64; 4] = [0, 90, 180, 270];
const LEGACY_PAUSE_ON: [&str; 3] = ["1", "true", "yes"];
const LEGACY_PAUSE_OFF: [&str; 3] = ["0", "false", "no"];

/// Run the dedicated validator of `handler`
pub(super) fn normalize(
    handler: CustomHandler,
    descriptor: &ParameterDescriptor,
    raw: &str,
    env: &EditEnv<'_>,
) -> AppResult<Normalized> {
    match handler {
        CustomHandler::DeviceId => device_id(descriptor, raw, env).map(Normalized::plain),
        CustomHandler::Pause => pause(descriptor, raw),
        CustomHandler::Rotate => rotate(descriptor, raw).map(Normalized::plain),
        CustomHandler::TargetDir => Ok(Normalized::plain(ParamValue::Text(
            strip_trailing_separators(raw).to_owned(),
        ))),
        CustomHandler::FilenameTemplate => Ok(Normalized::plain(ParamValue::Text(
            raw.trim_start_matches('/').to_owned(),
        ))),
        CustomHandler::LogFile => log_file(descriptor, raw).map(Normalized::plain),
    }
}

fn device_id(descriptor: &ParameterDescriptor, raw: &str, env: &EditEnv<'_>) -> AppResult<ParamValue> {
    let id = parse_int(descriptor.name, raw)?;
    if !(1..=MAX_DEVICE_ID).contains(&id) {
        return Err(AppError::out_of_range(format!(
            "device_id must be between 1 and {MAX_DEVICE_ID}"
        ))
        .with_resource_id(descriptor.name));
    }
    if env.taken_device_ids.contains(&id) {
        return Err(
            AppError::conflict(format!("Device id {id} is already in use"))
                .with_resource_id(descriptor.name),
        );
    }
    Ok(ParamValue::Int(id))
}

fn pause(descriptor: &ParameterDescriptor, raw: &str) -> AppResult<Normalized> {
    if let Ok(value) = validate(descriptor, raw) {
        return Ok(Normalized::plain(value));
    }
    let token = raw.trim();
    let mapped = if LEGACY_PAUSE_ON.iter().any(|t| t.eq_ignore_ascii_case(token)) {
        "on"
    } else if LEGACY_PAUSE_OFF.iter().any(|t| t.eq_ignore_ascii_case(token)) {
        "off"
    } else {
        return Err(AppError::invalid_input(format!(
            "'{raw}' is not an allowed value for pause"
        ))
        .with_resource_id(descriptor.name));
    };
    let notice =
        format!("pause value '{token}' is deprecated, use one of on, off or schedule");
    warn!(parameter = descriptor.name, value = %token, mapped, "Deprecated pause value");
    Ok(Normalized {
        value: ParamValue::Text(mapped.to_owned()),
        notice: Some(notice),
    })
}

fn rotate(descriptor: &ParameterDescriptor, raw: &str) -> AppResult<ParamValue> {
    let degrees = parse_int(descriptor.name, raw)?;
    if ROTATIONS.contains(&degrees) {
        Ok(ParamValue::Int(degrees))
    } else {
        Err(AppError::out_of_range("rotate must be one of 0, 90, 180 or 270")
            .with_resource_id(descriptor.name))
    }
}

fn strip_trailing_separators(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() && !raw.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn log_file(descriptor: &ParameterDescriptor, raw: &str) -> AppResult<ParamValue> {
    if !raw.contains('%') {
        return Ok(ParamValue::Text(raw.to_owned()));
    }
    let items: Vec<Item<'_>> = StrftimeItems::new(raw).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(AppError::invalid_input(format!(
            "log_file template '{raw}' contains an invalid time specifier"
        ))
        .with_resource_id(descriptor.name));
    }
    let mut expanded = String::new();
    write!(
        expanded,
        "{}",
        Local::now().format_with_items(items.into_iter())
    )
    .map_err(|_| {
        AppError::invalid_input(format!("log_file template '{raw}' cannot be expanded"))
            .with_resource_id(descriptor.name)
    })?;
    Ok(ParamValue::Text(expanded))
}
