// ABOUTME: Type-specific validators turning raw client strings into stored values
// ABOUTME: Bool tokens, bounded numbers, exact list tokens, verbatim strings and params blobs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use crate::registry::{ParamValue, ParameterDescriptor, ValueSpec};

use super::params::parse_params;

const TRUE_TOKENS: [&str; 3] = ["on", "true", "1"];
const FALSE_TOKENS: [&str; 3] = ["off", "false", "0"];

/// Validate a raw value against the plain type rules of `descriptor`
///
/// # Errors
///
/// Returns `InvalidInput` for unparseable or disallowed values and
/// `ValueOutOfRange` for numbers outside the inclusive bounds
pub fn validate(descriptor: &ParameterDescriptor, raw: &str) -> AppResult<ParamValue> {
    match descriptor.spec {
        ValueSpec::Bool { .. } => parse_bool(descriptor.name, raw).map(ParamValue::Bool),
        ValueSpec::Int { min, max, .. } => {
            let value = parse_int(descriptor.name, raw)?;
            if value < min || value > max {
                return Err(AppError::out_of_range(format!(
                    "{} must be between {min} and {max}",
                    descriptor.name
                ))
                .with_resource_id(descriptor.name));
            }
            Ok(ParamValue::Int(value))
        }
        ValueSpec::Float { min, max, .. } => {
            let value = parse_float(descriptor.name, raw)?;
            if value < min || value > max {
                return Err(AppError::out_of_range(format!(
                    "{} must be between {min} and {max}",
                    descriptor.name
                ))
                .with_resource_id(descriptor.name));
            }
            Ok(ParamValue::Float(value))
        }
        ValueSpec::String { .. } => Ok(ParamValue::Text(raw.to_owned())),
        ValueSpec::List { allowed, .. } => {
            if allowed.contains(&raw) {
                Ok(ParamValue::Text(raw.to_owned()))
            } else {
                Err(AppError::invalid_input(format!(
                    "'{raw}' is not an allowed value for {}",
                    descriptor.name
                ))
                .with_resource_id(descriptor.name)
                .with_details(serde_json::json!({ "allowed": allowed })))
            }
        }
        ValueSpec::Params { .. } => {
            parse_params(raw).map_err(|error| error.with_resource_id(descriptor.name))?;
            Ok(ParamValue::Text(raw.trim().to_owned()))
        }
    }
}

/// Case-insensitive on/off parsing
///
/// # Errors
///
/// Returns `InvalidInput` for any token outside the accepted spellings
pub fn parse_bool(name: &str, raw: &str) -> AppResult<bool> {
    let token = raw.trim();
    if TRUE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(token)) {
        Ok(true)
    } else if FALSE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(token)) {
        Ok(false)
    } else {
        Err(
            AppError::invalid_input(format!("{name} expects on/off, got '{raw}'"))
                .with_resource_id(name),
        )
    }
}

/// Integer parsing with surrounding whitespace ignored
///
/// # Errors
///
/// Returns `InvalidInput` when the text is not an integer
pub fn parse_int(name: &str, raw: &str) -> AppResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        AppError::invalid_input(format!("{name} expects an integer, got '{raw}'"))
            .with_resource_id(name)
    })
}

fn parse_float(name: &str, raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            AppError::invalid_input(format!("{name} expects a number, got '{raw}'"))
                .with_resource_id(name)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::registry::types::{float, int, list, params};
    use crate::registry::{Category, VisibilityTier};

    #[test]
    fn test_bool_tokens() {
        for token in ["on", "On", "ON", "1", "true", "TRUE", " on "] {
            assert!(parse_bool("flag", token).unwrap(), "{token}");
        }
        for token in ["off", "Off", "0", "false", "False"] {
            assert!(!parse_bool("flag", token).unwrap(), "{token}");
        }
        for token in ["yes", "2", "", "enabled"] {
            assert!(parse_bool("flag", token).is_err(), "{token}");
        }
    }

    #[test]
    fn test_int_bounds_are_inclusive() {
        let quality = int("q", Category::Picture, VisibilityTier::Limited, true, 75, 1, 100);
        assert_eq!(validate(&quality, "1").unwrap(), ParamValue::Int(1));
        assert_eq!(validate(&quality, "100").unwrap(), ParamValue::Int(100));
        assert_eq!(
            validate(&quality, "101").unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            validate(&quality, "0").unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            validate(&quality, "7.5").unwrap_err().code,
            ErrorCode::InvalidInput
        );
    }

    #[test]
    fn test_float_rejects_non_finite() {
        let gain = float("g", Category::Source, VisibilityTier::Limited, true, 0.0, 0.0, 8.0);
        assert_eq!(validate(&gain, "2.5").unwrap(), ParamValue::Float(2.5));
        assert!(validate(&gain, "NaN").is_err());
        assert!(validate(&gain, "inf").is_err());
        assert!(validate(&gain, "8.01").is_err());
    }

    #[test]
    fn test_list_match_is_exact() {
        let container = list(
            "c",
            Category::Movies,
            VisibilityTier::Limited,
            true,
            "mkv",
            &["mkv", "mp4"],
        );
        assert!(validate(&container, "mp4").is_ok());
        assert!(validate(&container, "MP4").is_err());
        assert!(validate(&container, " mp4").is_err());
    }

    #[test]
    fn test_params_validated_by_parser() {
        let blob = params("p", Category::Source, VisibilityTier::Advanced, false, "");
        assert!(validate(&blob, "a=1,b=2").is_ok());
        assert!(validate(&blob, "a=\"1").is_err());
    }
}
