// ABOUTME: Edit engine routing (name, raw value, action) to type validators or custom handlers
// ABOUTME: Produces structured edit outcomes and never lets a failure escape as an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Dispatcher / Edit Engine
//!
//! Every edit goes through [`EditEngine::edit`]. The engine looks the name up in
//! the registry, picks the dedicated handler when the descriptor names one and
//! the generic type validator otherwise, and writes the normalized value into the
//! target [`ConfigContext`]. Rejections come back as an [`EditOutcome`] with the
//! stored value untouched.
//!
//! Two-phase use is available for callers that must validate several contexts
//! before writing any of them: [`EditEngine::plan`] then [`EditEngine::commit`].

/// Custom handlers for parameters with exceptional rules
pub mod handlers;
/// `key=value` blob parser
pub mod params;
/// Generic per-type validators
pub mod validators;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ConfigContext;
use crate::errors::{AppError, ErrorCode};
use crate::registry::{
    CustomHandler, ParamValue, ParameterDescriptor, ParameterRegistry, ParameterType,
};

pub use params::{parse_params, ParamPair};

/// What the caller wants done with a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    /// Read the current value
    Get,
    /// Validate and store a new value
    Set,
    /// Restore the descriptor default
    SetDefault,
    /// Return the allowed tokens of a list parameter
    ListAllowed,
}

/// Result classification of an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditStatus {
    /// A new value was stored
    Applied,
    /// The value already equalled the request; nothing written
    Unchanged,
    /// Read-only action served
    Read,
    /// No such parameter
    NotFound,
    /// Caller may not change this parameter
    RejectedPermission,
    /// Value failed type, range or token validation
    RejectedValidation,
    /// Refused for security reasons
    RejectedSecurity,
    /// Value collides with an identifier in use
    RejectedConflict,
}

impl EditStatus {
    /// Classify an error raised while editing
    #[must_use]
    pub const fn from_error_code(code: ErrorCode) -> Self {
        match code {
            ErrorCode::ResourceNotFound => Self::NotFound,
            ErrorCode::PermissionDenied => Self::RejectedPermission,
            ErrorCode::SecurityViolation => Self::RejectedSecurity,
            ErrorCode::ResourceAlreadyExists => Self::RejectedConflict,
            _ => Self::RejectedValidation,
        }
    }

    /// Whether the edit counts as a success in batch summaries
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Applied | Self::Unchanged | Self::Read)
    }
}

/// Error reported inside an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditError {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable reason
    pub message: String,
}

/// Extra data returned by read actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDetail {
    /// Allowed tokens of a list parameter
    Allowed {
        /// Tokens in catalog order
        values: Vec<String>,
    },
    /// Parsed content of a params blob
    Parsed {
        /// Number of pairs
        count: usize,
        /// Pairs in blob order
        pairs: Vec<ParamPair>,
    },
}

/// Structured result of one edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    /// Parameter name as requested
    pub parameter: String,
    /// Requested action
    pub action: EditAction,
    /// Classification
    pub status: EditStatus,
    /// Value before the edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    /// Value after the edit (the current value for reads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Rejection reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EditError>,
    /// Non-fatal remark such as a deprecation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Read action payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ValueDetail>,
}

impl EditOutcome {
    /// Outcome describing a rejection
    #[must_use]
    pub fn rejected(parameter: &str, action: EditAction, error: &AppError) -> Self {
        Self {
            parameter: parameter.to_owned(),
            action,
            status: EditStatus::from_error_code(error.code),
            old_value: None,
            new_value: None,
            error: Some(EditError {
                code: error.code,
                message: error.message.clone(),
            }),
            notice: None,
            detail: None,
        }
    }

    /// Whether a new value was stored
    #[must_use]
    pub const fn applied(&self) -> bool {
        matches!(self.status, EditStatus::Applied)
    }

    /// Append a non-fatal remark
    pub fn add_notice(&mut self, notice: impl Into<String>) {
        let notice = notice.into();
        self.notice = Some(match self.notice.take() {
            Some(existing) => format!("{existing}; {notice}"),
            None => notice,
        });
    }
}

/// Facts about the surrounding system that validators need
#[derive(Debug, Clone, Copy)]
pub struct EditEnv<'a> {
    /// Device ids held by other cameras and by peripherals
    pub taken_device_ids: &'a [i64],
}

impl EditEnv<'static> {
    /// Environment with no other devices
    #[must_use]
    pub const fn standalone() -> Self {
        Self {
            taken_device_ids: &[],
        }
    }
}

/// A validated value ready to be committed
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Value to store
    pub value: ParamValue,
    /// Remark to surface in the outcome
    pub notice: Option<String>,
}

impl Normalized {
    pub(crate) const fn plain(value: ParamValue) -> Self {
        Self {
            value,
            notice: None,
        }
    }
}

/// Validating edit engine over a shared registry
#[derive(Debug, Clone)]
pub struct EditEngine {
    registry: Arc<ParameterRegistry>,
}

impl EditEngine {
    /// Engine over `registry`
    #[must_use]
    pub const fn new(registry: Arc<ParameterRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this engine validates against
    #[must_use]
    pub fn registry(&self) -> &Arc<ParameterRegistry> {
        &self.registry
    }

    /// Apply `action` for parameter `name` to `context`
    ///
    /// Unknown names are a no-op reported as [`EditStatus::NotFound`].
    pub fn edit(
        &self,
        context: &mut ConfigContext,
        name: &str,
        raw: &str,
        action: EditAction,
        env: &EditEnv<'_>,
    ) -> EditOutcome {
        match action {
            EditAction::Get | EditAction::ListAllowed => self.read(context, name, action),
            EditAction::Set | EditAction::SetDefault => {
                match self.plan(context, name, raw, action, env) {
                    Ok((descriptor, normalized)) => {
                        self.commit(context, descriptor, normalized, action)
                    }
                    Err(error) => {
                        debug!(
                            context = context.label(),
                            parameter = name,
                            code = ?error.code,
                            reason = %error.message,
                            "Edit rejected"
                        );
                        EditOutcome::rejected(name, action, &error)
                    }
                }
            }
        }
    }

    /// Serve a read-only action
    pub fn read(&self, context: &ConfigContext, name: &str, action: EditAction) -> EditOutcome {
        let descriptor = match self.registry.lookup(name) {
            Ok(descriptor) => descriptor,
            Err(error) => return EditOutcome::rejected(name, action, &error),
        };
        let current = context.render(descriptor.name);
        let detail = match (action, descriptor.parameter_type()) {
            (EditAction::ListAllowed, ParameterType::List) => Some(ValueDetail::Allowed {
                values: descriptor
                    .allowed_values()
                    .unwrap_or_default()
                    .iter()
                    .map(|token| (*token).to_owned())
                    .collect(),
            }),
            (EditAction::ListAllowed, _) => {
                let error = AppError::invalid_input(format!("{name} is not a list parameter"))
                    .with_resource_id(name);
                return EditOutcome::rejected(name, action, &error);
            }
            (_, ParameterType::Params) => current
                .as_deref()
                .and_then(|raw| parse_params(raw).ok())
                .map(|pairs| ValueDetail::Parsed {
                    count: pairs.len(),
                    pairs,
                }),
            _ => None,
        };
        EditOutcome {
            parameter: name.to_owned(),
            action,
            status: EditStatus::Read,
            old_value: None,
            new_value: current,
            error: None,
            notice: None,
            detail,
        }
    }

    /// Validate a write without touching `context`
    ///
    /// # Errors
    ///
    /// Returns the rejection as an `AppError`; the caller maps it to an outcome
    pub fn plan(
        &self,
        context: &ConfigContext,
        name: &str,
        raw: &str,
        action: EditAction,
        env: &EditEnv<'_>,
    ) -> Result<(&ParameterDescriptor, Normalized), AppError> {
        let descriptor = self.registry.lookup(name)?;
        let normalized = match action {
            EditAction::SetDefault => {
                if descriptor.handler == Some(CustomHandler::DeviceId) {
                    return Err(AppError::invalid_input("device_id has no default")
                        .with_resource_id(name));
                }
                Normalized::plain(descriptor.default_value())
            }
            _ => match descriptor.handler {
                Some(handler) => handlers::normalize(handler, descriptor, raw, env)?,
                None => Normalized::plain(validators::validate(descriptor, raw)?),
            },
        };
        debug!(
            context = context.label(),
            parameter = name,
            value = %normalized.value,
            "Edit validated"
        );
        Ok((descriptor, normalized))
    }

    /// Store a value produced by [`EditEngine::plan`]
    pub fn commit(
        &self,
        context: &mut ConfigContext,
        descriptor: &ParameterDescriptor,
        normalized: Normalized,
        action: EditAction,
    ) -> EditOutcome {
        let old = context.get(descriptor.name).cloned();
        let status = if old.as_ref() == Some(&normalized.value) {
            EditStatus::Unchanged
        } else {
            context.store(descriptor.name, normalized.value.clone());
            EditStatus::Applied
        };
        EditOutcome {
            parameter: descriptor.name.to_owned(),
            action,
            status,
            old_value: old.map(|value| value.to_string()),
            new_value: Some(normalized.value.to_string()),
            error: None,
            notice: normalized.notice,
            detail: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_and_context() -> (EditEngine, ConfigContext) {
        let registry = ParameterRegistry::shared();
        let context = ConfigContext::from_registry(&registry, "cam1");
        (EditEngine::new(registry), context)
    }

    #[test]
    fn test_set_then_get_bool() {
        let (engine, mut context) = engine_and_context();
        let env = EditEnv::standalone();

        let outcome = engine.edit(&mut context, "emulate_motion", "TRUE", EditAction::Set, &env);
        assert!(outcome.applied());
        assert_eq!(outcome.old_value.as_deref(), Some("off"));
        assert_eq!(outcome.new_value.as_deref(), Some("on"));

        let read = engine.edit(&mut context, "emulate_motion", "", EditAction::Get, &env);
        assert_eq!(read.status, EditStatus::Read);
        assert_eq!(read.new_value.as_deref(), Some("on"));
    }

    #[test]
    fn test_same_value_is_unchanged() {
        let (engine, mut context) = engine_and_context();
        let outcome = engine.edit(
            &mut context,
            "threshold",
            "1500",
            EditAction::Set,
            &EditEnv::standalone(),
        );
        assert_eq!(outcome.status, EditStatus::Unchanged);
        assert!(!outcome.applied());
    }

    #[test]
    fn test_rejection_keeps_value() {
        let (engine, mut context) = engine_and_context();
        let outcome = engine.edit(
            &mut context,
            "noise_level",
            "256",
            EditAction::Set,
            &EditEnv::standalone(),
        );
        assert_eq!(outcome.status, EditStatus::RejectedValidation);
        assert_eq!(outcome.error.unwrap().code, ErrorCode::ValueOutOfRange);
        assert_eq!(context.int("noise_level"), Some(32));
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let (engine, mut context) = engine_and_context();
        let outcome = engine.edit(
            &mut context,
            "no_such_parameter",
            "1",
            EditAction::Set,
            &EditEnv::standalone(),
        );
        assert_eq!(outcome.status, EditStatus::NotFound);
    }

    #[test]
    fn test_set_default_restores() {
        let (engine, mut context) = engine_and_context();
        let env = EditEnv::standalone();
        engine.edit(&mut context, "movie_quality", "90", EditAction::Set, &env);

        let outcome = engine.edit(&mut context, "movie_quality", "", EditAction::SetDefault, &env);
        assert!(outcome.applied());
        assert_eq!(context.int("movie_quality"), Some(60));
    }

    #[test]
    fn test_list_allowed_and_params_detail() {
        let (engine, mut context) = engine_and_context();
        let env = EditEnv::standalone();

        let allowed = engine.edit(&mut context, "picture_type", "", EditAction::ListAllowed, &env);
        assert_eq!(
            allowed.detail,
            Some(ValueDetail::Allowed {
                values: vec!["jpg".to_owned(), "webp".to_owned(), "ppm".to_owned()]
            })
        );

        let not_list = engine.edit(&mut context, "threshold", "", EditAction::ListAllowed, &env);
        assert_eq!(not_list.status, EditStatus::RejectedValidation);

        engine.edit(&mut context, "v4l2_params", "input=1, palette=17", EditAction::Set, &env);
        let read = engine.edit(&mut context, "v4l2_params", "", EditAction::Get, &env);
        match read.detail {
            Some(ValueDetail::Parsed { count, pairs }) => {
                assert_eq!(count, 2);
                assert_eq!(pairs[1].key, "palette");
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let (engine, mut context) = engine_and_context();
        let outcome = engine.edit(
            &mut context,
            "threshold",
            "2000",
            EditAction::Set,
            &EditEnv::standalone(),
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "applied");
        assert_eq!(json["oldValue"], "1500");
        assert_eq!(json["newValue"], "2000");
    }
}
