// ABOUTME: Parameter registry with name lookup, type/category descriptions and visibility listing
// ABOUTME: Built once from the static catalog and shared read-only for the process lifetime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Parameter Registry
//!
//! The registry is an ordered, immutable table of [`ParameterDescriptor`]s with a
//! name index. It never changes after construction, so it is shared through an
//! `Arc` and read without locking.

/// Static descriptor table
pub mod catalog;
/// Descriptor, tier, category and value types
pub mod types;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::error;

use crate::errors::{AppError, AppResult};
pub use types::{
    Category, CustomHandler, ParamValue, ParameterDescriptor, ParameterType, ValueSpec,
    VisibilityTier,
};

/// Shared registry built from [`catalog::CATALOG`]
static SHARED_REGISTRY: OnceLock<Arc<ParameterRegistry>> = OnceLock::new();

/// How a parameter appears to a caller with a given ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Value shown and editable
    Editable,
    /// Value shown, editing disabled
    ReadOnly,
    /// Present but value withheld and editing disabled
    Withheld,
}

/// One entry of [`ParameterRegistry::list_visible`]
#[derive(Debug, Clone, Copy)]
pub struct VisibleParameter<'a> {
    /// The descriptor
    pub descriptor: &'a ParameterDescriptor,
    /// What the caller may do with it
    pub access: Access,
}

/// Immutable parameter table indexed by name
#[derive(Debug)]
pub struct ParameterRegistry {
    descriptors: Vec<ParameterDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ParameterRegistry {
    /// Build a registry from a custom table, rejecting malformed descriptors
    ///
    /// # Errors
    ///
    /// Returns a configuration error on duplicate names, defaults outside their
    /// bounds, or list defaults that are not allowed tokens.
    pub fn new(descriptors: Vec<ParameterDescriptor>) -> AppResult<Self> {
        let mut seen = HashMap::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if seen.insert(descriptor.name, ()).is_some() {
                return Err(AppError::config(format!(
                    "Duplicate parameter name '{}'",
                    descriptor.name
                )));
            }
            check_default(descriptor)?;
        }
        Ok(Self::index(descriptors))
    }

    /// Registry over the built-in catalog, created on first use
    #[must_use]
    pub fn shared() -> Arc<Self> {
        SHARED_REGISTRY
            .get_or_init(|| Arc::new(Self::index(catalog::CATALOG.to_vec())))
            .clone()
    }

    fn index(descriptors: Vec<ParameterDescriptor>) -> Self {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.name, position).is_some() {
                error!(parameter = descriptor.name, "Duplicate parameter in catalog");
            }
        }
        Self { descriptors, index }
    }

    /// Find a descriptor by name
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no parameter has this name
    pub fn lookup(&self, name: &str) -> AppResult<&ParameterDescriptor> {
        self.get(name)
            .ok_or_else(|| AppError::not_found(format!("Parameter '{name}'")).with_resource_id(name))
    }

    /// Find a descriptor by name, if present
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.index.get(name).map(|&position| &self.descriptors[position])
    }

    /// Descriptors in table order
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.descriptors.iter()
    }

    /// Number of descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Display string of a parameter type
    #[must_use]
    pub const fn describe_type(parameter_type: ParameterType) -> &'static str {
        parameter_type.as_str()
    }

    /// Short machine name or long display name of a category
    #[must_use]
    pub const fn describe_category(category: Category, short: bool) -> &'static str {
        if short {
            category.short_name()
        } else {
            category.display_name()
        }
    }

    /// All categories in display order
    #[must_use]
    pub const fn categories() -> &'static [Category] {
        &Category::ALL
    }

    /// Parameters visible to a caller whose ceiling is `ceiling`
    ///
    /// `Never` entries are skipped. Entries above the ceiling stay in the list with
    /// their value withheld. When the ceiling is below `Limited` nothing is editable.
    #[must_use]
    pub fn list_visible(&self, ceiling: VisibilityTier) -> Vec<VisibleParameter<'_>> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.tier != VisibilityTier::Never)
            .map(|descriptor| VisibleParameter {
                descriptor,
                access: access_for(descriptor, ceiling),
            })
            .collect()
    }
}

fn access_for(descriptor: &ParameterDescriptor, ceiling: VisibilityTier) -> Access {
    if descriptor.tier > ceiling && descriptor.tier > VisibilityTier::Limited {
        Access::Withheld
    } else if ceiling < VisibilityTier::Limited
        || descriptor.tier > ceiling
        || descriptor.tier == VisibilityTier::Restricted
    {
        Access::ReadOnly
    } else {
        Access::Editable
    }
}

fn check_default(descriptor: &ParameterDescriptor) -> AppResult<()> {
    let valid = match descriptor.spec {
        ValueSpec::Int { default, min, max } => min <= max && (min..=max).contains(&default),
        ValueSpec::Float { default, min, max } => {
            min <= max && default.is_finite() && (min..=max).contains(&default)
        }
        ValueSpec::List { default, allowed } => allowed.contains(&default),
        ValueSpec::Bool { .. } | ValueSpec::String { .. } | ValueSpec::Params { .. } => true,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::config(format!(
            "Default of parameter '{}' violates its own constraints",
            descriptor.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::types::{boolean, int, list};
    use super::*;

    #[test]
    fn test_builtin_catalog_is_well_formed() {
        let registry = ParameterRegistry::new(catalog::CATALOG.to_vec()).unwrap();
        assert_eq!(registry.len(), catalog::CATALOG.len());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let table = vec![
            boolean("emulate_motion", Category::Method, VisibilityTier::Limited, true, false),
            boolean("emulate_motion", Category::Method, VisibilityTier::Limited, true, true),
        ];
        let error = ParameterRegistry::new(table).unwrap_err();
        assert_eq!(error.code, crate::errors::ErrorCode::ConfigError);
    }

    #[test]
    fn test_default_outside_bounds_rejected() {
        let table = vec![int("quality", Category::Picture, VisibilityTier::Limited, true, 101, 1, 100)];
        assert!(ParameterRegistry::new(table).is_err());

        let table = vec![list("mode", Category::Image, VisibilityTier::Limited, true, "x", &["a", "b"])];
        assert!(ParameterRegistry::new(table).is_err());
    }

    #[test]
    fn test_access_rules() {
        let limited = boolean("a", Category::Method, VisibilityTier::Limited, true, false);
        let advanced = boolean("b", Category::Method, VisibilityTier::Advanced, true, false);
        let restricted = boolean("c", Category::Method, VisibilityTier::Restricted, true, false);

        assert_eq!(access_for(&limited, VisibilityTier::Never), Access::ReadOnly);
        assert_eq!(access_for(&limited, VisibilityTier::Limited), Access::Editable);
        assert_eq!(access_for(&advanced, VisibilityTier::Limited), Access::Withheld);
        assert_eq!(access_for(&advanced, VisibilityTier::Advanced), Access::Editable);
        assert_eq!(access_for(&restricted, VisibilityTier::Restricted), Access::ReadOnly);
    }
}
