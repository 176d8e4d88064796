//! Consistency checks for one group.
//!
//! A [`Group`] can only be handed to the implementation emitter as a
//! [`ValidatedGroup`], and only [`ConsistencyValidator`] can build one.
//!
//! Checks:
//! - every member uses the same component model (case-insensitive)
//! - arguments forwarded to a Standard exception fit one of its constructors

use crate::error::ConflictError;
use crate::model::{
    ExceptionCatalog, ExceptionMode, Group, Parameter, SymbolRecord, same_component_model,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::Display;

/// What to do when forwarded arguments cannot reach a Standard constructor.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapePolicy {
    /// Skip the group with a conflict
    #[default]
    Strict,
    /// Report and emit anyway
    Warn,
    /// No check
    Off,
}

/// A group whose members passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedGroup {
    group: Group,
    component_model: String,
    warnings: Vec<ConflictError>,
}

impl ValidatedGroup {
    fn new(group: Group, warnings: Vec<ConflictError>) -> Self {
        let component_model = group.records()[0].component_model().to_string();
        Self {
            group,
            component_model,
            warnings,
        }
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Component model shared by the group (that of its first member when
    /// the component model check is disabled).
    pub fn component_model(&self) -> &str {
        &self.component_model
    }

    /// Shape mismatches tolerated under [`ShapePolicy::Warn`].
    pub fn warnings(&self) -> &[ConflictError] {
        &self.warnings
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConsistencyValidator<'a> {
    catalog: Option<&'a ExceptionCatalog>,
    shape_policy: ShapePolicy,
    check_component_model: bool,
}

impl Default for ConsistencyValidator<'_> {
    fn default() -> Self {
        Self {
            catalog: None,
            shape_policy: ShapePolicy::Strict,
            check_component_model: true,
        }
    }
}

impl<'a> ConsistencyValidator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the constructor-shape check against `catalog`.
    pub fn with_catalog(mut self, catalog: &'a ExceptionCatalog, policy: ShapePolicy) -> Self {
        self.catalog = Some(catalog);
        self.shape_policy = policy;
        self
    }

    pub fn with_component_model_check(mut self, enabled: bool) -> Self {
        self.check_component_model = enabled;
        self
    }

    pub fn validate(&self, group: Group) -> Result<ValidatedGroup, ConflictError> {
        if self.check_component_model {
            check_component_model(&group)?;
        }

        let mut warnings = Vec::new();
        if let Some(catalog) = self.catalog {
            for record in group.records() {
                let Err(conflict) = check_constructor_shape(&group, record, catalog) else {
                    continue;
                };
                match self.shape_policy {
                    ShapePolicy::Strict => return Err(conflict),
                    ShapePolicy::Warn => warnings.push(conflict),
                    ShapePolicy::Off => {}
                }
            }
        }

        Ok(ValidatedGroup::new(group, warnings))
    }
}

fn check_component_model(group: &Group) -> Result<(), ConflictError> {
    let records = group.records();
    let expected = records[0].component_model();
    match records[1..]
        .iter()
        .find(|r| !same_component_model(r.component_model(), expected))
    {
        Some(offender) => Err(ConflictError::ComponentModelMismatch {
            interface: group.key().qualified_interface(),
            method: offender.method_name().to_string(),
            expected: expected.to_string(),
            found: offender.component_model().to_string(),
        }),
        None => Ok(()),
    }
}

fn check_constructor_shape(
    group: &Group,
    record: &SymbolRecord,
    catalog: &ExceptionCatalog,
) -> Result<(), ConflictError> {
    let (package, name) = record.exception_target();
    match catalog.mode_of(package, name) {
        Some(ExceptionMode::Standard) if !fits_standard(record.parameters()) => {
            Err(ConflictError::ConstructorShape {
                interface: group.key().qualified_interface(),
                method: record.method_name().to_string(),
                exception: record.exception_type_name().to_string(),
                parameters: record
                    .parameters()
                    .iter()
                    .map(|p| p.type_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        }
        _ => Ok(()),
    }
}

/// `(String)` or `(String, Object[])`.
fn fits_standard(parameters: &[Parameter]) -> bool {
    match parameters {
        [message] => is_string(&message.type_name),
        [message, params] => is_string(&message.type_name) && is_object_array(&params.type_name),
        _ => false,
    }
}

fn is_string(type_name: &str) -> bool {
    matches!(type_name.trim(), "String" | "java.lang.String")
}

fn is_object_array(type_name: &str) -> bool {
    let compact: String = type_name.chars().filter(|c| !c.is_whitespace()).collect();
    matches!(
        compact.as_str(),
        "Object[]" | "Object..." | "java.lang.Object[]" | "java.lang.Object..."
    )
}
