//! The field table: every top-level field a path document may carry.

use crate::error::{ErrorKind, FieldPath, ValidationError};
use crate::shape::{Shape, ShapeKind};
use serde_json::{Map, Value};

/// How a top-level field participates in the requiredness policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requiredness {
    Required,
    Optional,
    /// Legacy spelling of a required field. Satisfies the requirement in
    /// place of `replaced_by`, but never alongside it.
    LegacyRequired { replaced_by: &'static str },
}

/// Declaration of one top-level field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub requiredness: Requiredness,
    pub shape: ShapeKind,
}

const MAPPING_OR_LIST: ShapeKind = ShapeKind::OneOf(&[ShapeKind::Mapping, ShapeKind::List]);
const MAPPING_OR_STRING: ShapeKind = ShapeKind::OneOf(&[ShapeKind::Mapping, ShapeKind::String]);

const fn required(name: &'static str, shape: ShapeKind) -> FieldSpec {
    FieldSpec {
        name,
        requiredness: Requiredness::Required,
        shape,
    }
}

const fn optional(name: &'static str, shape: ShapeKind) -> FieldSpec {
    FieldSpec {
        name,
        requiredness: Requiredness::Optional,
        shape,
    }
}

/// All declared fields in check order: required, legacy, then optional.
pub static FIELD_SPECS: &[FieldSpec] = &[
    required("id", ShapeKind::String),
    required("name", ShapeKind::String),
    required("category", ShapeKind::String),
    required("services", ShapeKind::List),
    required("permissions", ShapeKind::Mapping),
    required("description", ShapeKind::String),
    required("exploitationSteps", MAPPING_OR_LIST),
    required("recommendation", ShapeKind::String),
    required("discoveredBy", ShapeKind::Mapping),
    FieldSpec {
        name: "requiredPermissions",
        requiredness: Requiredness::LegacyRequired {
            replaced_by: "permissions",
        },
        shape: ShapeKind::List,
    },
    optional("prerequisites", MAPPING_OR_LIST),
    optional("limitations", ShapeKind::String),
    optional("references", ShapeKind::List),
    optional("relatedPaths", ShapeKind::List),
    optional("detectionRules", ShapeKind::List),
    optional("detectionTools", ShapeKind::Mapping),
    optional("learningEnvironments", ShapeKind::Mapping),
    optional("toolSupport", ShapeKind::Mapping),
    optional("attackVisualization", MAPPING_OR_STRING),
    optional("discoveryAttribution", MAPPING_OR_LIST),
];

/// Look up a field declaration by name.
pub fn lookup_field(name: &str) -> Option<&'static FieldSpec> {
    FIELD_SPECS.iter().find(|f| f.name == name)
}

/// Whether `name` belongs to the closed field set (required ∪ optional ∪ legacy).
pub fn is_allowed(name: &str) -> bool {
    lookup_field(name).is_some()
}

/// The legacy spelling that may stand in for the required field `current`.
pub fn legacy_fallback(current: &str) -> Option<&'static FieldSpec> {
    FIELD_SPECS.iter().find(|f| {
        matches!(f.requiredness, Requiredness::LegacyRequired { replaced_by } if replaced_by == current)
    })
}

/// Outcome of looking a declared field up in a document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution<'a> {
    /// Nothing to check: the field is absent, or its value was rejected and
    /// the reason recorded.
    Skipped,
    /// Field present with an accepted shape. `spec` is the legacy spec when
    /// the requirement was met by the legacy spelling.
    Present {
        spec: &'static FieldSpec,
        value: &'a Value,
    },
}

/// Resolves `spec` against a document, applying the requiredness policy,
/// the legacy migration rule and the accepted-shape check. Violations are
/// pushed to `errors`.
///
/// When both the current and the legacy spelling are present, the legacy one
/// is reported and the current one is still resolved, so its own defects are
/// not lost. Legacy specs are resolved through the field they replace;
/// calling this with a legacy spec directly treats it as optional.
pub fn resolve<'a>(
    doc: &'a Map<String, Value>,
    spec: &'static FieldSpec,
    errors: &mut Vec<ValidationError>,
) -> Resolution<'a> {
    let current = doc.get(spec.name);
    let legacy = match spec.requiredness {
        Requiredness::Required => legacy_fallback(spec.name)
            .and_then(|l| doc.get(l.name).map(|value| (l, value))),
        _ => None,
    };

    let (spec, value) = match (current, legacy) {
        (Some(value), Some((legacy_spec, _))) => {
            errors.push(ValidationError::new(
                FieldPath::field(legacy_spec.name),
                ErrorKind::UnexpectedField,
                format!(
                    "legacy field '{}' cannot be combined with '{}'",
                    legacy_spec.name, spec.name
                ),
            ));
            (spec, value)
        }
        (Some(value), None) => (spec, value),
        (None, Some((legacy_spec, value))) => (legacy_spec, value),
        (None, None) => {
            if spec.requiredness == Requiredness::Required {
                errors.push(missing(spec));
            }
            return Resolution::Skipped;
        }
    };

    if !spec.shape.accepts(value) {
        errors.push(ValidationError::new(
            FieldPath::field(spec.name),
            ErrorKind::TypeMismatch,
            format!(
                "field '{}' must be of type {}, got {}",
                spec.name,
                spec.shape,
                Shape::of(value).name()
            ),
        ));
        return Resolution::Skipped;
    }
    Resolution::Present { spec, value }
}

fn missing(spec: &FieldSpec) -> ValidationError {
    let message = match legacy_fallback(spec.name) {
        Some(legacy) => format!(
            "missing required field: {} (or legacy '{}')",
            spec.name, legacy.name
        ),
        None => format!("missing required field: {}", spec.name),
    };
    ValidationError::new(FieldPath::field(spec.name), ErrorKind::MissingField, message)
}
