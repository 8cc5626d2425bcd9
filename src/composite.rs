//! Validators for nested and union-shaped fields.
//!
//! Every validator takes the field value, the path it lives at and an error
//! sink. Errors are collected, never short-circuited: one call reports every
//! defect it can find in the field.

use crate::enums::{
    ENVIRONMENT_TYPES, EXPLOITATION_TOOLS, LEGACY_SUPPORT_TOOLS, PREREQUISITE_TABS,
    PREREQUISITE_TYPES, PRICING_MODELS,
};
use crate::error::{ErrorKind, FieldPath, ValidationError};
use crate::primitives::{check_enum, check_sequential, validate_identifier, validate_permission_string};
use crate::shape::{Shape, ShapeKind};
use serde_json::{Map, Value};
use tracing::debug;

// ─── Shared helpers ─────────────────────────────────────────────────────────

pub(crate) fn type_mismatch(
    path: &FieldPath,
    expected: ShapeKind,
    value: &Value,
) -> ValidationError {
    ValidationError::new(
        path.clone(),
        ErrorKind::TypeMismatch,
        format!("{} must be of type {}, got {}", path, expected, Shape::of(value).name()),
    )
}

pub(crate) fn missing(path: &FieldPath, field: &str) -> ValidationError {
    ValidationError::new(
        path.key(field),
        ErrorKind::MissingField,
        format!("{} must have a '{}' field", path, field),
    )
}

pub(crate) fn empty(path: &FieldPath) -> ValidationError {
    ValidationError::new(
        path.clone(),
        ErrorKind::FormatViolation,
        format!("{} cannot be empty", path),
    )
}

/// Returns the value under `key`, recording a missing-field error if absent.
pub(crate) fn require<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a Value> {
    let value = map.get(key);
    if value.is_none() {
        errors.push(missing(path, key));
    }
    value
}

pub(crate) fn expect_str<'a>(
    value: &'a Value,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    let s = value.as_str();
    if s.is_none() {
        errors.push(type_mismatch(path, ShapeKind::String, value));
    }
    s
}

pub(crate) fn expect_mapping<'a>(
    value: &'a Value,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a Map<String, Value>> {
    let map = value.as_object();
    if map.is_none() {
        errors.push(type_mismatch(path, ShapeKind::Mapping, value));
    }
    map
}

pub(crate) fn expect_list<'a>(
    value: &'a Value,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a [Value]> {
    let items = value.as_array().map(Vec::as_slice);
    if items.is_none() {
        errors.push(type_mismatch(path, ShapeKind::List, value));
    }
    items
}

/// A required string under `key`.
pub(crate) fn require_str<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    require(map, key, path, errors).and_then(|v| expect_str(v, &path.key(key), errors))
}

/// An optional string under `key`; only its type is checked.
pub(crate) fn optional_str<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    map.get(key)
        .and_then(|v| expect_str(v, &path.key(key), errors))
}

fn check(result: Result<(), ValidationError>, errors: &mut Vec<ValidationError>) {
    if let Err(e) = result {
        errors.push(e);
    }
}

// ─── services ───────────────────────────────────────────────────────────────

/// `services`: a non-empty list of service names.
pub fn validate_services(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    let Some(services) = expect_list(value, path, errors) else {
        return;
    };
    if services.is_empty() {
        errors.push(empty(path));
    }
    for (i, service) in services.iter().enumerate() {
        expect_str(service, &path.index(i), errors);
    }
}

// ─── permissions ────────────────────────────────────────────────────────────

/// `permissions`: `required` (non-empty) and optional `additional` lists of
/// permission entries.
pub fn validate_permissions(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    let Some(map) = expect_mapping(value, path, errors) else {
        return;
    };
    if let Some(required) = require(map, "required", path, errors) {
        validate_permission_list(required, &path.key("required"), true, errors);
    }
    if let Some(additional) = map.get("additional") {
        validate_permission_list(additional, &path.key("additional"), false, errors);
    }
}

/// Legacy `requiredPermissions`: a non-empty list of permission entries.
pub fn validate_required_permissions(
    value: &Value,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) {
    validate_permission_list(value, path, true, errors);
}

fn validate_permission_list(
    value: &Value,
    path: &FieldPath,
    non_empty: bool,
    errors: &mut Vec<ValidationError>,
) {
    let Some(entries) = expect_list(value, path, errors) else {
        return;
    };
    if non_empty && entries.is_empty() {
        errors.push(empty(path));
    }
    for (i, entry) in entries.iter().enumerate() {
        let entry_path = path.index(i);
        let Some(entry) = expect_mapping(entry, &entry_path, errors) else {
            continue;
        };
        if let Some(permission) = require_str(entry, "permission", &entry_path, errors) {
            check(
                validate_permission_string(permission, &entry_path.key("permission")),
                errors,
            );
        }
    }
}

// ─── prerequisites ──────────────────────────────────────────────────────────

/// `prerequisites`: either tabbed (`{admin: [..], lateral: [..]}`) or the
/// legacy list of strings / `{condition, type}` objects.
pub fn validate_prerequisites(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    match Shape::of(value) {
        Shape::Mapping(tabs) => {
            if tabs.is_empty() {
                errors.push(empty(path));
            }
            for (tab, entries) in tabs {
                let tab_path = path.key(tab);
                check(
                    check_enum(&PREREQUISITE_TABS, &Value::String(tab.clone()), &tab_path),
                    errors,
                );
                if let Some(entries) = expect_list(entries, &tab_path, errors) {
                    for (i, entry) in entries.iter().enumerate() {
                        expect_str(entry, &tab_path.index(i), errors);
                    }
                }
            }
        }
        Shape::List(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                let entry_path = path.index(i);
                match Shape::of(entry) {
                    Shape::String(_) => {}
                    Shape::Mapping(prereq) => {
                        require(prereq, "condition", &entry_path, errors);
                        if let Some(kind) = prereq.get("type") {
                            check(
                                check_enum(&PREREQUISITE_TYPES, kind, &entry_path.key("type")),
                                errors,
                            );
                        }
                    }
                    other => errors.push(ValidationError::new(
                        entry_path.clone(),
                        ErrorKind::TypeMismatch,
                        format!(
                            "{} must be a string or mapping, got {}",
                            entry_path,
                            other.name()
                        ),
                    )),
                }
            }
        }
        _ => errors.push(type_mismatch(
            path,
            ShapeKind::OneOf(&[ShapeKind::Mapping, ShapeKind::List]),
            value,
        )),
    }
}

// ─── exploitationSteps ──────────────────────────────────────────────────────

/// `exploitationSteps`: a flat step list (legacy) or a mapping of tool name
/// to step list.
pub fn validate_exploitation_steps(
    value: &Value,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) {
    match Shape::of(value) {
        Shape::List(steps) => validate_step_list(steps, None, path, errors),
        Shape::Mapping(tools) => {
            if tools.is_empty() {
                errors.push(empty(path));
            }
            for (tool, steps) in tools {
                let tool_path = path.key(tool);
                check(
                    check_enum(&EXPLOITATION_TOOLS, &Value::String(tool.clone()), &tool_path),
                    errors,
                );
                if let Some(steps) = expect_list(steps, &tool_path, errors) {
                    validate_step_list(steps, Some(tool), &tool_path, errors);
                }
            }
        }
        _ => errors.push(type_mismatch(
            path,
            ShapeKind::OneOf(&[ShapeKind::Mapping, ShapeKind::List]),
            value,
        )),
    }
}

/// Each step needs `step`, `command` and `description`; the step numbers
/// must form `1..=N` in any order. `tool` is carried into messages.
fn validate_step_list(
    steps: &[Value],
    tool: Option<&str>,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) {
    if steps.is_empty() {
        let owner = tool.map(|t| format!("tool '{}' ", t)).unwrap_or_default();
        errors.push(ValidationError::new(
            path.clone(),
            ErrorKind::FormatViolation,
            format!("{}steps list cannot be empty", owner),
        ));
        return;
    }

    let mut numbers = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let step_path = path.index(i);
        let Some(step) = expect_mapping(step, &step_path, errors) else {
            continue;
        };
        if let Some(number) = require(step, "step", &step_path, errors) {
            match Shape::of(number) {
                Shape::Integer(n) => numbers.push(n),
                _ => errors.push(type_mismatch(
                    &step_path.key("step"),
                    ShapeKind::Integer,
                    number,
                )),
            }
        }
        require_str(step, "command", &step_path, errors);
        require_str(step, "description", &step_path, errors);
    }

    // Numbering is only meaningful once every step carries an integer.
    if numbers.len() == steps.len() {
        check(check_sequential(&numbers, tool, path), errors);
    }
}

// ─── discoveredBy ───────────────────────────────────────────────────────────

/// `discoveredBy`: a mapping with at least a `name`.
pub fn validate_discovered_by(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    if let Some(map) = expect_mapping(value, path, errors) {
        require(map, "name", path, errors);
    }
}

// ─── discoveryAttribution ───────────────────────────────────────────────────

/// `discoveryAttribution`: the object form (`firstDocumented`, optional
/// `derivativeOf` and `ultimateOrigin`) or the legacy `[{item, link}]` list.
pub fn validate_discovery_attribution(
    value: &Value,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) {
    match Shape::of(value) {
        Shape::Mapping(attribution) => validate_attribution_object(attribution, path, errors),
        Shape::List(items) => validate_attribution_list(items, path, errors),
        _ => errors.push(ValidationError::new(
            path.clone(),
            ErrorKind::TypeMismatch,
            format!(
                "{} must be either an object (with firstDocumented) or a list, got {}",
                path,
                Shape::of(value).name()
            ),
        )),
    }
}

fn validate_attribution_object(
    attribution: &Map<String, Value>,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(first) = require(attribution, "firstDocumented", path, errors) {
        let first_path = path.key("firstDocumented");
        if let Some(first) = expect_mapping(first, &first_path, errors) {
            for key in ["author", "organization", "source", "link"] {
                optional_str(first, key, &first_path, errors);
            }
            if let Some(date) = first.get("date")
                && !matches!(Shape::of(date), Shape::String(_) | Shape::Integer(_))
            {
                errors.push(type_mismatch(
                    &first_path.key("date"),
                    ShapeKind::OneOf(&[ShapeKind::String, ShapeKind::Integer]),
                    date,
                ));
            }
        }
    }

    if let Some(derivative) = attribution.get("derivativeOf") {
        let derivative_path = path.key("derivativeOf");
        if let Some(derivative) = expect_mapping(derivative, &derivative_path, errors) {
            require_str(derivative, "pathId", &derivative_path, errors);
            optional_str(derivative, "modification", &derivative_path, errors);
        }
    }

    if let Some(origin) = attribution.get("ultimateOrigin") {
        expect_mapping(origin, &path.key("ultimateOrigin"), errors);
    }
}

fn validate_attribution_list(items: &[Value], path: &FieldPath, errors: &mut Vec<ValidationError>) {
    if items.is_empty() {
        errors.push(empty(path));
    }
    for (i, item) in items.iter().enumerate() {
        let item_path = path.index(i);
        if let Some(item) = expect_mapping(item, &item_path, errors) {
            require_str(item, "item", &item_path, errors);
            optional_str(item, "link", &item_path, errors);
        }
    }
}

// ─── learningEnvironments ───────────────────────────────────────────────────

/// `learningEnvironments`: a non-empty mapping of environment name to a
/// description whose follow-up fields depend on its `type`.
pub fn validate_learning_environments(
    value: &Value,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) {
    let Some(environments) = expect_mapping(value, path, errors) else {
        return;
    };
    if environments.is_empty() {
        errors.push(empty(path));
    }
    for (name, environment) in environments {
        let env_path = path.key(name);
        let Some(environment) = expect_mapping(environment, &env_path, errors) else {
            continue;
        };
        require_str(environment, "description", &env_path, errors);

        let Some(kind) = require(environment, "type", &env_path, errors) else {
            continue;
        };
        if let Err(e) = check_enum(&ENVIRONMENT_TYPES, kind, &env_path.key("type")) {
            errors.push(e);
            continue;
        }
        match kind.as_str() {
            Some("open-source") => {
                require_str(environment, "githubLink", &env_path, errors);
            }
            Some("closed-source") => {
                if let Some(pricing) = require(environment, "scenarioPricingModel", &env_path, errors)
                {
                    check(
                        check_enum(&PRICING_MODELS, pricing, &env_path.key("scenarioPricingModel")),
                        errors,
                    );
                }
                if environment.contains_key("scenario") {
                    optional_str(environment, "scenario", &env_path, errors);
                } else {
                    debug!(environment = %name, "closed-source learning environment has no scenario");
                }
            }
            _ => {}
        }
    }
}

// ─── toolSupport (deprecated) ───────────────────────────────────────────────

/// Deprecated `toolSupport`: legacy tool name → boolean.
pub fn validate_tool_support(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    let Some(tools) = expect_mapping(value, path, errors) else {
        return;
    };
    for (tool, supported) in tools {
        let tool_path = path.key(tool);
        check(
            check_enum(&LEGACY_SUPPORT_TOOLS, &Value::String(tool.clone()), &tool_path),
            errors,
        );
        if !ShapeKind::Boolean.accepts(supported) {
            errors.push(type_mismatch(&tool_path, ShapeKind::Boolean, supported));
        }
    }
}

// ─── references / relatedPaths / detection ──────────────────────────────────

/// `references`: mappings with `title` and `url`.
pub fn validate_references(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    let Some(references) = expect_list(value, path, errors) else {
        return;
    };
    for (i, reference) in references.iter().enumerate() {
        let ref_path = path.index(i);
        if let Some(reference) = expect_mapping(reference, &ref_path, errors) {
            require(reference, "title", &ref_path, errors);
            require(reference, "url", &ref_path, errors);
        }
    }
}

/// `relatedPaths`: identifiers of other path documents.
pub fn validate_related_paths(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    let Some(ids) = expect_list(value, path, errors) else {
        return;
    };
    for (i, id) in ids.iter().enumerate() {
        let id_path = path.index(i);
        if let Some(id) = expect_str(id, &id_path, errors)
            && let Err(mut e) = validate_identifier(id, &id_path)
        {
            e.message = format!("invalid related path ID '{}': {}", id, e.message);
            errors.push(e);
        }
    }
}

/// `detectionRules`: mappings with at least a `platform`.
pub fn validate_detection_rules(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    let Some(rules) = expect_list(value, path, errors) else {
        return;
    };
    for (i, rule) in rules.iter().enumerate() {
        let rule_path = path.index(i);
        if let Some(rule) = expect_mapping(rule, &rule_path, errors) {
            require(rule, "platform", &rule_path, errors);
        }
    }
}

/// `detectionTools`: detection tool name → link to its detection source.
pub fn validate_detection_tools(value: &Value, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    if let Some(tools) = expect_mapping(value, path, errors) {
        for (tool, link) in tools {
            expect_str(link, &path.key(tool), errors);
        }
    }
}
