//! Document validation.
//!
//! A document moves through three outcomes: it fails to parse, it parses to
//! something other than a mapping, or it is a mapping and every declared
//! field is checked. The first two are terminal and produce exactly one
//! error. Otherwise **all** errors are returned, not just the first, and the
//! document is never modified.

use crate::composite::*;
use crate::enums::CATEGORIES;
use crate::error::*;
use crate::fields::{FIELD_SPECS, Requiredness, Resolution, is_allowed, resolve};
use crate::graph::{AttackGraph, validate_attack_visualization};
use crate::parse::{SourceFormat, parse_as};
use crate::primitives::{check_enum, validate_identifier};
use crate::shape::Shape;
use crate::text::WrapHeuristic;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Validates path documents. Holds only read-only tuning, so one instance
/// can be shared across threads.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    heuristic: WrapHeuristic,
}

impl Validator {
    pub fn new(heuristic: WrapHeuristic) -> Self {
        Validator { heuristic }
    }

    pub fn heuristic(&self) -> &WrapHeuristic {
        &self.heuristic
    }

    /// Parse `input` and validate the result.
    pub fn validate_source(&self, input: &str, format: SourceFormat) -> ValidationResult {
        match parse_as(input, format) {
            Ok(doc) => self.validate(&doc),
            Err(e) => ValidationResult {
                errors: vec![e.into()],
            },
        }
    }

    /// Validate a parsed document tree.
    pub fn validate(&self, doc: &Value) -> ValidationResult {
        let doc = match Shape::of(doc) {
            Shape::Mapping(map) => map,
            Shape::Null => {
                return shape_invalid("file is empty or contains only comments".to_string());
            }
            other => {
                return shape_invalid(format!(
                    "document must be a mapping, got {}",
                    other.name()
                ));
            }
        };

        let mut errors = Vec::new();
        self.check_fields(doc, &mut errors);
        check_unexpected_fields(doc, &mut errors);
        ValidationResult { errors }
    }

    fn check_fields(&self, doc: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
        for spec in FIELD_SPECS {
            // Legacy spellings are resolved through the field they replace.
            if matches!(spec.requiredness, Requiredness::LegacyRequired { .. }) {
                continue;
            }
            if let Resolution::Present { spec, value } = resolve(doc, spec, errors) {
                self.check_field(spec.name, value, &FieldPath::field(spec.name), errors);
            }
        }
    }

    fn check_field(
        &self,
        name: &str,
        value: &Value,
        path: &FieldPath,
        errors: &mut Vec<ValidationError>,
    ) {
        match name {
            "id" => {
                if let Some(id) = value.as_str()
                    && let Err(e) = validate_identifier(id, path)
                {
                    errors.push(e);
                }
            }
            "category" => {
                if let Err(e) = check_enum(&CATEGORIES, value, path) {
                    errors.push(e);
                }
            }
            "services" => validate_services(value, path, errors),
            "permissions" => validate_permissions(value, path, errors),
            "requiredPermissions" => validate_required_permissions(value, path, errors),
            "exploitationSteps" => validate_exploitation_steps(value, path, errors),
            "discoveredBy" => validate_discovered_by(value, path, errors),
            "prerequisites" => validate_prerequisites(value, path, errors),
            "references" => validate_references(value, path, errors),
            "relatedPaths" => validate_related_paths(value, path, errors),
            "detectionRules" => validate_detection_rules(value, path, errors),
            "detectionTools" => validate_detection_tools(value, path, errors),
            "learningEnvironments" => validate_learning_environments(value, path, errors),
            "toolSupport" => validate_tool_support(value, path, errors),
            "attackVisualization" => {
                if let Some(graph) =
                    validate_attack_visualization(value, path, &self.heuristic, errors)
                {
                    trace_graph(&graph);
                }
            }
            "discoveryAttribution" => validate_discovery_attribution(value, path, errors),
            // name, description, recommendation, limitations: shape only.
            _ => {}
        }
    }
}

/// Validate a parsed document with the default heuristic.
pub fn validate(doc: &Value) -> ValidationResult {
    Validator::default().validate(doc)
}

fn trace_graph(graph: &AttackGraph<'_>) {
    let outcomes = graph
        .nodes()
        .iter()
        .filter(|n| n.node_type == Some("outcome"))
        .count();
    debug!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        outcomes,
        "attack graph resolved"
    );
    for edge in graph.edges() {
        trace!(
            from = graph.nodes()[edge.from].id,
            to = graph.nodes()[edge.to].id,
            label = edge.label,
            "attack graph edge"
        );
    }
}

fn shape_invalid(message: String) -> ValidationResult {
    ValidationResult {
        errors: vec![ValidationError::new(
            FieldPath::root(),
            ErrorKind::ShapeInvalid,
            message,
        )],
    }
}

/// One error per key outside the closed field set, in document order.
fn check_unexpected_fields(doc: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
    for key in doc.keys().filter(|k| !is_allowed(k)) {
        errors.push(ValidationError::new(
            FieldPath::field(key),
            ErrorKind::UnexpectedField,
            format!("unexpected field: {}", key),
        ));
    }
}
