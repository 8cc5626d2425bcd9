//! The `attackVisualization` field.
//!
//! The legacy form is a diagram-language string and is accepted as-is. The
//! structured form is a graph of typed nodes and labelled edges, checked in
//! two passes: nodes are interned into an index first (duplicate ids collide
//! on insertion), then every edge endpoint is resolved against that index.

use crate::composite::{empty, expect_list, expect_mapping, expect_str, missing, require, require_str};
use crate::enums::NODE_TYPES;
use crate::error::{ErrorKind, FieldPath, ValidationError};
use crate::primitives::check_enum;
use crate::shape::{Shape, ShapeKind};
use crate::text::WrapHeuristic;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// A node of the attack graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node<'a> {
    pub id: &'a str,
    pub node_type: Option<&'a str>,
}

/// An edge whose endpoints both resolved to declared nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge<'a> {
    /// Index into [`AttackGraph::nodes`].
    pub from: usize,
    pub to: usize,
    pub label: Option<&'a str>,
}

/// Nodes interned in declaration order plus the edges between them.
#[derive(Clone, Debug, Default)]
pub struct AttackGraph<'a> {
    nodes: Vec<Node<'a>>,
    index: HashMap<&'a str, usize>,
    edges: Vec<Edge<'a>>,
}

impl<'a> AttackGraph<'a> {
    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge<'a>] {
        &self.edges
    }

    pub fn lookup(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Interns a node id. Returns `false` if the id was already present.
    fn intern(&mut self, node: Node<'a>) -> bool {
        match self.index.entry(node.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.nodes.len());
                self.nodes.push(node);
                true
            }
        }
    }
}

/// Validates `attackVisualization` in either form.
///
/// Returns the graph built from the structured form; `None` for the legacy
/// string form or when the value has neither shape.
pub fn validate_attack_visualization<'a>(
    value: &'a Value,
    path: &FieldPath,
    heuristic: &WrapHeuristic,
    errors: &mut Vec<ValidationError>,
) -> Option<AttackGraph<'a>> {
    match Shape::of(value) {
        Shape::String(_) => None,
        Shape::Mapping(graph) => Some(build_graph(graph, path, heuristic, errors)),
        _ => {
            errors.push(ValidationError::new(
                path.clone(),
                ErrorKind::TypeMismatch,
                format!(
                    "{} must be either a {} (diagram) or a {} (structured), got {}",
                    path,
                    ShapeKind::String,
                    ShapeKind::Mapping,
                    Shape::of(value).name()
                ),
            ));
            None
        }
    }
}

fn build_graph<'a>(
    graph: &'a Map<String, Value>,
    path: &FieldPath,
    heuristic: &WrapHeuristic,
    errors: &mut Vec<ValidationError>,
) -> AttackGraph<'a> {
    let mut out = AttackGraph::default();

    let nodes = required_list(graph, "nodes", path, errors);
    if let Some(nodes) = nodes {
        let nodes_path = path.key("nodes");
        for (i, node) in nodes.iter().enumerate() {
            collect_node(&mut out, node, &nodes_path.index(i), heuristic, errors);
        }
    }

    // Without a usable node list every endpoint would be unresolved.
    let resolve = nodes.is_some_and(|n| !n.is_empty());
    let edges = required_list(graph, "edges", path, errors);
    if let Some(edges) = edges {
        let edges_path = path.key("edges");
        for (i, edge) in edges.iter().enumerate() {
            collect_edge(&mut out, edge, &edges_path.index(i), resolve, heuristic, errors);
        }
    }

    out
}

/// A required, non-empty list under `key`.
fn required_list<'a>(
    graph: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a [Value]> {
    let list_path = path.key(key);
    let items = require(graph, key, path, errors).and_then(|v| expect_list(v, &list_path, errors))?;
    if items.is_empty() {
        errors.push(empty(&list_path));
    }
    Some(items)
}

fn collect_node<'a>(
    graph: &mut AttackGraph<'a>,
    node: &'a Value,
    path: &FieldPath,
    heuristic: &WrapHeuristic,
    errors: &mut Vec<ValidationError>,
) {
    let Some(node) = expect_mapping(node, path, errors) else {
        return;
    };
    let id = require_str(node, "id", path, errors);
    require_str(node, "label", path, errors);
    let node_type = match node.get("type") {
        Some(kind) => {
            if let Err(e) = check_enum(&NODE_TYPES, kind, &path.key("type")) {
                errors.push(e);
            }
            kind.as_str()
        }
        None => {
            errors.push(missing(path, "type"));
            None
        }
    };

    if let Some(id) = id {
        if !graph.intern(Node { id, node_type }) {
            errors.push(ValidationError::new(
                path.key("id"),
                ErrorKind::DuplicateId,
                format!("duplicate node ID: {}", id),
            ));
        }
        if description_is_wrapped(node, path, heuristic, errors) {
            errors.push(wrapped_description(
                path,
                format!("node '{}' has artificial line breaks in description", id),
            ));
        }
    }
}

fn collect_edge<'a>(
    graph: &mut AttackGraph<'a>,
    edge: &'a Value,
    path: &FieldPath,
    resolve: bool,
    heuristic: &WrapHeuristic,
    errors: &mut Vec<ValidationError>,
) {
    let Some(edge) = expect_mapping(edge, path, errors) else {
        return;
    };
    let from = require_str(edge, "from", path, errors);
    let to = require_str(edge, "to", path, errors);
    let label = require_str(edge, "label", path, errors);

    let mut endpoint = |key: &str, id: Option<&str>| -> Option<usize> {
        let id = id?;
        if !resolve {
            return None;
        }
        let found = graph.lookup(id);
        if found.is_none() {
            errors.push(ValidationError::new(
                path.key(key),
                ErrorKind::ReferentialIntegrityViolation,
                format!("edge references non-existent node: {}", id),
            ));
        }
        found
    };
    let from_index = endpoint("from", from);
    let to_index = endpoint("to", to);

    if let (Some(from), Some(to)) = (from_index, to_index) {
        graph.edges.push(Edge { from, to, label });
    }

    if description_is_wrapped(edge, path, heuristic, errors) {
        errors.push(wrapped_description(
            path,
            format!(
                "edge from '{}' to '{}' has artificial line breaks in description",
                from.unwrap_or("?"),
                to.unwrap_or("?")
            ),
        ));
    }
}

/// Null or empty descriptions are skipped.
fn description_is_wrapped(
    item: &Map<String, Value>,
    path: &FieldPath,
    heuristic: &WrapHeuristic,
    errors: &mut Vec<ValidationError>,
) -> bool {
    match item.get("description") {
        None | Some(Value::Null) => false,
        Some(description) => expect_str(description, &path.key("description"), errors)
            .is_some_and(|text| heuristic.is_wrapped(text)),
    }
}

fn wrapped_description(path: &FieldPath, subject: String) -> ValidationError {
    ValidationError::new(
        path.key("description"),
        ErrorKind::FormatViolation,
        format!(
            "{}. Text should flow as single-line paragraphs without ~80 character wraps",
            subject
        ),
    )
}
