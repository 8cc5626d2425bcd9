//! Shapes of values in a parsed document tree.
//!
//! A document arrives as a generic [`serde_json::Value`]. Validators decode a
//! value into a [`Shape`] once and dispatch on the variant, so the "which
//! format is this field in" decision is made in exactly one place per field.

use serde_json::{Map, Value};
use std::fmt;

/// Shape a field is declared to accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    String,
    Integer,
    Boolean,
    List,
    Mapping,
    /// Any of the listed shapes. Used by fields with a current and a legacy form.
    OneOf(&'static [ShapeKind]),
}

impl ShapeKind {
    /// Returns whether `value` has this shape.
    pub fn accepts(&self, value: &Value) -> bool {
        let shape = Shape::of(value);
        match self {
            ShapeKind::String => matches!(shape, Shape::String(_)),
            ShapeKind::Integer => matches!(shape, Shape::Integer(_)),
            ShapeKind::Boolean => matches!(shape, Shape::Boolean(_)),
            ShapeKind::List => matches!(shape, Shape::List(_)),
            ShapeKind::Mapping => matches!(shape, Shape::Mapping(_)),
            ShapeKind::OneOf(kinds) => kinds.iter().any(|k| k.accepts(value)),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::String => f.write_str("string"),
            ShapeKind::Integer => f.write_str("integer"),
            ShapeKind::Boolean => f.write_str("boolean"),
            ShapeKind::List => f.write_str("list"),
            ShapeKind::Mapping => f.write_str("mapping"),
            ShapeKind::OneOf(kinds) => {
                for (i, kind) in kinds.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{}", kind)?;
                }
                Ok(())
            }
        }
    }
}

/// A borrowed, decoded view of one value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape<'a> {
    Null,
    Boolean(bool),
    /// Integers outside the `i64` range decode as [`Shape::Float`].
    Integer(i64),
    Float(f64),
    String(&'a str),
    List(&'a [Value]),
    Mapping(&'a Map<String, Value>),
}

impl<'a> Shape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Shape::Integer(i),
                None => Shape::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Shape::String(s.as_str()),
            Value::Array(items) => Shape::List(items.as_slice()),
            Value::Object(map) => Shape::Mapping(map),
        }
    }

    /// Human-readable name of the decoded shape, used in type-mismatch messages.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Boolean(_) => "boolean",
            Shape::Integer(_) => "integer",
            Shape::Float(_) => "float",
            Shape::String(_) => "string",
            Shape::List(_) => "list",
            Shape::Mapping(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Shape::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&'a Map<String, Value>> {
        match self {
            Shape::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&'a [Value]> {
        match self {
            Shape::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Renders a scalar the way it appears in a document, for use in messages.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_of_accepts_each_member() {
        let kind = ShapeKind::OneOf(&[ShapeKind::Mapping, ShapeKind::List]);
        assert!(kind.accepts(&json!({"a": 1})));
        assert!(kind.accepts(&json!([1, 2])));
        assert!(!kind.accepts(&json!("text")));
        assert_eq!(kind.to_string(), "mapping or list");
    }

    #[test]
    fn booleans_are_not_integers() {
        assert!(!ShapeKind::Integer.accepts(&json!(true)));
        assert!(ShapeKind::Integer.accepts(&json!(3)));
        assert!(!ShapeKind::Integer.accepts(&json!(3.5)));
    }
}
