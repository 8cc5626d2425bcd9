use crate::error::ParseError;
use serde_json::Value;
use std::path::Path;

/// Source encoding of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    /// Picks the format from a file extension: `.yaml`/`.yml` or `.json`.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Some(SourceFormat::Yaml),
            Some("json") => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

/// Parse YAML text into a generic document tree.
///
/// Performs decoding only. The root may be any value, including null for an
/// empty document; checking that it is a mapping is the validator's job.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    parse_as(input, SourceFormat::Yaml)
}

/// Parse text in the given format into a generic document tree.
pub fn parse_as(input: &str, format: SourceFormat) -> Result<Value, ParseError> {
    match format {
        SourceFormat::Yaml => parse_yaml(input),
        SourceFormat::Json => serde_json::from_str(input).map_err(|e| ParseError {
            message: e.to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
        }),
    }
}

fn parse_yaml(input: &str) -> Result<Value, ParseError> {
    // A file holding nothing but comments is an empty document.
    if is_blank_yaml(input) {
        return Ok(Value::Null);
    }

    check_multi_document(input)?;

    serde_saphyr::from_str_with_options(input, yaml_options())
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Decoder options shared by documents and config files. Only `true` and
/// `false` are booleans; YAML 1.1 forms such as `y`, `n`, `on` and `no` stay
/// strings.
pub(crate) fn yaml_options() -> serde_saphyr::Options {
    serde_saphyr::options! {
        strict_booleans: true,
    }
}

fn is_blank_yaml(input: &str) -> bool {
    input.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---"
    })
}

/// Check for multiple YAML documents (--- separator).
/// Only matches `---` at column 0 to avoid false positives inside block scalars.
fn check_multi_document(input: &str) -> Result<(), ParseError> {
    let mut doc_count = 0;
    for (line_num, line) in input.lines().enumerate() {
        if line.starts_with("---") && line[3..].trim().is_empty() {
            doc_count += 1;
            if doc_count > 1 {
                return Err(ParseError {
                    message: "multi-document YAML is not supported".to_string(),
                    line: Some(line_num + 1),
                    column: Some(1),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comment_only_file_is_null() {
        assert_eq!(parse("# nothing here\n\n").unwrap(), Value::Null);
        assert_eq!(parse("").unwrap(), Value::Null);
    }

    #[test]
    fn multi_document_is_rejected() {
        let err = parse("---\na: 1\n---\nb: 2\n").unwrap_err();
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn json_errors_carry_location() {
        let err = parse_as("{\"a\": }", SourceFormat::Json).unwrap_err();
        assert_eq!(err.line, Some(1));
        assert!(err.column.is_some());
    }

    #[test]
    fn yaml_and_json_decode_to_the_same_tree() {
        let yaml = parse("id: iam-001\nservices: [iam]\n").unwrap();
        let json = parse_as(r#"{"id": "iam-001", "services": ["iam"]}"#, SourceFormat::Json).unwrap();
        assert_eq!(yaml, json);
        assert_eq!(yaml, json!({"id": "iam-001", "services": ["iam"]}));
    }

    #[test]
    fn yaml11_boolean_forms_stay_strings() {
        let doc = parse("name: n\nid: y\nflag: on\nanswer: No\nreal: true\n").unwrap();
        assert_eq!(
            doc,
            json!({"name": "n", "id": "y", "flag": "on", "answer": "No", "real": true})
        );
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a/iam-001.yml")), Some(SourceFormat::Yaml));
        assert_eq!(SourceFormat::from_path(Path::new("paths.json")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_path(Path::new("README.md")), None);
    }
}
