use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingField,
    TypeMismatch,
    EnumViolation,
    FormatViolation,
    SequenceViolation,
    DuplicateId,
    ReferentialIntegrityViolation,
    UnexpectedField,
    ShapeInvalid,
    ParseFailure,
}

impl ErrorKind {
    /// Fatal kinds suppress every other check for the document.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::ParseFailure | ErrorKind::ShapeInvalid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingField => "missing_field",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::EnumViolation => "enum_violation",
            ErrorKind::FormatViolation => "format_violation",
            ErrorKind::SequenceViolation => "sequence_violation",
            ErrorKind::DuplicateId => "duplicate_id",
            ErrorKind::ReferentialIntegrityViolation => "referential_integrity_violation",
            ErrorKind::UnexpectedField => "unexpected_field",
            ErrorKind::ShapeInvalid => "shape_invalid",
            ErrorKind::ParseFailure => "parse_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a value inside a document, as an ordered list of segments.
///
/// Mapping keys are stored verbatim; list indices are stored as `[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    pub fn field(name: &str) -> Self {
        FieldPath(vec![name.to_string()])
    }

    /// Returns a new path extended with a mapping key.
    pub fn key(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        FieldPath(segments)
    }

    /// Returns a new path extended with a list index.
    pub fn index(&self, i: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(format!("[{}]", i));
        FieldPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<document>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 && !segment.starts_with('[') {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// A single defect found in a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: FieldPath,
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: FieldPath, kind: ErrorKind, message: impl Into<String>) -> Self {
        ValidationError {
            path,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Produced by `parse` when the source text cannot be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "{}:{}: {}", line, col, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for ValidationError {
    fn from(e: ParseError) -> Self {
        ValidationError::new(
            FieldPath::root(),
            ErrorKind::ParseFailure,
            format!("parsing error: {}", e),
        )
    }
}

/// Verdict for one document: every error found, in check order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }
}

/// Error raised by the export pipeline.
#[derive(Debug)]
pub enum ExportError {
    MissingInput(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::MissingInput(dir) => write!(f, "data directory '{}' does not exist", dir),
            ExportError::Io(e) => write!(f, "I/O error: {}", e),
            ExportError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::MissingInput(_) => None,
            ExportError::Io(e) => Some(e),
            ExportError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Json(e)
    }
}

/// Error raised while loading a configuration file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Error raised while enumerating a batch target.
#[derive(Debug)]
pub enum BatchError {
    MissingTarget(std::path::PathBuf),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::MissingTarget(path) => {
                write!(f, "path '{}' does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for BatchError {}
