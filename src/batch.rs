//! Batch validation of a file or a directory tree of path documents.
//!
//! Documents are independent, so they are validated on a rayon pool. Reports
//! come back in enumeration order regardless of which worker finished first.

use crate::config::ValidatorConfig;
use crate::error::{BatchError, ErrorKind, FieldPath, ValidationError, ValidationResult};
use crate::parse::SourceFormat;
use crate::validate::Validator;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const MAX_WALK_DEPTH: usize = 32;

/// Verdict and errors for one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub passed: bool,
    pub errors: Vec<ValidationError>,
}

impl DocumentReport {
    fn new(path: PathBuf, result: ValidationResult) -> Self {
        DocumentReport {
            path,
            passed: result.is_valid(),
            errors: result.errors,
        }
    }

    /// A document that could not be read at all.
    fn unreadable(path: PathBuf, reason: &str) -> Self {
        let error = ValidationError::new(
            FieldPath::root(),
            ErrorKind::ParseFailure,
            format!("failed to read file: {}", reason),
        );
        DocumentReport::new(path, ValidationResult { errors: vec![error] })
    }
}

/// Per-document reports plus the aggregate tally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchReport {
    fn from_documents(documents: Vec<DocumentReport>) -> Self {
        let passed = documents.iter().filter(|d| d.passed).count();
        let total = documents.len();
        BatchReport {
            documents,
            passed,
            failed: total - passed,
            total,
        }
    }

    /// Adds a failed report per unreadable entry, keeping path order.
    fn with_unreadable(self, unreadable: &[(PathBuf, String)]) -> Self {
        if unreadable.is_empty() {
            return self;
        }
        let mut documents = self.documents;
        documents.extend(
            unreadable
                .iter()
                .map(|(path, reason)| DocumentReport::unreadable(path.clone(), reason)),
        );
        documents.sort_by(|a, b| a.path.cmp(&b.path));
        BatchReport::from_documents(documents)
    }

    /// True when no document failed. An empty batch succeeds.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status: non-zero iff any document failed.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Candidate documents found under a target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Documents to validate, sorted lexicographically.
    pub paths: Vec<PathBuf>,
    /// Entries the walk could not read, with the reason. Each is reported as
    /// a failed document rather than aborting the batch.
    pub unreadable: Vec<(PathBuf, String)>,
}

/// Enumerate candidate documents under `target`.
///
/// A file target is returned as-is when it has a YAML or JSON extension.
/// A directory is walked recursively for `.yaml` and `.yml` files.
pub fn discover(target: &Path) -> Result<Discovery, BatchError> {
    if !target.exists() {
        return Err(BatchError::MissingTarget(target.to_path_buf()));
    }
    let mut found = Discovery::default();
    if target.is_file() {
        if SourceFormat::from_path(target).is_some() {
            found.paths.push(target.to_path_buf());
        } else {
            warn!(path = %target.display(), "target is not a YAML or JSON file");
        }
        return Ok(found);
    }

    for entry in WalkDir::new(target)
        .follow_links(false)
        .max_depth(MAX_WALK_DEPTH)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(target).to_path_buf();
                warn!(path = %path.display(), error = %e, "failed to read directory entry");
                found.unreadable.push((path, e.to_string()));
                continue;
            }
        };
        if entry.file_type().is_file()
            && SourceFormat::from_path(entry.path()) == Some(SourceFormat::Yaml)
        {
            found.paths.push(entry.into_path());
        }
    }
    found.paths.sort();
    Ok(found)
}

/// Read, parse and validate one file. Read failures are reported as parse
/// failures of that document.
pub fn validate_file(path: &Path, validator: &Validator) -> DocumentReport {
    let format = SourceFormat::from_path(path).unwrap_or(SourceFormat::Yaml);
    let result = match std::fs::read_to_string(path) {
        Ok(content) => validator.validate_source(&content, format),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read document");
            return DocumentReport::unreadable(path.to_path_buf(), &e.to_string());
        }
    };
    debug!(
        path = %path.display(),
        errors = result.errors.len(),
        "validated document"
    );
    DocumentReport::new(path.to_path_buf(), result)
}

/// Validate `paths` with up to `jobs` workers.
pub fn run(paths: &[PathBuf], validator: &Validator, jobs: Option<usize>) -> BatchReport {
    info!(count = paths.len(), "validating documents");
    let validate_all = || -> Vec<DocumentReport> {
        paths
            .par_iter()
            .map(|path| validate_file(path, validator))
            .collect()
    };

    let documents = match jobs {
        Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(validate_all),
            Err(e) => {
                warn!(error = %e, "failed to build worker pool, using global pool");
                validate_all()
            }
        },
        None => validate_all(),
    };

    let report = BatchReport::from_documents(documents);
    info!(
        passed = report.passed,
        failed = report.failed,
        total = report.total,
        "batch complete"
    );
    report
}

/// Discover and validate everything under `target`.
pub fn validate_target(target: &Path, config: &ValidatorConfig) -> Result<BatchReport, BatchError> {
    let found = discover(target)?;
    let report = run(&found.paths, &config.validator(), config.jobs);
    Ok(report.with_unreadable(&found.unreadable))
}
