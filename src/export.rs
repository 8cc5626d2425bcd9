//! Export of a document corpus as a single JSON file for the website.
//!
//! Every YAML document under the input directory is parsed (not validated),
//! the documents are sorted by `id` and written as one JSON array. A
//! `metadata.json` summary is written next to it.

use crate::error::ExportError;
use crate::parse::parse;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Summary written to `metadata.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub total_paths: usize,
    pub services: Vec<String>,
    pub categories: Vec<String>,
    pub last_updated: Option<String>,
}

impl Metadata {
    /// Sorted, de-duplicated services and categories across `documents`.
    pub fn from_documents(documents: &[Value]) -> Self {
        let mut services = BTreeSet::new();
        let mut categories = BTreeSet::new();
        for doc in documents {
            if let Some(list) = doc.get("services").and_then(Value::as_array) {
                services.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
            }
            if let Some(category) = doc.get("category").and_then(Value::as_str) {
                categories.insert(category.to_string());
            }
        }
        Metadata {
            total_paths: documents.len(),
            services: services.into_iter().collect(),
            categories: categories.into_iter().collect(),
            last_updated: None,
        }
    }
}

/// Result of an export run.
#[derive(Debug)]
pub struct ExportSummary {
    pub metadata: Metadata,
    pub output: PathBuf,
    pub metadata_path: PathBuf,
    /// Files that could not be read or parsed, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Convert every YAML document under `input_dir` into `output_file`.
pub fn export(input_dir: &Path, output_file: &Path) -> Result<ExportSummary, ExportError> {
    if !input_dir.is_dir() {
        return Err(ExportError::MissingInput(input_dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir).follow_links(false) {
        let entry = entry.map_err(|e| ExportError::Io(e.into()))?;
        let is_yaml = matches!(
            entry.path().extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if entry.file_type().is_file() && is_yaml {
            files.push(entry.into_path());
        }
    }
    files.sort();
    info!(count = files.len(), input = %input_dir.display(), "exporting documents");

    let mut documents = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();
    for file in files {
        let parsed = fs::read_to_string(&file)
            .map_err(|e| e.to_string())
            .and_then(|content| parse(&content).map_err(|e| e.to_string()));
        match parsed {
            Ok(doc) => documents.push(doc),
            Err(reason) => {
                warn!(path = %file.display(), error = %reason, "skipping document");
                skipped.push((file, reason));
            }
        }
    }

    // Sort by id; documents without one sort first, as empty strings.
    documents.sort_by(|a, b| id_of(a).cmp(id_of(b)));

    if let Some(parent) = output_file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_file, serde_json::to_string_pretty(&documents)?)?;

    let metadata = Metadata::from_documents(&documents);
    let metadata_path = output_file.with_file_name("metadata.json");
    fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;

    Ok(ExportSummary {
        metadata,
        output: output_file.to_path_buf(),
        metadata_path,
        skipped,
    })
}

fn id_of(doc: &Value) -> &str {
    doc.get("id").and_then(Value::as_str).unwrap_or("")
}
