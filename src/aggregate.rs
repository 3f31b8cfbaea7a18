//! YAML annotation aggregation.
//!
//! Every `*.yaml` file found under the configured roots is parsed and folded,
//! in path order, into one document with [`merge_documents`]. Later files win
//! for scalar keys and append to list keys.

use crate::collector::FileCollector;
use crate::config::PathSpec;
use crate::error::{Error, Result};
use crate::merge::merge_documents;
use crate::serializer::parse_yaml_document;
use crate::spec::Document;
use log::{debug, info};
use std::fs;

/// Extension of YAML annotation files.
pub const YAML_EXTENSION: &str = "yaml";

/// Collects, parses and merges all YAML annotation files under `roots`.
///
/// # Errors
///
/// The first file that cannot be read or parsed aborts the aggregation; no
/// partial result is returned.
pub fn aggregate_yaml(roots: &PathSpec, excludes: &PathSpec) -> Result<Document> {
    let files = FileCollector::new(YAML_EXTENSION).collect(roots, excludes)?;
    info!("Found {} YAML annotation files", files.len());

    let mut aggregated = Document::new();
    for file in &files {
        debug!("Loading YAML annotations: {}", file.display());
        let content = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
        let data = parse_yaml_document(&content, file)?;
        aggregated = merge_documents(aggregated, &data);
    }

    Ok(aggregated)
}
