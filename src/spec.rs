//! Specification handle and version gating.
//!
//! OpenAPI 3.x and legacy Swagger 2.0 documents describe the API root URL in
//! different ways. The flavor is picked once from the configured version
//! string and every version-dependent mutation goes through [`Specification`],
//! so the rest of the pipeline never inspects the document to decide.

use crate::error::{Error, Result};
use crate::serializer::write_json_document;
use log::debug;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// A generated document: a mapping from string keys to JSON values.
pub type Document = Map<String, Value>;

/// First version that uses the OpenAPI 3 document shape.
const OPENAPI_THRESHOLD: [u64; 2] = [3, 0];

/// Document shape selected from the configured version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFlavor {
    /// OpenAPI 3.0 and later: `servers` list, `components.securitySchemes`
    OpenApi,
    /// Swagger 2.0: `basePath` string, `securityDefinitions`
    Swagger,
}

/// A parsed specification version such as `3.0`, `3.1.0` or `2.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecVersion {
    text: String,
    components: Vec<u64>,
}

impl SpecVersion {
    /// Parses a dotted version string.
    ///
    /// Each dot-separated part contributes its leading digits; parsing stops at
    /// the first part without any (so `3.0.0-rc1` reads as `3.0.0`).
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the string does not start with a number.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let mut components = Vec::new();

        for part in trimmed.split('.') {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                break;
            }
            let value = digits
                .parse::<u64>()
                .map_err(|e| Error::InvalidInput(format!("version '{}': {}", text, e)))?;
            components.push(value);
            if digits.len() != part.len() {
                break;
            }
        }

        if components.is_empty() {
            return Err(Error::InvalidInput(format!(
                "unrecognised specification version '{}'",
                text
            )));
        }

        Ok(Self {
            text: trimmed.to_string(),
            components,
        })
    }

    /// The version string as configured.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `OpenApi` for versions `>= 3.0`, `Swagger` below.
    pub fn flavor(&self) -> SpecFlavor {
        if compare_components(&self.components, &OPENAPI_THRESHOLD) != Ordering::Less {
            SpecFlavor::OpenApi
        } else {
            SpecFlavor::Swagger
        }
    }

    /// Three-part rendering used for the `openapi` field (`3.0` -> `3.0.0`).
    pub fn normalized(&self) -> String {
        let mut parts = self.components.clone();
        while parts.len() < 3 {
            parts.push(0);
        }
        parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Root document a scan starts from.
    pub fn seed_document(&self) -> Document {
        let mut doc = Document::new();
        match self.flavor() {
            SpecFlavor::OpenApi => {
                doc.insert("openapi".to_string(), Value::String(self.normalized()));
            }
            SpecFlavor::Swagger => {
                doc.insert("swagger".to_string(), Value::String("2.0".to_string()));
            }
        }
        doc
    }
}

impl Default for SpecVersion {
    fn default() -> Self {
        Self {
            text: "3.0.0".to_string(),
            components: vec![3, 0, 0],
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compares version components, treating missing trailing parts as zero.
fn compare_components(left: &[u64], right: &[u64]) -> Ordering {
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// The scanned specification, mutated by the pipeline before it is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    flavor: SpecFlavor,
    document: Document,
}

impl Specification {
    pub fn new(flavor: SpecFlavor, document: Document) -> Self {
        Self { flavor, document }
    }

    pub fn flavor(&self) -> SpecFlavor {
        self.flavor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Sets the API root URL in the shape the flavor expects.
    ///
    /// OpenAPI documents get a single-entry `servers` list, replacing any
    /// servers found by the scan. Swagger documents get `basePath`.
    pub fn set_base(&mut self, base: &str) {
        match self.flavor {
            SpecFlavor::OpenApi => {
                debug!("Setting servers to [{}]", base);
                self.document
                    .insert("servers".to_string(), json!([{ "url": base }]));
            }
            SpecFlavor::Swagger => {
                debug!("Setting basePath to {}", base);
                self.document
                    .insert("basePath".to_string(), Value::String(base.to_string()));
            }
        }
    }

    /// Writes the document as pretty-printed JSON.
    pub fn save_as(&self, path: &Path) -> Result<()> {
        write_json_document(&self.document, path)
    }
}
