//! Security scheme injection.
//!
//! Runs on the merged JSON file after it has been written. Configured schemes
//! are added under `components.securitySchemes` for OpenAPI documents or
//! `securityDefinitions` for Swagger documents, and configured requirements
//! are appended to the top-level `security` list.

use crate::config::Config;
use crate::error::Result;
use crate::serializer::{read_json_document, write_json_document};
use crate::spec::{Document, SpecFlavor};
use log::{debug, info};
use serde_json::Value;
use std::path::Path;

/// A step that rewrites a generated JSON file in place.
pub trait JsonPostProcessor {
    fn apply(&self, path: &Path) -> Result<()>;
}

/// Injects configured security schemes and requirements.
#[derive(Debug, Clone)]
pub struct SecurityDefinitions {
    flavor: SpecFlavor,
    schemes: Document,
    requirements: Vec<Value>,
}

impl SecurityDefinitions {
    pub fn new(flavor: SpecFlavor, schemes: Document, requirements: Vec<Value>) -> Self {
        Self {
            flavor,
            schemes,
            requirements,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.swagger_version.flavor(),
            config.security_schemes.clone(),
            config.security_requirements.clone(),
        )
    }

    fn inject(&self, doc: &mut Document) {
        if !self.schemes.is_empty() {
            match self.flavor {
                SpecFlavor::OpenApi => {
                    let mut components = take_object(doc, "components");
                    let mut schemes = take_object(&mut components, "securitySchemes");
                    schemes.extend(self.schemes.clone());
                    components.insert("securitySchemes".to_string(), Value::Object(schemes));
                    doc.insert("components".to_string(), Value::Object(components));
                }
                SpecFlavor::Swagger => {
                    let mut definitions = take_object(doc, "securityDefinitions");
                    definitions.extend(self.schemes.clone());
                    doc.insert("securityDefinitions".to_string(), Value::Object(definitions));
                }
            }
        }

        if !self.requirements.is_empty() {
            let mut security = match doc.remove("security") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            security.extend(self.requirements.iter().cloned());
            doc.insert("security".to_string(), Value::Array(security));
        }
    }
}

impl JsonPostProcessor for SecurityDefinitions {
    fn apply(&self, path: &Path) -> Result<()> {
        if self.schemes.is_empty() && self.requirements.is_empty() {
            debug!("No security definitions configured");
            return Ok(());
        }

        let mut doc = read_json_document(path)?;
        self.inject(&mut doc);
        write_json_document(&doc, path)?;

        info!(
            "Added {} security schemes and {} requirements to {}",
            self.schemes.len(),
            self.requirements.len(),
            path.display()
        );
        Ok(())
    }
}

/// Removes `key` from `doc`, returning it if it was a mapping.
fn take_object(doc: &mut Document, key: &str) -> Document {
    match doc.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Document::new(),
    }
}
