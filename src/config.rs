//! Generator configuration.
//!
//! Configuration is read once per run from an optional YAML file, then
//! overridden by command-line flags, and resolved into an immutable [`Config`].
//!
//! ```yaml
//! paths:
//!   annotations: src
//!   docs: storage/api-docs
//!   docs_json: api-docs.json
//!   docs_yaml: api-docs.yaml
//!   excludes: [src/generated]
//!   base: https://api.example.com/v1
//!   yaml_annotations: [apps, docs/extra.yaml]
//! constants:
//!   API_HOST: api.example.com
//! generate_yaml_copy: true
//! swagger_version: "3.0"
//! security:
//!   bearer:
//!     type: http
//!     scheme: bearer
//! security_requirements:
//!   - bearer: []
//! ```

use crate::error::{Error, Result};
use crate::spec::SpecVersion;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ANNOTATIONS_DIR: &str = "src";
pub const DEFAULT_DOCS_DIR: &str = "storage/api-docs";
pub const DEFAULT_DOCS_JSON: &str = "api-docs.json";
pub const DEFAULT_DOCS_YAML: &str = "api-docs.yaml";
pub const DEFAULT_YAML_ANNOTATIONS_DIR: &str = "apps";
pub const DEFAULT_SWAGGER_VERSION: &str = "3.0.0";

/// One or many paths, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSpec(Vec<PathBuf>);

impl PathSpec {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self(vec![path.into()])
    }

    /// Decodes a configuration value: a string, a list of strings, or null.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for any other shape.
    pub fn from_value(value: &Value, name: &str) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::String(s) => Ok(Self::single(s)),
            Value::Sequence(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(PathBuf::from(s)),
                    other => Err(Error::InvalidInput(format!(
                        "unexpected {} entry: {}",
                        name,
                        describe(other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self),
            other => Err(Error::InvalidInput(format!(
                "unexpected {} value: {}",
                name,
                describe(other)
            ))),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// The configuration file as written, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub paths: RawPaths,
    pub constants: BTreeMap<String, Value>,
    pub generate_yaml_copy: bool,
    pub swagger_version: Option<String>,
    pub security: Map<String, JsonValue>,
    pub security_requirements: Vec<JsonValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPaths {
    pub annotations: Value,
    pub docs: Option<PathBuf>,
    pub docs_json: Option<String>,
    pub docs_yaml: Option<String>,
    pub excludes: Value,
    pub base: Option<String>,
    pub yaml_annotations: Value,
}

/// Resolved, immutable configuration for one generation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source roots handed to the annotation scanner
    pub annotations: PathSpec,
    /// Output directory; recreated on every run
    pub docs_dir: PathBuf,
    pub docs_json: String,
    pub docs_yaml: String,
    /// Paths excluded from both source scanning and YAML aggregation
    pub excludes: PathSpec,
    /// API root URL written as `servers` or `basePath`
    pub base: Option<String>,
    pub yaml_annotations: PathSpec,
    pub constants: BTreeMap<String, String>,
    pub generate_yaml_copy: bool,
    pub swagger_version: SpecVersion,
    pub security_schemes: Map<String, JsonValue>,
    pub security_requirements: Vec<JsonValue>,
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::SerializationError(message) => Error::ParseError {
                file: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parses configuration from YAML text. Empty text yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        Self::from_raw(raw)
    }

    /// Validates a raw configuration and fills in defaults.
    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        let annotations = match &raw.paths.annotations {
            Value::Null => PathSpec::single(DEFAULT_ANNOTATIONS_DIR),
            value => PathSpec::from_value(value, "paths.annotations")?,
        };
        let yaml_annotations = match &raw.paths.yaml_annotations {
            Value::Null => PathSpec::single(DEFAULT_YAML_ANNOTATIONS_DIR),
            value => PathSpec::from_value(value, "paths.yaml_annotations")?,
        };
        let excludes = PathSpec::from_value(&raw.paths.excludes, "paths.excludes")?;

        let constants = raw
            .constants
            .iter()
            .map(|(name, value)| Ok((name.clone(), constant_text(name, value)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        let version = raw
            .swagger_version
            .as_deref()
            .unwrap_or(DEFAULT_SWAGGER_VERSION);

        Ok(Self {
            annotations,
            docs_dir: raw
                .paths
                .docs
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_DIR)),
            docs_json: raw
                .paths
                .docs_json
                .unwrap_or_else(|| DEFAULT_DOCS_JSON.to_string()),
            docs_yaml: raw
                .paths
                .docs_yaml
                .unwrap_or_else(|| DEFAULT_DOCS_YAML.to_string()),
            excludes,
            base: raw.paths.base,
            yaml_annotations,
            constants,
            generate_yaml_copy: raw.generate_yaml_copy,
            swagger_version: SpecVersion::parse(version)?,
            security_schemes: raw.security,
            security_requirements: raw.security_requirements,
        })
    }

    /// Full path of the JSON document.
    pub fn docs_file(&self) -> PathBuf {
        self.docs_dir.join(&self.docs_json)
    }

    /// Full path of the YAML copy.
    pub fn yaml_docs_file(&self) -> PathBuf {
        self.docs_dir.join(&self.docs_yaml)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annotations: PathSpec::single(DEFAULT_ANNOTATIONS_DIR),
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            docs_json: DEFAULT_DOCS_JSON.to_string(),
            docs_yaml: DEFAULT_DOCS_YAML.to_string(),
            excludes: PathSpec::default(),
            base: None,
            yaml_annotations: PathSpec::single(DEFAULT_YAML_ANNOTATIONS_DIR),
            constants: BTreeMap::new(),
            generate_yaml_copy: false,
            swagger_version: SpecVersion::default(),
            security_schemes: Map::new(),
            security_requirements: Vec::new(),
        }
    }
}

/// Renders a scalar constant as the text substituted into annotations.
fn constant_text(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::InvalidInput(format!(
            "constant {} must be a scalar, got {}",
            name,
            describe(other)
        ))),
    }
}
