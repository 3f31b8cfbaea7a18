//! Serialization module for reading and writing specification documents.
//!
//! JSON output is pretty-printed with `serde_json`. YAML input is parsed with
//! `serde_yaml` and converted into JSON values so that YAML annotation files
//! and the scanned JSON document share one representation. YAML output is
//! rendered by [`YamlWriter`], which keeps block style for the outer levels
//! and switches to inline (flow) style below a configurable depth.

use crate::error::{Error, Result};
use crate::spec::Document;
use log::debug;
use serde_json::{Number, Value as JsonValue};
use serde_yaml::Value as YamlValue;
use std::fs;
use std::path::Path;

/// Indentation of the YAML copy.
pub const YAML_INDENT: usize = 2;

/// Nesting depth from which the YAML copy uses inline collections.
pub const YAML_INLINE_DEPTH: usize = 20;

/// Serializes a document to JSON with pretty printing.
pub fn serialize_json(doc: &Document) -> Result<String> {
    debug!("Serializing document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Writes string content to a file, creating parent directories as needed.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    fs::write(path, content).map_err(|e| Error::io(path, e))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Serializes `doc` and writes it to `path`.
pub fn write_json_document(doc: &Document, path: &Path) -> Result<()> {
    let content = serialize_json(doc)?;
    write_to_file(&content, path)
}

/// Reads a JSON document from `path`.
///
/// A file containing `null` reads as an empty document; any other
/// non-object top level value is a parse error.
pub fn read_json_document(path: &Path) -> Result<Document> {
    debug!("Reading JSON document: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let value: JsonValue = serde_json::from_str(&content).map_err(|e| Error::ParseError {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match value {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Document::new()),
        other => Err(Error::ParseError {
            file: path.to_path_buf(),
            message: format!("expected a mapping at the top level, found {}", kind(&other)),
        }),
    }
}

/// Parses YAML text read from `file` into a document.
///
/// An empty file yields an empty document.
pub fn parse_yaml_document(content: &str, file: &Path) -> Result<Document> {
    if content.trim().is_empty() {
        return Ok(Document::new());
    }

    let parse_error = |message: String| Error::ParseError {
        file: file.to_path_buf(),
        message,
    };

    let value: YamlValue = serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

    match yaml_to_json(value).map_err(parse_error)? {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Document::new()),
        other => Err(parse_error(format!(
            "expected a mapping at the top level, found {}",
            kind(&other)
        ))),
    }
}

/// Converts a YAML value into the equivalent JSON value.
///
/// Scalar mapping keys (numbers, booleans) are converted to their string form,
/// so `200:` under `responses` becomes `"200"`. Tags are dropped.
///
/// # Errors
///
/// Fails on non-finite floats and on mapping keys that are collections.
pub fn yaml_to_json(value: YamlValue) -> std::result::Result<JsonValue, String> {
    Ok(match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                JsonValue::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                JsonValue::Number(
                    Number::from_f64(f).ok_or_else(|| format!("unsupported number: {}", n))?,
                )
            }
        }
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Document::new();
            for (key, value) in mapping {
                let key = match key {
                    YamlValue::String(s) => s,
                    YamlValue::Number(n) => n.to_string(),
                    YamlValue::Bool(b) => b.to_string(),
                    YamlValue::Null => "null".to_string(),
                    other => return Err(format!("unsupported mapping key: {:?}", other)),
                };
                map.insert(key, yaml_to_json(value)?);
            }
            JsonValue::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "sequence",
        JsonValue::Object(_) => "mapping",
    }
}

/// Renders JSON values as YAML text.
///
/// Collections are written in block style down to `inline_depth` levels of
/// nesting; deeper collections, and empty ones, are written inline
/// (`[a, b]`, `{ key: value }`). Strings that would not read back as the same
/// string are double-quoted.
#[derive(Debug, Clone, Copy)]
pub struct YamlWriter {
    indent: usize,
    inline_depth: usize,
}

impl Default for YamlWriter {
    fn default() -> Self {
        Self::new(YAML_INDENT, YAML_INLINE_DEPTH)
    }
}

impl YamlWriter {
    pub fn new(indent: usize, inline_depth: usize) -> Self {
        Self {
            indent,
            inline_depth,
        }
    }

    pub fn render(&self, value: &JsonValue) -> String {
        let mut out = String::new();
        if self.inline_depth == 0 || !is_nonempty_collection(value) {
            out.push_str(&inline(value, false));
            out.push('\n');
        } else {
            self.block(value, self.inline_depth, 0, &mut out);
        }
        out
    }

    fn block(&self, value: &JsonValue, depth: usize, indent: usize, out: &mut String) {
        let entries: Vec<(String, &JsonValue)> = match value {
            JsonValue::Object(map) => map
                .iter()
                .map(|(k, v)| (format!("{}:", scalar(k, false)), v))
                .collect(),
            JsonValue::Array(items) => items.iter().map(|v| ("-".to_string(), v)).collect(),
            _ => return,
        };

        for (lead, child) in entries {
            out.push_str(&" ".repeat(indent));
            out.push_str(&lead);
            if depth <= 1 || !is_nonempty_collection(child) {
                out.push(' ');
                out.push_str(&inline(child, false));
                out.push('\n');
            } else {
                out.push('\n');
                self.block(child, depth - 1, indent + self.indent, out);
            }
        }
    }
}

fn is_nonempty_collection(value: &JsonValue) -> bool {
    match value {
        JsonValue::Object(map) => !map.is_empty(),
        JsonValue::Array(items) => !items.is_empty(),
        _ => false,
    }
}

/// Renders a value on one line. Strings directly in block context use the
/// block rules; anything nested in a flow collection uses the flow rules.
fn inline(value: &JsonValue, flow: bool) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => scalar(s, flow),
        JsonValue::Array(items) => {
            let parts: Vec<String> = items.iter().map(|v| inline(v, true)).collect();
            format!("[{}]", parts.join(", "))
        }
        JsonValue::Object(map) if map.is_empty() => "{}".to_string(),
        JsonValue::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", scalar(k, true), inline(v, true)))
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
    }
}

/// Writes a string plain when that is unambiguous, double-quoted otherwise.
fn scalar(s: &str, flow: bool) -> String {
    if is_plain_safe(s) && !(flow && s.contains([':', '#'])) {
        s.to_string()
    } else {
        JsonValue::String(s.to_string()).to_string()
    }
}

fn is_plain_safe(s: &str) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
        '`',
    ];
    const YAML11_WORDS: &[&str] = &["y", "n", "yes", "no", "on", "off"];

    let Some(first) = s.chars().next() else {
        return false;
    };
    if INDICATORS.contains(&first) || s.starts_with(' ') || s.ends_with(' ') || s.ends_with(':') {
        return false;
    }
    if s.chars()
        .any(|c| c.is_control() || matches!(c, ',' | '[' | ']' | '{' | '}'))
    {
        return false;
    }
    if s.contains(": ") || s.contains(" #") {
        return false;
    }
    if YAML11_WORDS.contains(&s.to_ascii_lowercase().as_str()) {
        return false;
    }
    matches!(
        serde_yaml::from_str::<YamlValue>(s),
        Ok(YamlValue::String(ref parsed)) if parsed == s
    )
}
