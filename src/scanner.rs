//! Annotation scanning.
//!
//! [`AnnotationScanner`] is the seam between the generation pipeline and
//! whatever extracts API metadata from source code. [`DocCommentScanner`] is
//! the built-in implementation for Rust sources: it parses each file with
//! `syn` and reads doc comments carrying an `@openapi` marker line. Everything
//! after the marker, up to the next marker or the end of the comment, is a
//! YAML fragment of the document:
//!
//! ```text
//! /// Lists users.
//! ///
//! /// @openapi
//! /// paths:
//! ///   /users:
//! ///     get:
//! ///       summary: List users
//! ///       responses:
//! ///         200:
//! ///           description: OK
//! async fn list_users() {}
//! ```
//!
//! Fragments are folded into the document structurally: mappings are merged
//! recursively and lists are appended, so each handler can contribute its own
//! operations under a shared `paths` key. `${NAME}` references are replaced
//! with values from the [`constants`](crate::constants) table before parsing.

use crate::collector::FileCollector;
use crate::config::PathSpec;
use crate::constants;
use crate::error::{Error, Result};
use crate::serializer::parse_yaml_document;
use crate::spec::{Document, SpecVersion, Specification};
use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;
use syn::visit::Visit;
use syn::{Attribute, Expr, Lit, Meta};

/// Marker line that opens an annotation block inside a doc comment.
pub const ANNOTATION_MARKER: &str = "@openapi";

/// Extracts a specification from annotated sources.
pub trait AnnotationScanner {
    /// Scans `sources` (files or directories), skipping `excludes`, and
    /// returns a specification in the shape selected by `version`.
    fn scan(
        &self,
        sources: &PathSpec,
        excludes: &PathSpec,
        version: &SpecVersion,
    ) -> Result<Specification>;
}

/// Reads `@openapi` blocks from doc comments in Rust source files.
#[derive(Debug, Clone, Default)]
pub struct DocCommentScanner;

impl DocCommentScanner {
    pub fn new() -> Self {
        Self
    }

    /// Parses one source file and returns its annotation fragments in source
    /// order. Files that are not valid Rust yield `None`.
    pub fn scan_file(&self, path: &Path) -> Result<Option<Vec<Document>>> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let syntax_tree = match syn::parse_file(&content) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Skipping {}: failed to parse Rust syntax: {}", path.display(), e);
                return Ok(None);
            }
        };

        let mut visitor = DocCommentVisitor::default();
        visitor.visit_file(&syntax_tree);

        let mut fragments = Vec::new();
        for block in &visitor.blocks {
            for fragment in extract_fragments(&block.text) {
                let text = constants::substitute(&fragment);
                let document = parse_yaml_document(&text, path).map_err(|e| match e {
                    Error::ParseError { file, message } => Error::ParseError {
                        file,
                        message: format!("annotation on {}: {}", block.owner, message),
                    },
                    other => other,
                })?;
                fragments.push(document);
            }
        }

        debug!("Found {} annotation blocks in {}", fragments.len(), path.display());
        Ok(Some(fragments))
    }
}

impl AnnotationScanner for DocCommentScanner {
    fn scan(
        &self,
        sources: &PathSpec,
        excludes: &PathSpec,
        version: &SpecVersion,
    ) -> Result<Specification> {
        let files = FileCollector::new("rs")
            .skip_dir("target")
            .collect(sources, excludes)?;
        info!("Found {} Rust files", files.len());

        let mut document = version.seed_document();
        let mut annotation_count = 0;
        let mut skipped = 0;

        for file in &files {
            match self.scan_file(file)? {
                Some(fragments) => {
                    annotation_count += fragments.len();
                    for fragment in fragments {
                        absorb(&mut document, fragment);
                    }
                }
                None => skipped += 1,
            }
        }

        info!(
            "Collected {} annotation blocks from {} files ({} skipped)",
            annotation_count,
            files.len() - skipped,
            skipped
        );
        if annotation_count == 0 {
            warn!("No {} annotations found", ANNOTATION_MARKER);
        }
        if !document.contains_key("info") {
            warn!("Required info section not found in annotations");
        }

        Ok(Specification::new(version.flavor(), document))
    }
}

/// Folds an annotation fragment into the document being built.
fn absorb(target: &mut Document, fragment: Document) {
    for (key, incoming) in fragment {
        let value = match (target.remove(&key), incoming) {
            (Some(Value::Object(mut existing)), Value::Object(more)) => {
                absorb(&mut existing, more);
                Value::Object(existing)
            }
            (Some(Value::Array(mut existing)), Value::Array(more)) => {
                existing.extend(more);
                Value::Array(existing)
            }
            (_, replacement) => replacement,
        };
        target.insert(key, value);
    }
}

/// Splits a doc comment into the YAML fragments that follow marker lines.
fn extract_fragments(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        if line.trim() == ANNOTATION_MARKER {
            if let Some(lines) = current.take() {
                fragments.push(dedent(&lines));
            }
            current = Some(Vec::new());
        } else if let Some(lines) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some(lines) = current {
        fragments.push(dedent(&lines));
    }

    fragments
}

/// Removes the indentation shared by all non-blank lines.
fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| if l.trim().is_empty() { "" } else { &l[indent..] })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A doc comment and the item it documents.
struct DocBlock {
    owner: String,
    text: String,
}

/// Visitor for traversing the AST and collecting annotated doc comments
#[derive(Default)]
struct DocCommentVisitor {
    blocks: Vec<DocBlock>,
}

impl DocCommentVisitor {
    fn record(&mut self, owner: String, attrs: &[Attribute]) {
        let lines: Vec<String> = attrs.iter().filter_map(doc_line).collect();
        if lines.is_empty() {
            return;
        }

        let text = lines.join("\n");
        if text.lines().any(|l| l.trim() == ANNOTATION_MARKER) {
            debug!("Annotation found on {}", owner);
            self.blocks.push(DocBlock { owner, text });
        }
    }
}

/// Returns the text of a `#[doc = "..."]` attribute.
fn doc_line(attr: &Attribute) -> Option<String> {
    if !attr.path().is_ident("doc") {
        return None;
    }
    match &attr.meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(s) => Some(s.value()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

impl<'ast> Visit<'ast> for DocCommentVisitor {
    fn visit_file(&mut self, node: &'ast syn::File) {
        self.record("module docs".to_string(), &node.attrs);
        syn::visit::visit_file(self, node);
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.record(format!("fn {}", node.sig.ident), &node.attrs);
        syn::visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.record(format!("fn {}", node.sig.ident), &node.attrs);
        syn::visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        self.record(format!("fn {}", node.sig.ident), &node.attrs);
        syn::visit::visit_trait_item_fn(self, node);
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.record(format!("struct {}", node.ident), &node.attrs);
        syn::visit::visit_item_struct(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.record(format!("enum {}", node.ident), &node.attrs);
        syn::visit::visit_item_enum(self, node);
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.record(format!("mod {}", node.ident), &node.attrs);
        syn::visit::visit_item_mod(self, node);
    }

    fn visit_item_const(&mut self, node: &'ast syn::ItemConst) {
        self.record(format!("const {}", node.ident), &node.attrs);
        syn::visit::visit_item_const(self, node);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        self.record(format!("trait {}", node.ident), &node.attrs);
        syn::visit::visit_item_trait(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        self.record("impl block".to_string(), &node.attrs);
        syn::visit::visit_item_impl(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn openapi() -> SpecVersion {
        SpecVersion::parse("3.0").unwrap()
    }

    #[test]
    fn test_extract_fragments_dedents_and_splits() {
        let text = " Lists users.\n\n @openapi\n paths:\n   /users:\n     get: {}\n @openapi\n tags:\n   - name: users";

        let fragments = extract_fragments(text);

        assert_eq!(
            fragments,
            vec![
                "paths:\n  /users:\n    get: {}".to_string(),
                "tags:\n  - name: users".to_string()
            ]
        );
    }

    #[test]
    fn test_extract_fragments_without_marker() {
        assert!(extract_fragments(" Plain documentation.").is_empty());
    }

    #[test]
    fn test_absorb_is_structural() {
        let mut target = match json!({ "paths": { "/users": { "get": {} } }, "tags": ["a"] }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let fragment = match json!({ "paths": { "/users": { "post": {} } }, "tags": ["b"] }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        absorb(&mut target, fragment);

        assert_eq!(
            Value::Object(target),
            json!({ "paths": { "/users": { "get": {}, "post": {} } }, "tags": ["a", "b"] })
        );
    }

    #[test]
    fn test_scan_file_collects_nested_items() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
//! @openapi
//! info:
//!   title: Test API
//!   version: 1.0.0

pub struct Api;

impl Api {
    /// @openapi
    /// paths:
    ///   /users:
    ///     get:
    ///       summary: List users
    pub async fn list_users() {}
}

mod nested {
    /// Not an annotation.
    fn helper() {}
}
"#;
        let path = create_temp_file(&temp_dir, "api.rs", code);

        let fragments = DocCommentScanner::new().scan_file(&path).unwrap().unwrap();

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].get("info"), Some(&json!({ "title": "Test API", "version": "1.0.0" })));
        assert_eq!(
            fragments[1].get("paths"),
            Some(&json!({ "/users": { "get": { "summary": "List users" } } }))
        );
    }

    #[test]
    fn test_scan_file_skips_invalid_rust() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(&temp_dir, "broken.rs", "fn broken( {");

        let result = DocCommentScanner::new().scan_file(&path).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_scan_file_reports_bad_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let code = "/// @openapi\n/// paths: [unclosed\nfn handler() {}\n";
        let path = create_temp_file(&temp_dir, "bad.rs", code);

        let err = DocCommentScanner::new().scan_file(&path).unwrap_err();

        match err {
            Error::ParseError { file, message } => {
                assert_eq!(file, path);
                assert!(message.contains("fn handler"));
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_substitutes_constants() {
        constants::define("SCANNER_TEST_HOST", "api.example.com");
        let temp_dir = TempDir::new().unwrap();
        let code = "/// @openapi\n/// x-host: ${SCANNER_TEST_HOST}\nfn handler() {}\n";
        let path = create_temp_file(&temp_dir, "host.rs", code);

        let fragments = DocCommentScanner::new().scan_file(&path).unwrap().unwrap();

        assert_eq!(fragments[0].get("x-host"), Some(&json!("api.example.com")));
    }

    #[test]
    fn test_scan_merges_files_and_seeds_version() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_file(
            &temp_dir,
            "src/users.rs",
            "/// @openapi\n/// paths:\n///   /users:\n///     get: {}\nfn list() {}\n",
        );
        create_temp_file(
            &temp_dir,
            "src/orders.rs",
            "/// @openapi\n/// paths:\n///   /orders:\n///     get: {}\nfn list() {}\n",
        );
        create_temp_file(
            &temp_dir,
            "target/generated.rs",
            "/// @openapi\n/// paths:\n///   /generated:\n///     get: {}\nfn generated() {}\n",
        );

        let spec = DocCommentScanner::new()
            .scan(&PathSpec::single(temp_dir.path()), &PathSpec::default(), &openapi())
            .unwrap();

        assert_eq!(
            Value::Object(spec.into_document()),
            json!({
                "openapi": "3.0.0",
                "paths": { "/orders": { "get": {} }, "/users": { "get": {} } }
            })
        );
    }

    #[test]
    fn test_scan_respects_excludes() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_file(&temp_dir, "keep.rs", "/// @openapi\n/// x-keep: true\nfn a() {}\n");
        create_temp_file(&temp_dir, "legacy/drop.rs", "/// @openapi\n/// x-drop: true\nfn b() {}\n");

        let spec = DocCommentScanner::new()
            .scan(&PathSpec::single(temp_dir.path()), &PathSpec::single("legacy"), &openapi())
            .unwrap();

        assert_eq!(spec.document().get("x-keep"), Some(&json!(true)));
        assert!(spec.document().get("x-drop").is_none());
    }

    #[test]
    fn test_scan_swagger_flavor() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_file(&temp_dir, "lib.rs", "pub fn nothing() {}\n");

        let spec = DocCommentScanner::new()
            .scan(
                &PathSpec::single(temp_dir.path()),
                &PathSpec::default(),
                &SpecVersion::parse("2.0").unwrap(),
            )
            .unwrap();

        assert_eq!(spec.flavor(), crate::spec::SpecFlavor::Swagger);
        assert_eq!(Value::Object(spec.into_document()), json!({ "swagger": "2.0" }));
    }
}
