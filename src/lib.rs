//! OpenAPI documentation generator.
//!
//! Produces an OpenAPI 3.x or Swagger 2.0 document from annotated source code,
//! merges supplementary YAML annotation files into it, and writes the result as
//! JSON and, optionally, YAML.
//!
//! # Architecture
//!
//! 1. [`collector`] - Finds files under one or more roots, honouring exclusions
//! 2. [`merge`] - One-level array-merge of two documents
//! 3. [`scanner`] - Extracts annotations from sources into a [`spec::Specification`]
//! 4. [`aggregate`] - Parses and merges all YAML annotation files
//! 5. [`security`] - Injects configured security schemes into the JSON file
//! 6. [`serializer`] - JSON/YAML reading and writing
//! 7. [`generator`] - The ordered generation pipeline
//!
//! Supporting modules: [`config`] for configuration, [`constants`] for the
//! process-wide constant table, [`spec`] for version gating, and [`error`].
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_docgen::config::Config;
//! use openapi_docgen::generator::Generator;
//! use std::path::Path;
//!
//! let config = Config::from_file(Path::new("docgen.yaml")).unwrap();
//! let report = Generator::from_config(config).generate_docs().unwrap();
//! println!("Wrote {}", report.json_file.display());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod aggregate;
pub mod cli;
pub mod collector;
pub mod config;
pub mod constants;
pub mod error;
pub mod generator;
pub mod merge;
pub mod scanner;
pub mod security;
pub mod serializer;
pub mod spec;

pub use error::{Error, Result};
pub use spec::Document;
