//! The documentation generation pipeline.
//!
//! A run goes through six stages in a fixed order. The first failure aborts
//! the run and is returned as [`Error::Stage`], naming the stage that failed.
//! Nothing is retried. The output directory is deleted and recreated in the
//! first stage, so after a failed run it may be empty or hold a partial
//! document; treat any error as "no documentation was produced".

use crate::aggregate::aggregate_yaml;
use crate::config::Config;
use crate::constants;
use crate::error::{Error, Result};
use crate::merge::merge_documents;
use crate::scanner::{AnnotationScanner, DocCommentScanner};
use crate::security::{JsonPostProcessor, SecurityDefinitions};
use crate::serializer::{read_json_document, write_json_document, write_to_file, YamlWriter};
use crate::spec::Specification;
use log::{debug, info};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PrepareOutputDirectory,
    DefineConstants,
    Scan,
    PopulateServers,
    SaveJson,
    MakeYamlCopy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub json_file: PathBuf,
    /// Present when a YAML copy was written
    pub yaml_file: Option<PathBuf>,
    /// Constants newly defined by this run
    pub constants_defined: usize,
}

/// Generates documentation for one configuration.
pub struct Generator {
    config: Config,
    scanner: Box<dyn AnnotationScanner>,
    post_processor: Box<dyn JsonPostProcessor>,
}

impl Generator {
    pub fn new(
        config: Config,
        scanner: Box<dyn AnnotationScanner>,
        post_processor: Box<dyn JsonPostProcessor>,
    ) -> Self {
        Self {
            config,
            scanner,
            post_processor,
        }
    }

    /// A generator using the doc-comment scanner and the configured security
    /// definitions.
    pub fn from_config(config: Config) -> Self {
        let security = SecurityDefinitions::from_config(&config);
        Self::new(config, Box::new(DocCommentScanner::new()), Box::new(security))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every stage in order.
    pub fn generate_docs(&self) -> Result<GenerationReport> {
        info!(
            "Generating {} documentation into {}",
            self.config.swagger_version,
            self.config.docs_dir.display()
        );

        run_stage(Stage::PrepareOutputDirectory, || self.prepare_directory())?;
        let constants_defined = run_stage(Stage::DefineConstants, || Ok(self.define_constants()))?;
        let mut spec = run_stage(Stage::Scan, || self.scan_files())?;
        run_stage(Stage::PopulateServers, || {
            self.populate_servers(&mut spec);
            Ok(())
        })?;
        run_stage(Stage::SaveJson, || self.save_json(&spec))?;
        let yaml_file = run_stage(Stage::MakeYamlCopy, || self.make_yaml_copy())?;

        Ok(GenerationReport {
            json_file: self.config.docs_file(),
            yaml_file,
            constants_defined,
        })
    }

    /// Deletes and recreates the documentation directory.
    ///
    /// An existing read-only directory is left untouched and reported as a
    /// permission error.
    fn prepare_directory(&self) -> Result<()> {
        let dir = &self.config.docs_dir;

        if dir.exists() {
            // An unnamed scratch file proves write access without touching the contents
            if let Err(e) = tempfile::tempfile_in(dir) {
                return Err(match e.kind() {
                    io::ErrorKind::PermissionDenied => Error::Permission(dir.clone()),
                    _ => Error::io(dir, e),
                });
            }
            debug!("Removing existing documentation: {}", dir.display());
            fs::remove_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }

        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        Ok(())
    }

    fn define_constants(&self) -> usize {
        self.config
            .constants
            .iter()
            .filter(|(name, value)| constants::define(name, value))
            .count()
    }

    fn scan_files(&self) -> Result<Specification> {
        self.scanner.scan(
            &self.config.annotations,
            &self.config.excludes,
            &self.config.swagger_version,
        )
    }

    fn populate_servers(&self, spec: &mut Specification) {
        if let Some(base) = &self.config.base {
            spec.set_base(base);
        }
    }

    /// Writes the scanned document, merges the YAML annotations into it and
    /// applies the post-processor.
    fn save_json(&self, spec: &Specification) -> Result<()> {
        let path = self.config.docs_file();
        spec.save_as(&path)?;

        let scanned = read_json_document(&path)?;
        let annotations = aggregate_yaml(&self.config.yaml_annotations, &self.config.excludes)?;
        let merged = merge_documents(scanned, &annotations);
        write_json_document(&merged, &path)?;
        info!("Saved {}", path.display());

        self.post_processor.apply(&path)
    }

    fn make_yaml_copy(&self) -> Result<Option<PathBuf>> {
        if !self.config.generate_yaml_copy {
            debug!("YAML copy disabled");
            return Ok(None);
        }

        let document = read_json_document(&self.config.docs_file())?;
        let yaml = YamlWriter::default().render(&Value::Object(document));

        let path = self.config.yaml_docs_file();
        write_to_file(&yaml, &path)?;
        info!("Saved {}", path.display());
        Ok(Some(path))
    }
}

fn run_stage<T>(stage: Stage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    debug!("Stage {} starting", stage);
    f().map_err(|e| Error::Stage {
        stage,
        source: Box::new(e),
    })
}
