use crate::config::{Config, PathSpec};
use crate::generator::Generator;
use crate::spec::SpecVersion;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

/// OpenAPI documentation generator - builds JSON/YAML API docs from annotated sources
#[derive(Parser, Debug)]
#[command(name = "openapi-docgen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Annotated source file or directory; repeatable (overrides paths.annotations)
    #[arg(short = 'a', long = "annotations", value_name = "PATH")]
    pub annotations: Vec<PathBuf>,

    /// Path to exclude from scanning; repeatable (overrides paths.excludes)
    #[arg(short = 'e', long = "exclude", value_name = "PATH")]
    pub excludes: Vec<PathBuf>,

    /// YAML annotation file or directory; repeatable (overrides paths.yaml_annotations)
    #[arg(long = "yaml-annotations", value_name = "PATH")]
    pub yaml_annotations: Vec<PathBuf>,

    /// Output directory, recreated on every run
    #[arg(short = 'd', long = "docs-dir", value_name = "DIR")]
    pub docs_dir: Option<PathBuf>,

    /// API base URL, written as `servers` (OpenAPI 3) or `basePath` (Swagger 2)
    #[arg(short = 'b', long = "base", value_name = "URL")]
    pub base: Option<String>,

    /// Also write a YAML copy of the JSON document
    #[arg(long = "yaml-copy")]
    pub yaml_copy: bool,

    /// Target specification version (e.g. 3.0.0 or 2.0)
    #[arg(long = "swagger-version", value_name = "VERSION")]
    pub swagger_version: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(ref config_path) = args.config_path {
        if !config_path.is_file() {
            anyhow::bail!("Config file does not exist: {}", config_path.display());
        }
        info!("Config file: {}", config_path.display());
    } else {
        info!("Config file: none, using defaults");
    }

    Ok(args)
}

/// Resolves the configuration: file (or defaults), then command-line overrides.
pub fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = match &args.config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if !args.annotations.is_empty() {
        config.annotations = PathSpec::new(args.annotations.clone());
    }
    if !args.excludes.is_empty() {
        config.excludes = PathSpec::new(args.excludes.clone());
    }
    if !args.yaml_annotations.is_empty() {
        config.yaml_annotations = PathSpec::new(args.yaml_annotations.clone());
    }
    if let Some(ref docs_dir) = args.docs_dir {
        config.docs_dir = docs_dir.clone();
    }
    if let Some(ref base) = args.base {
        config.base = Some(base.clone());
    }
    if args.yaml_copy {
        config.generate_yaml_copy = true;
    }
    if let Some(ref version) = args.swagger_version {
        config.swagger_version = SpecVersion::parse(version)
            .with_context(|| format!("Invalid --swagger-version {}", version))?;
    }

    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;

    info!("Annotation sources: {:?}", config.annotations);
    info!("YAML annotation sources: {:?}", config.yaml_annotations);
    if !config.excludes.is_empty() {
        info!("Excluded: {:?}", config.excludes);
    }
    info!(
        "Specification version: {} ({:?})",
        config.swagger_version,
        config.swagger_version.flavor()
    );

    let report = Generator::from_config(config)
        .generate_docs()
        .context("Documentation generation failed; no valid documentation was produced")?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - JSON: {}", report.json_file.display());
    if let Some(ref yaml_file) = report.yaml_file {
        info!("  - YAML: {}", yaml_file.display());
    }
    info!("  - Constants defined: {}", report.constants_defined);

    Ok(())
}
