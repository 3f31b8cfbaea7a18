//! OpenAPI documentation generator - command-line entry point.
//!
//! Scans annotated sources, merges YAML annotation files, and writes the
//! resulting OpenAPI/Swagger document as JSON (and optionally YAML).
//!
//! # Usage
//!
//! ```bash
//! openapi-docgen [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Generate with a configuration file:
//! ```bash
//! openapi-docgen --config docgen.yaml
//! ```
//!
//! Scan `src`, merge `apps/**/*.yaml`, and write a YAML copy too:
//! ```bash
//! openapi-docgen -a src --yaml-annotations apps --yaml-copy -d storage/api-docs
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-docgen -c docgen.yaml -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_docgen::cli;

fn main() -> Result<()> {
    // Parse once so the verbose flag is known before the logger exists
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI documentation generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
