//! Scan command implementation.

use anyhow::{Context, Result};
use archbase_core::{FileError, ProjectScanResult, ProjectScanner};
use std::path::{Path, PathBuf};

use crate::config_resolver;
use crate::OutputFormat;

/// Scan command options.
pub struct ScanArgs {
    /// Include patterns.
    pub include: Vec<String>,
    /// Exclude patterns.
    pub exclude: Vec<String>,
    /// Top-level directory only.
    pub shallow: bool,
    /// Output format.
    pub format: OutputFormat,
    /// JSON report path.
    pub report: Option<PathBuf>,
    /// Render syntax errors with source context.
    pub verbose: bool,
}

/// Runs the scan command.
pub fn run(path: &Path, args: ScanArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config_resolver::load(path, config_path)?;

    let mut builder = ProjectScanner::builder().root(path).config(&config);
    if !args.include.is_empty() {
        builder = builder.includes(args.include);
    }
    if !args.exclude.is_empty() {
        builder = builder.excludes(args.exclude);
    }
    if args.shallow {
        builder = builder.deep(false);
    }
    let scanner = builder.build().context("Failed to build scanner")?;

    tracing::info!("Scanning {}", scanner.root().display());
    let result = scanner.scan();

    if args.verbose {
        print_diagnostics(&scanner, &result);
    }

    super::output::print_scan(&result, args.format)?;

    if let Some(report) = &args.report {
        super::output::write_report(report, &result)?;
    }

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Re-parses failed files to render their syntax errors with source context.
fn print_diagnostics(scanner: &ProjectScanner, result: &ProjectScanResult) {
    for failure in result.failures.iter().filter(|f| f.line.is_some()) {
        if let Err(FileError::Syntax(err)) = scanner.analyze_file(&failure.file) {
            eprintln!("{:?}", miette::Report::new(*err));
        }
    }
}
