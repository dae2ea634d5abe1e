//! Analyze command implementation.

use anyhow::{Context, Result};
use archbase_patterns::PatternAnalyzer;
use std::path::Path;

use crate::config_resolver;
use crate::OutputFormat;

/// Runs the analyze command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config_resolver::load(path, config_path)?;
    let analyzer = PatternAnalyzer::new(path).config(&config);

    tracing::info!("Analyzing patterns in {}", analyzer.root().display());
    let result = analyzer.analyze_project().context("Analysis failed")?;

    super::output::print_analysis(&result, format)?;

    if let Some(output) = output {
        super::output::write_report(output, &result)?;
    }

    if !result.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
