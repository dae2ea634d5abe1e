//! Shared output formatting.

use anyhow::{Context, Result};
use archbase_core::aggregate::report_recommendations;
use archbase_core::{IssueKind, ProjectScanResult};
use archbase_migrate::{BatchSummary, MigrationAnalysis};
use archbase_patterns::ProjectAnalysisResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::OutputFormat;

/// A JSON document stamped with its generation time.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a, T: Serialize> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    body: &'a T,
}

fn to_json<T: Serialize>(body: &T) -> Result<String> {
    let report = Report {
        generated_at: Utc::now(),
        body,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Writes `body` as a JSON report.
pub fn write_report<T: Serialize>(path: &Path, body: &T) -> Result<()> {
    std::fs::write(path, to_json(body)?)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

/// Print scan results in the specified format.
pub fn print_scan(result: &ProjectScanResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_scan_text(result),
        OutputFormat::Json => println!("{}", to_json(result)?),
        OutputFormat::Compact => print_scan_compact(result),
    }
    Ok(())
}

fn kind_indicator(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::Error => "\x1b[31merror\x1b[0m",
        IssueKind::Warning => "\x1b[33mwarning\x1b[0m",
        IssueKind::Suggestion => "\x1b[34msuggestion\x1b[0m",
    }
}

fn print_scan_text(result: &ProjectScanResult) {
    for component in &result.components {
        for issue in &component.issues {
            println!(
                "{} at {}:{}:{}",
                component.name,
                component.file.display(),
                issue.line.unwrap_or(component.line),
                issue.column.unwrap_or(component.column),
            );
            println!("  {}: {}", kind_indicator(issue.kind), issue.message);
            if let Some(fix) = &issue.fix {
                println!("  = help: {fix}");
            }
            println!();
        }
    }

    for failure in &result.failures {
        println!("\x1b[31mfailed\x1b[0m {}: {}", failure.file.display(), failure.message);
    }

    let stats = &result.statistics;
    println!(
        "Components: {} ({} Archbase), DataSource V1: {}, V2: {}",
        stats.total_components, stats.archbase_components, stats.v1_components, stats.v2_components
    );
    if !result.patterns.detected.is_empty() {
        let detected: Vec<_> = result.patterns.detected.iter().map(String::as_str).collect();
        println!("Patterns: {}", detected.join(", "));
    }
    println!(
        "Migration: {} candidate(s), estimated effort {}",
        result.migration.v1_to_v2_candidates.len(),
        result.migration.estimated_effort
    );
    if let Some(version) = &result.dependencies.archbase_version {
        println!("@archbase/react: {version}");
    }
    for dependency in &result.dependencies.missing_dependencies {
        println!("Missing dependency: {dependency}");
    }

    let recommendations = report_recommendations(result);
    if !recommendations.is_empty() {
        println!("\nRecommendations:");
        for r in &recommendations {
            println!("  - {r}");
        }
    }

    let summary_color = if result.has_errors() {
        "\x1b[31m"
    } else if stats.issues_found > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    println!(
        "\n{}Found {} issue(s) in {} file(s), {} file(s) failed\x1b[0m",
        summary_color, stats.issues_found, stats.files_scanned, stats.files_failed
    );
}

fn print_scan_compact(result: &ProjectScanResult) {
    for component in &result.components {
        for issue in &component.issues {
            println!(
                "{}:{}:{}: {} [{}] {}",
                component.file.display(),
                issue.line.unwrap_or(component.line),
                issue.column.unwrap_or(component.column),
                issue.kind,
                component.name,
                issue.message,
            );
        }
    }
    for failure in &result.failures {
        println!(
            "{}:{}:{}: failed {}",
            failure.file.display(),
            failure.line.unwrap_or(1),
            failure.column.unwrap_or(0),
            failure.message,
        );
    }
}

/// Print pattern analysis results in the specified format.
pub fn print_analysis(result: &ProjectAnalysisResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(result)?),
        OutputFormat::Compact => {
            for pattern in &result.patterns {
                println!("{} [{}] x{}", pattern.name, pattern.priority, pattern.frequency);
            }
            for r in &result.recommendations {
                println!("{} [{}] {}", r.id, r.priority, r.title);
            }
        }
        OutputFormat::Text => print_analysis_text(result),
    }
    Ok(())
}

fn print_analysis_text(result: &ProjectAnalysisResult) {
    println!("Analyzed {} file(s), {} failed", result.files_analyzed, result.failures.len());

    if !result.patterns.is_empty() {
        println!("\nPatterns:");
        for pattern in &result.patterns {
            println!(
                "  {:<40} {:<8} x{:<4} {}",
                pattern.name,
                pattern.priority.to_string(),
                pattern.frequency,
                pattern.description
            );
        }
    }

    if !result.data_source_usage.is_empty() {
        println!("\nDataSource usage:");
        for usage in &result.data_source_usage {
            println!("  {:<28} {:<8} x{}", usage.component, usage.version.to_string(), usage.usage_count);
        }
    }

    if !result.form_patterns.is_empty() {
        println!("\nForms:");
        for form in &result.form_patterns {
            println!(
                "  {} / {} / {} x{}",
                form.validation_library, form.layout, form.complexity, form.frequency
            );
        }
    }

    if !result.recommendations.is_empty() {
        println!("\nRecommendations:");
        for r in &result.recommendations {
            println!("  [{}] {}: {}", r.priority, r.title, r.description);
        }
    }
}

/// Print a migration analysis.
pub fn print_migration_analysis(analysis: &MigrationAnalysis) {
    println!(
        "{} of {} file(s) need migration, {} issue(s), estimated effort {}",
        analysis.migrable_files,
        analysis.total_files,
        analysis.issues.len(),
        analysis.estimated_effort
    );
    for issue in &analysis.issues {
        println!(
            "  {}: {} [{}] {} ({})",
            issue.file.display(),
            issue.component,
            issue.rule,
            issue.description,
            issue.complexity
        );
    }
}

/// Print a multi-file migration summary.
pub fn print_batch(summary: &BatchSummary) {
    for file in &summary.files {
        let marker = if file.written { "migrated" } else { "pending" };
        println!("{} ({} change(s), {marker})", file.file.display(), file.changes.len());
        for change in &file.changes {
            match change.line {
                Some(line) => println!("  {line}: {}", change.description),
                None => println!("  {}", change.description),
            }
        }
        for warning in &file.warnings {
            println!("  \x1b[33mwarning\x1b[0m: {warning}");
        }
    }
    for error in &summary.errors {
        println!("\x1b[31merror\x1b[0m: {error}");
    }

    let mode = if summary.dry_run { " (dry run)" } else { "" };
    println!(
        "\n{} of {} file(s) changed, {} change(s){mode}",
        summary.files_migrated, summary.files_processed, summary.total_changes
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Body {
        files: usize,
    }

    #[test]
    fn reports_carry_generation_time() {
        let json = to_json(&Body { files: 3 }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"], 3);
        assert!(value["generatedAt"].is_string());
    }

    #[test]
    fn write_report_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        write_report(&path, &Body { files: 1 }).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["files"], 1);
    }
}
