//! Migrate command implementations.

use anyhow::{Context, Result};
use archbase_core::Config;
use archbase_migrate::{BatchSummary, MigrationEngine, MigrationOptions};
use std::path::{Path, PathBuf};

use crate::config_resolver;

/// `migrate v1-to-v2` options.
pub struct V1ToV2Args {
    /// Component filter.
    pub component: Option<String>,
    /// Skip writing.
    pub dry_run: bool,
    /// Skip `.backup` files.
    pub no_backup: bool,
    /// Include patterns.
    pub include: Vec<String>,
    /// Exclude patterns.
    pub exclude: Vec<String>,
}

/// `migrate batch` options.
pub struct BatchArgs {
    /// Comma-separated rule ids.
    pub rules: Option<String>,
    /// Skip complex usages.
    pub exclude_complex: bool,
    /// Skip writing.
    pub dry_run: bool,
    /// JSON report path.
    pub report: Option<PathBuf>,
}

fn setup(path: &Path, config_path: Option<&Path>) -> Result<(Config, MigrationEngine)> {
    let config = config_resolver::load(path, config_path)?;
    let engine = MigrationEngine::from_config(&config);
    tracing::debug!("Loaded {} migration rules", engine.rules().len());
    Ok((config, engine))
}

/// Runs `migrate analyze`.
pub fn analyze(
    path: &Path,
    component: Option<String>,
    report: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let (config, engine) = setup(path, config_path)?;
    let mut options = MigrationOptions::from_config(path, &config);
    options.component = component;

    let analysis = engine
        .analyze_project(&options)
        .context("Migration analysis failed")?;
    super::output::print_migration_analysis(&analysis);

    if let Some(report) = report {
        super::output::write_report(report, &analysis)?;
    }
    Ok(())
}

/// Runs `migrate v1-to-v2`.
pub fn v1_to_v2(path: &Path, args: V1ToV2Args, config_path: Option<&Path>) -> Result<()> {
    let (config, engine) = setup(path, config_path)?;
    let mut options = MigrationOptions::from_config(path, &config).dry_run(args.dry_run);
    options.component = args.component;
    if args.no_backup {
        options = options.backup(false);
    }
    if !args.include.is_empty() {
        options = options.include(args.include);
    }
    if !args.exclude.is_empty() {
        options = options.exclude(args.exclude);
    }

    let summary = engine.migrate_project(&options).context("Migration failed")?;
    finish(&summary, None)
}

/// Runs `migrate batch`.
pub fn batch(path: &Path, args: BatchArgs, config_path: Option<&Path>) -> Result<()> {
    let (config, engine) = setup(path, config_path)?;
    let mut options = MigrationOptions::from_config(path, &config)
        .exclude_complex(args.exclude_complex)
        .dry_run(args.dry_run);

    if let Some(filter) = &args.rules {
        let ids = parse_rule_ids(filter);
        for id in &ids {
            if !engine.rules().iter().any(|r| r.id == id.as_str()) {
                tracing::warn!("Unknown rule: {}", id);
            }
        }
        options = options.rules(ids);
    }

    let summary = engine.migrate_batch(&options).context("Batch migration failed")?;
    finish(&summary, args.report.as_deref())
}

fn finish(summary: &BatchSummary, report: Option<&Path>) -> Result<()> {
    super::output::print_batch(summary);
    if let Some(report) = report {
        super::output::write_report(report, summary)?;
    }
    if !summary.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn parse_rule_ids(filter: &str) -> Vec<String> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
