//! The migration pipeline.

use crate::error::MigrationError;
use crate::registry;
use crate::rule::MigrationRule;
use crate::types::{MigrationChange, MigrationResult};
use archbase_core::aggregate::is_migration_candidate;
use archbase_core::config::{FailurePolicy, ScannerConfig};
use archbase_core::thresholds::{self, MigrationComplexity};
use archbase_core::{Config, Effort, ProjectScanner, ScanError, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings for analysis and migration runs.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Project root.
    pub root: PathBuf,
    /// Only rules targeting this component run.
    pub component: Option<String>,
    /// Only these rule ids run.
    pub rule_ids: Option<Vec<String>>,
    /// Batch runs skip files whose issues are all `complex`.
    pub exclude_complex: bool,
    /// File discovery.
    pub scanner: ScannerConfig,
    /// Report changes without writing.
    pub dry_run: bool,
    /// Write `<file>.backup` before overwriting.
    pub backup: bool,
    /// What to do with a file when a rule fails.
    pub failure_policy: FailurePolicy,
}

impl MigrationOptions {
    /// Default options for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(root, &Config::default())
    }

    /// Options for `root` seeded from a configuration.
    #[must_use]
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            root: root.into(),
            component: None,
            rule_ids: None,
            exclude_complex: false,
            scanner: config.scanner.clone(),
            dry_run: false,
            backup: config.migration.backup,
            failure_policy: config.migration.failure_policy,
        }
    }

    /// Restricts the run to rules targeting `component`.
    #[must_use]
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Restricts the run to the given rule ids.
    #[must_use]
    pub fn rules<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Skips complex issues in batch runs.
    #[must_use]
    pub fn exclude_complex(mut self, exclude: bool) -> Self {
        self.exclude_complex = exclude;
        self
    }

    /// Sets dry-run mode.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets whether backups are written.
    #[must_use]
    pub fn backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Replaces include patterns.
    #[must_use]
    pub fn include(mut self, patterns: Vec<String>) -> Self {
        self.scanner.include = patterns;
        self
    }

    /// Replaces exclude patterns.
    #[must_use]
    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.scanner.exclude = patterns;
        self
    }

    fn allows_rule(&self, id: &str) -> bool {
        self.rule_ids
            .as_ref()
            .map_or(true, |ids| ids.iter().any(|i| i == id))
    }

    fn scanner(&self) -> Result<ProjectScanner, ScanError> {
        ProjectScanner::builder()
            .root(&self.root)
            .includes(self.scanner.include.iter().cloned())
            .excludes(self.scanner.exclude.iter().cloned())
            .deep(self.scanner.deep)
            .respect_gitignore(self.scanner.respect_gitignore)
            .build()
    }
}

/// One (candidate usage, applicable rule) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationIssue {
    /// File relative to the root.
    pub file: PathBuf,
    /// Component name.
    pub component: String,
    /// Rule id.
    pub rule: String,
    /// Migration complexity of the usage.
    pub complexity: MigrationComplexity,
    /// Rule description.
    pub description: String,
}

/// Read-only migration overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationAnalysis {
    /// Document version.
    pub schema_version: u32,
    /// Files analyzed by the scan.
    pub total_files: usize,
    /// Distinct files holding migration candidates.
    pub migrable_files: usize,
    /// Issues in scan order.
    pub issues: Vec<MigrationIssue>,
    /// Effort band from the issue count.
    pub estimated_effort: Effort,
}

impl MigrationAnalysis {
    /// Number of issues with the given complexity.
    #[must_use]
    pub fn count(&self, complexity: MigrationComplexity) -> usize {
        self.issues
            .iter()
            .filter(|i| i.complexity == complexity)
            .count()
    }
}

/// Outcome for one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMigration {
    /// File relative to the root.
    pub file: PathBuf,
    /// Changes in application order.
    pub changes: Vec<MigrationChange>,
    /// Rule warnings.
    pub warnings: Vec<String>,
    /// Rule errors.
    pub errors: Vec<String>,
    /// Whether the file was overwritten.
    pub written: bool,
}

/// Outcome of a multi-file run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Document version.
    pub schema_version: u32,
    /// Whether files were left untouched.
    pub dry_run: bool,
    /// Analysis driving the batch, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MigrationAnalysis>,
    /// Files with changes, warnings or errors.
    pub files: Vec<FileMigration>,
    /// Files run through the pipeline.
    pub files_processed: usize,
    /// Files with at least one change.
    pub files_migrated: usize,
    /// Changes over all files.
    pub total_changes: usize,
    /// Rule and IO errors, prefixed with the file.
    pub errors: Vec<String>,
}

/// Runs an ordered, immutable list of rules over source files.
#[derive(Debug)]
pub struct MigrationEngine {
    rules: Vec<MigrationRule>,
}

impl Default for MigrationEngine {
    fn default() -> Self {
        Self::new(registry::default_rules())
    }
}

impl MigrationEngine {
    /// Creates an engine running `rules` in order.
    #[must_use]
    pub fn new(rules: Vec<MigrationRule>) -> Self {
        Self { rules }
    }

    /// Creates an engine with the shipped rules enabled in `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(registry::configured_rules(config))
    }

    /// Rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[MigrationRule] {
        &self.rules
    }

    /// Returns true if `rule` should run on `code`.
    #[must_use]
    pub fn should_apply_rule(&self, rule: &MigrationRule, code: &str, options: &MigrationOptions) -> bool {
        if let Some(component) = &options.component {
            if !rule.targets(component) {
                return false;
            }
        }
        options.allows_rule(rule.id) && rule.mentioned_in(code)
    }

    /// Runs every applicable rule on `source`.
    ///
    /// Each rule sees the output of the last successful rule. A failed rule
    /// contributes its errors and leaves the working copy unchanged.
    #[must_use]
    pub fn migrate_source(&self, source: &str, path: &Path, options: &MigrationOptions) -> MigrationResult {
        let mut current = source.to_owned();
        let mut changes = Vec::new();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        for rule in &self.rules {
            if !self.should_apply_rule(rule, &current, options) {
                continue;
            }
            let result = rule.apply(&current, path);
            warnings.extend(result.warnings);
            match result.code {
                Some(code) if result.success => {
                    debug!("{}: {} made {} changes", path.display(), rule.id, result.changes.len());
                    current = code;
                    changes.extend(result.changes);
                }
                _ => {
                    warn!("{}: {} failed", path.display(), rule.id);
                    errors.extend(result.errors.into_iter().map(|e| format!("{}: {e}", rule.id)));
                }
            }
        }

        if !errors.is_empty() && options.failure_policy == FailurePolicy::RollbackFile {
            return MigrationResult {
                success: false,
                code: None,
                changes: Vec::new(),
                errors,
                warnings,
            };
        }
        MigrationResult {
            success: true,
            code: Some(current),
            changes,
            errors,
            warnings,
        }
    }

    /// Reads `path` and migrates its text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn migrate_file(&self, path: &Path, options: &MigrationOptions) -> Result<MigrationResult, MigrationError> {
        let source = std::fs::read_to_string(path).map_err(|e| MigrationError::io(path, e))?;
        Ok(self.migrate_source(&source, path, options))
    }

    /// Writes a successful result over `path`, backing up the original first.
    ///
    /// Returns `false` when there was nothing to write.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup or the write fails.
    pub fn apply(path: &Path, result: &MigrationResult, backup: bool) -> Result<bool, MigrationError> {
        let Some(code) = result.code.as_deref().filter(|_| result.success) else {
            return Ok(false);
        };
        if backup {
            let target = backup_path(path);
            std::fs::copy(path, &target).map_err(|e| MigrationError::io(&target, e))?;
        }
        std::fs::write(path, code).map_err(|e| MigrationError::io(path, e))?;
        Ok(true)
    }

    /// Finds migration candidates without touching any file.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot start.
    pub fn analyze_project(&self, options: &MigrationOptions) -> Result<MigrationAnalysis, MigrationError> {
        let scan = options.scanner()?.scan();
        let mut migrable: BTreeSet<&Path> = BTreeSet::new();
        let mut issues = Vec::new();

        let candidates = scan
            .components
            .iter()
            .filter(|c| is_migration_candidate(c))
            .filter(|c| options.component.as_ref().map_or(true, |name| *name == c.name));
        for candidate in candidates {
            migrable.insert(&candidate.file);
            let complexity = thresholds::migration_complexity(candidate.issues.len(), candidate.props.len());
            for rule in self.rules.iter().filter(|r| r.targets(&candidate.name)) {
                issues.push(MigrationIssue {
                    file: candidate.file.clone(),
                    component: candidate.name.clone(),
                    rule: rule.id.to_owned(),
                    complexity,
                    description: rule.description.to_owned(),
                });
            }
        }

        info!("Migration analysis: {} issues in {} files", issues.len(), migrable.len());
        Ok(MigrationAnalysis {
            schema_version: SCHEMA_VERSION,
            total_files: scan.statistics.files_scanned,
            migrable_files: migrable.len(),
            estimated_effort: thresholds::effort_for_issues(issues.len()),
            issues,
        })
    }

    /// Migrates every discovered file.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot start. Per-file failures are
    /// recorded in the summary.
    pub fn migrate_project(&self, options: &MigrationOptions) -> Result<BatchSummary, MigrationError> {
        let scanner = options.scanner()?;
        let files = scanner.discover();
        info!("Migrating {} files under {}", files.len(), scanner.root().display());
        Ok(self.run(scanner.root(), files, options, None))
    }

    /// Migrates the files named by a fresh analysis.
    ///
    /// Issues are filtered by `exclude_complex` and `rule_ids` before files
    /// are grouped.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot start.
    pub fn migrate_batch(&self, options: &MigrationOptions) -> Result<BatchSummary, MigrationError> {
        let scanner = options.scanner()?;
        let analysis = self.analyze_project(options)?;

        let mut files: Vec<PathBuf> = Vec::new();
        let mut selected = 0;
        for issue in &analysis.issues {
            if options.exclude_complex && issue.complexity == MigrationComplexity::Complex {
                continue;
            }
            if !options.allows_rule(&issue.rule) {
                continue;
            }
            selected += 1;
            if !files.contains(&issue.file) {
                files.push(issue.file.clone());
            }
        }
        info!("Batch plan: {selected} of {} issues in {} files", analysis.issues.len(), files.len());
        Ok(self.run(scanner.root(), files, options, Some(analysis)))
    }

    fn run(
        &self,
        root: &Path,
        files: Vec<PathBuf>,
        options: &MigrationOptions,
        analysis: Option<MigrationAnalysis>,
    ) -> BatchSummary {
        let mut summary = BatchSummary {
            schema_version: SCHEMA_VERSION,
            dry_run: options.dry_run,
            analysis,
            files: Vec::new(),
            files_processed: 0,
            files_migrated: 0,
            total_changes: 0,
            errors: Vec::new(),
        };

        for file in files {
            let path = root.join(&file);
            let result = match self.migrate_file(&path, options) {
                Ok(result) => result,
                Err(e) => {
                    warn!("Failed to migrate {}: {e}", file.display());
                    summary.errors.push(format!("Failed to migrate {}: {e}", file.display()));
                    continue;
                }
            };
            summary.files_processed += 1;

            let mut written = false;
            if result.has_changes() {
                summary.files_migrated += 1;
                summary.total_changes += result.changes.len();
                if !options.dry_run {
                    match Self::apply(&path, &result, options.backup) {
                        Ok(w) => written = w,
                        Err(e) => summary.errors.push(e.to_string()),
                    }
                }
            }
            summary
                .errors
                .extend(result.errors.iter().map(|e| format!("{}: {e}", file.display())));

            if result.has_changes() || !result.errors.is_empty() || !result.warnings.is_empty() {
                summary.files.push(FileMigration {
                    file,
                    changes: result.changes,
                    warnings: result.warnings,
                    errors: result.errors,
                    written,
                });
            }
        }

        info!(
            "Migration complete: {} of {} files changed, {} changes",
            summary.files_migrated, summary.files_processed, summary.total_changes
        );
        summary
    }
}

/// `<path>.backup`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{AstRewriter, Transform};
    use crate::types::ChangeKind;

    struct Failing;

    impl AstRewriter for Failing {
        fn rewrite(&self, _: &str, _: &Path) -> MigrationResult {
            MigrationResult::failure("boom")
        }
    }

    struct Append(&'static str);

    impl AstRewriter for Append {
        fn rewrite(&self, source: &str, _: &Path) -> MigrationResult {
            MigrationResult::success(
                format!("{source}{}", self.0),
                vec![MigrationChange::new(ChangeKind::Add, "appended")],
                Vec::new(),
            )
        }
    }

    fn rule(id: &'static str, rewriter: Box<dyn AstRewriter>) -> MigrationRule {
        MigrationRule {
            id,
            name: id,
            description: id,
            from_version: "1.x",
            to_version: "2.x",
            component_names: vec!["ArchbaseEdit"],
            transform: Transform::AstRewrite(rewriter),
        }
    }

    fn engine() -> MigrationEngine {
        MigrationEngine::new(vec![
            rule("first", Box::new(Append("// a\n"))),
            rule("broken", Box::new(Failing)),
            rule("last", Box::new(Append("// b\n"))),
        ])
    }

    const SRC: &str = "<ArchbaseEdit />\n";

    #[test]
    fn keep_applied_threads_last_good_text() {
        let options = MigrationOptions::new(".");
        let result = engine().migrate_source(SRC, Path::new("a.tsx"), &options);
        assert!(result.success);
        assert_eq!(result.code.as_deref(), Some("<ArchbaseEdit />\n// a\n// b\n"));
        assert_eq!(result.changes.len(), 2);
        assert_eq!(result.errors, vec!["broken: boom"]);
    }

    #[test]
    fn rollback_discards_the_file() {
        let options = MigrationOptions::new(".").failure_policy(FailurePolicy::RollbackFile);
        let result = engine().migrate_source(SRC, Path::new("a.tsx"), &options);
        assert!(!result.success);
        assert!(result.code.is_none());
        assert!(result.changes.is_empty());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn applicability_filters() {
        let engine = engine();
        let first = &engine.rules()[0];
        let options = MigrationOptions::new(".");
        assert!(engine.should_apply_rule(first, SRC, &options));
        assert!(!engine.should_apply_rule(first, "<Other />", &options));
        assert!(!engine.should_apply_rule(first, SRC, &options.clone().component("ArchbaseSelect")));
        assert!(!engine.should_apply_rule(first, SRC, &options.clone().rules(["last"])));
        assert!(engine.should_apply_rule(first, SRC, &options.rules(["first"])));
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(backup_path(Path::new("src/a.tsx")), PathBuf::from("src/a.tsx.backup"));
    }
}
