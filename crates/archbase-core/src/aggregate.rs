//! Pure reductions from usage facts to project summaries.
//!
//! Every derived field of [`ProjectScanResult`] is recomputed here from the
//! fact list, which keeps partial rescans consistent with full scans.

use crate::catalog;
use crate::thresholds;
use crate::types::{
    ComponentUsageFact, DataSourceVersion, DependencyReport, MigrationSummary, PatternSummary,
    ProjectScanResult, ScanFailure, ScanStatistics, SCHEMA_VERSION,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Counters over the fact list.
#[must_use]
pub fn statistics(
    components: &[ComponentUsageFact],
    files_scanned: usize,
    files_failed: usize,
) -> ScanStatistics {
    let count_version = |v: DataSourceVersion| {
        components
            .iter()
            .filter(|c| c.data_source_version == v)
            .count()
    };
    ScanStatistics {
        total_components: components.len(),
        archbase_components: components.iter().filter(|c| c.import_resolved).count(),
        v1_components: count_version(DataSourceVersion::V1),
        v2_components: count_version(DataSourceVersion::V2),
        files_scanned,
        files_failed,
        issues_found: components.iter().map(|c| c.issues.len()).sum(),
    }
}

/// Detected, missing and recommended project patterns.
#[must_use]
pub fn pattern_summary(components: &[ComponentUsageFact]) -> PatternSummary {
    let names: BTreeSet<&str> = components.iter().map(|c| c.name.as_str()).collect();
    let tags: BTreeSet<&str> = components
        .iter()
        .flat_map(|c| c.patterns.iter().map(String::as_str))
        .collect();

    let detected: BTreeSet<String> = catalog::PROJECT_PATTERNS
        .iter()
        .filter(|p| p.components.iter().all(|c| names.contains(c)) || tags.contains(p.name))
        .map(|p| p.name.to_owned())
        .collect();

    let mut recommended = BTreeSet::new();
    if names.contains("ArchbaseFormTemplate") && !detected.contains("form-with-datasource") {
        recommended.insert("form-with-datasource".to_owned());
    }
    if names.contains("ArchbaseDataGrid") && !detected.contains("crud-with-datagrid") {
        recommended.insert("crud-with-datagrid".to_owned());
    }

    let missing = catalog::PROJECT_PATTERNS
        .iter()
        .map(|p| p.name.to_owned())
        .filter(|p| !detected.contains(p) && !recommended.contains(p))
        .collect();

    PatternSummary {
        detected,
        missing,
        recommended,
    }
}

/// Returns true if the usage should move to the V2 DataSource.
#[must_use]
pub fn is_migration_candidate(fact: &ComponentUsageFact) -> bool {
    matches!(
        fact.data_source_version,
        DataSourceVersion::V1 | DataSourceVersion::Unknown
    ) && catalog::has_v2_equivalent(&fact.name)
}

/// V1 to V2 migration overview.
#[must_use]
pub fn migration_summary(components: &[ComponentUsageFact]) -> MigrationSummary {
    let candidates: Vec<ComponentUsageFact> = components
        .iter()
        .filter(|c| is_migration_candidate(c))
        .cloned()
        .collect();
    let issues: usize = components.iter().map(|c| c.issues.len()).sum();

    let mut recommendations = Vec::new();
    if !candidates.is_empty() {
        recommendations.push(format!(
            "Migrate {} components to DataSource V2",
            candidates.len()
        ));
        recommendations.push("Use ArchbaseRemoteDataSource for better performance".to_owned());
        recommendations.push("Implement reactive data binding patterns".to_owned());
    }
    let forms_without_feedback = components
        .iter()
        .any(|c| c.name == "ArchbaseFormTemplate" && !c.has_pattern("validation-with-feedback"));
    if forms_without_feedback {
        recommendations.push("Add validation feedback to forms".to_owned());
    }

    MigrationSummary {
        v1_to_v2_candidates: candidates,
        estimated_effort: thresholds::effort_for_issues(issues),
        recommendations,
    }
}

/// Recommendations for exported scan reports.
#[must_use]
pub fn report_recommendations(result: &ProjectScanResult) -> Vec<String> {
    let mut out = Vec::new();
    if result.statistics.issues_found > 0 {
        out.push(format!(
            "Fix {} component issues found",
            result.statistics.issues_found
        ));
    }
    if result.statistics.files_failed > 0 {
        out.push(format!(
            "Resolve syntax errors in {} file(s)",
            result.statistics.files_failed
        ));
    }
    if !result.migration.v1_to_v2_candidates.is_empty() {
        out.push("Consider migrating to DataSource V2 for better performance".to_owned());
    }
    if !result.dependencies.missing_dependencies.is_empty() {
        out.push("Install recommended dependencies for better integration".to_owned());
    }
    if !result.patterns.recommended.is_empty() {
        out.push("Implement recommended patterns for better maintainability".to_owned());
    }
    out
}

/// What a single-file analysis produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The file was analyzed.
    Analyzed(Vec<ComponentUsageFact>),
    /// The file could not be read or parsed.
    Failed(ScanFailure),
    /// The file no longer belongs to the scan.
    Removed,
}

/// Change summary for one replaced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescanDelta {
    /// File path relative to the root.
    pub file: PathBuf,
    /// Issues attributed to the file before the update.
    pub previous_issues: usize,
    /// Issues attributed to the file after the update.
    pub current_issues: usize,
    /// Increase in issue count.
    pub new_issues: usize,
    /// Decrease in issue count.
    pub fixed_issues: usize,
    /// Pattern tags on the file's usages after the update.
    pub patterns: BTreeSet<String>,
}

fn insert_sorted<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &Path) {
    let at = items.partition_point(|i| key(i) < key(&item));
    items.insert(at, item);
}

impl ProjectScanResult {
    /// Builds a result from per-file outcomes and recomputes every summary.
    #[must_use]
    pub fn from_parts(
        root: PathBuf,
        components: Vec<ComponentUsageFact>,
        scanned_files: Vec<PathBuf>,
        failures: Vec<ScanFailure>,
        dependencies: DependencyReport,
    ) -> Self {
        let mut result = Self {
            schema_version: SCHEMA_VERSION,
            root,
            components,
            scanned_files,
            failures,
            statistics: ScanStatistics::default(),
            patterns: PatternSummary::default(),
            migration: MigrationSummary::default(),
            dependencies,
        };
        result.refold();
        result
    }

    /// Recomputes statistics, pattern summary and migration overview.
    pub fn refold(&mut self) {
        self.statistics = statistics(
            &self.components,
            self.scanned_files.len(),
            self.failures.len(),
        );
        self.patterns = pattern_summary(&self.components);
        self.migration = migration_summary(&self.components);
    }

    fn file_issue_count(&self, file: &Path) -> usize {
        self.components_in(file).map(|c| c.issues.len()).sum()
    }

    /// Replaces everything known about `file` with `outcome` and refolds.
    ///
    /// New facts are inserted at the file's enumeration slot, so the result
    /// matches a fresh scan of the same tree. Repeated calls with the same
    /// outcome leave the result unchanged.
    pub fn replace_file(&mut self, file: &Path, outcome: FileOutcome) -> RescanDelta {
        let previous_issues = self.file_issue_count(file);

        self.components.retain(|c| c.file != file);
        self.scanned_files.retain(|f| f != file);
        self.failures.retain(|f| f.file != file);

        match outcome {
            FileOutcome::Analyzed(facts) => {
                let at = self.components.partition_point(|c| c.file.as_path() < file);
                self.components.splice(at..at, facts);
                insert_sorted(&mut self.scanned_files, file.to_path_buf(), PathBuf::as_path);
            }
            FileOutcome::Failed(failure) => {
                insert_sorted(&mut self.failures, failure, |f| f.file.as_path());
            }
            FileOutcome::Removed => {}
        }
        self.refold();

        let current_issues = self.file_issue_count(file);
        RescanDelta {
            file: file.to_path_buf(),
            previous_issues,
            current_issues,
            new_issues: current_issues.saturating_sub(previous_issues),
            fixed_issues: previous_issues.saturating_sub(current_issues),
            patterns: self
                .components_in(file)
                .flat_map(|c| c.patterns.iter().cloned())
                .collect(),
        }
    }

    /// Drops `file` from the result and refolds.
    pub fn remove_file(&mut self, file: &Path) -> RescanDelta {
        self.replace_file(file, FileOutcome::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentIssue, Effort, IssueKind};

    fn fact(file: &str, name: &str, version: DataSourceVersion, issues: usize) -> ComponentUsageFact {
        ComponentUsageFact {
            name: name.into(),
            import_path: "@archbase/react".into(),
            import_resolved: true,
            file: file.into(),
            line: 1,
            column: 0,
            props: Vec::new(),
            has_data_source: version != DataSourceVersion::Unknown,
            data_source_version: version,
            patterns: Vec::new(),
            issues: (0..issues)
                .map(|_| ComponentIssue::new(IssueKind::Warning, "w"))
                .collect(),
        }
    }

    fn result(components: Vec<ComponentUsageFact>) -> ProjectScanResult {
        let mut files: Vec<PathBuf> = components.iter().map(|c| c.file.clone()).collect();
        files.dedup();
        ProjectScanResult::from_parts(
            PathBuf::from("/p"),
            components,
            files,
            Vec::new(),
            DependencyReport::default(),
        )
    }

    #[test]
    fn statistics_count_versions_and_issues() {
        let stats = statistics(
            &[
                fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 2),
                fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V2, 0),
                fact("b.tsx", "ArchbaseButton", DataSourceVersion::Unknown, 1),
            ],
            2,
            1,
        );
        assert_eq!(stats.total_components, 3);
        assert_eq!(stats.v1_components, 1);
        assert_eq!(stats.v2_components, 1);
        assert_eq!(stats.issues_found, 3);
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.files_failed, 1);
    }

    #[test]
    fn candidates_need_v2_equivalent() {
        let summary = migration_summary(&[
            fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 0),
            fact("a.tsx", "ArchbaseEdit", DataSourceVersion::Unknown, 0),
            fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V2, 0),
            fact("a.tsx", "ArchbaseButton", DataSourceVersion::Unknown, 0),
        ]);
        assert_eq!(summary.v1_to_v2_candidates.len(), 2);
        assert_eq!(summary.recommendations[0], "Migrate 2 components to DataSource V2");
    }

    #[test]
    fn effort_follows_total_issue_count() {
        let low = migration_summary(&[fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 10)]);
        assert_eq!(low.estimated_effort, Effort::Low);
        let medium = migration_summary(&[fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 11)]);
        assert_eq!(medium.estimated_effort, Effort::Medium);
        let high = migration_summary(&[
            fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 25),
            fact("b.tsx", "ArchbaseEdit", DataSourceVersion::V1, 1),
        ]);
        assert_eq!(high.estimated_effort, Effort::High);
    }

    #[test]
    fn pattern_summary_recommends_missing_pairs() {
        let summary = pattern_summary(&[fact(
            "a.tsx",
            "ArchbaseDataGrid",
            DataSourceVersion::V1,
            0,
        )]);
        assert!(summary.recommended.contains("crud-with-datagrid"));
        assert!(summary.detected.is_empty());
        assert!(summary.missing.contains("async-loading"));
        assert!(!summary.missing.contains("crud-with-datagrid"));
    }

    #[test]
    fn tagged_usage_marks_pattern_detected() {
        let mut f = fact("a.tsx", "ArchbaseFormTemplate", DataSourceVersion::V2, 0);
        f.patterns.push("form-with-datasource".into());
        let summary = pattern_summary(&[f]);
        assert!(summary.detected.contains("form-with-datasource"));
        assert!(summary.recommended.is_empty());
    }

    #[test]
    fn replace_keeps_enumeration_order() {
        let mut r = result(vec![
            fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 0),
            fact("b.tsx", "ArchbaseEdit", DataSourceVersion::V1, 1),
            fact("c.tsx", "ArchbaseEdit", DataSourceVersion::V1, 0),
        ]);
        let delta = r.replace_file(
            Path::new("b.tsx"),
            FileOutcome::Analyzed(vec![
                fact("b.tsx", "ArchbaseEdit", DataSourceVersion::V2, 0),
                fact("b.tsx", "ArchbaseSelect", DataSourceVersion::V2, 0),
            ]),
        );
        let files: Vec<_> = r.components.iter().map(|c| c.file.to_string_lossy().into_owned()).collect();
        assert_eq!(files, vec!["a.tsx", "b.tsx", "b.tsx", "c.tsx"]);
        assert_eq!(r.statistics.v2_components, 2);
        assert_eq!(r.statistics.files_scanned, 3);
        assert_eq!(delta.fixed_issues, 1);
        assert_eq!(delta.new_issues, 0);
    }

    #[test]
    fn replace_is_idempotent() {
        let mut r = result(vec![
            fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 0),
            fact("b.tsx", "ArchbaseEdit", DataSourceVersion::V1, 1),
        ]);
        let outcome = FileOutcome::Analyzed(vec![fact("b.tsx", "ArchbaseEdit", DataSourceVersion::V1, 1)]);
        let before = r.clone();
        r.replace_file(Path::new("b.tsx"), outcome.clone());
        r.replace_file(Path::new("b.tsx"), outcome);
        assert_eq!(r, before);
    }

    #[test]
    fn failure_moves_file_out_of_scanned() {
        let mut r = result(vec![fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 3)]);
        let delta = r.replace_file(
            Path::new("a.tsx"),
            FileOutcome::Failed(ScanFailure {
                file: "a.tsx".into(),
                message: "unexpected `<`".into(),
                line: Some(1),
                column: Some(0),
            }),
        );
        assert_eq!(r.statistics.files_scanned, 0);
        assert_eq!(r.statistics.files_failed, 1);
        assert!(r.components.is_empty());
        assert_eq!(delta.fixed_issues, 3);
    }

    #[test]
    fn statistics_are_pure_after_edits() {
        let mut r = result(vec![fact("a.tsx", "ArchbaseEdit", DataSourceVersion::V1, 1)]);
        r.remove_file(Path::new("a.tsx"));
        assert_eq!(
            r.statistics,
            statistics(&r.components, r.scanned_files.len(), r.failures.len())
        );
        assert_eq!(r.statistics.total_components, 0);
    }
}
