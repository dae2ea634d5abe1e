//! Value types produced by extraction and scanning.
//!
//! Every type here serializes with camelCase keys so that exported reports
//! keep stable field names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Version stamp written into every top-level result document.
pub const SCHEMA_VERSION: u32 = 1;

/// Kind of a component issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Improvement hint, never fails a run.
    Suggestion,
    /// Deprecated or risky usage.
    Warning,
    /// Usage that is known to be broken.
    Error,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Suggestion => write!(f, "suggestion"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A problem detected at a component call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentIssue {
    /// Issue kind.
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Human-readable message.
    pub message: String,
    /// Suggested fix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    /// Line number (1-indexed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Column (0-indexed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ComponentIssue {
    /// Creates an issue without location.
    #[must_use]
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fix: None,
            line: None,
            column: None,
        }
    }

    /// Attaches a suggested fix.
    #[must_use]
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    /// Attaches a source position.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// Best-effort type of a JSX attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    /// String literal.
    String,
    /// Numeric literal.
    Number,
    /// Boolean literal or bare attribute.
    Boolean,
    /// Plain identifier reference.
    Variable,
    /// Inline arrow or function expression.
    Function,
    /// Object literal.
    Object,
    /// Array literal.
    Array,
    /// Anything else.
    Any,
}

impl std::fmt::Display for PropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Variable => "variable",
            Self::Function => "function",
            Self::Object => "object",
            Self::Array => "array",
            Self::Any => "any",
        };
        f.write_str(s)
    }
}

/// One attribute at a component call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropInfo {
    /// Attribute name.
    pub name: String,
    /// Inferred value type.
    #[serde(rename = "type")]
    pub prop_type: PropType,
    /// Literal value or referenced identifier name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Present only when the component declares the prop as required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
}

/// DataSource generation a usage is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceVersion {
    /// Legacy synchronous DataSource.
    V1,
    /// Remote/reactive DataSource.
    V2,
    /// The file uses both generations and the binding could not be traced.
    Mixed,
    /// No evidence either way.
    #[default]
    Unknown,
}

impl std::fmt::Display for DataSourceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
            Self::Mixed => write!(f, "mixed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single tracked component invocation site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUsageFact {
    /// Component identifier as written at the call site.
    pub name: String,
    /// Module the component was imported from.
    pub import_path: String,
    /// `false` when `import_path` is a best-effort guess.
    pub import_resolved: bool,
    /// Path relative to the scan root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed).
    pub column: usize,
    /// Attributes in source order.
    pub props: Vec<PropInfo>,
    /// Whether a `dataSource`/`dataField` prop is present.
    pub has_data_source: bool,
    /// DataSource generation.
    pub data_source_version: DataSourceVersion,
    /// Ordered, de-duplicated pattern tags.
    pub patterns: Vec<String>,
    /// Issues in detection order.
    pub issues: Vec<ComponentIssue>,
}

impl ComponentUsageFact {
    /// Returns the prop with the given name.
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&PropInfo> {
        self.props.iter().find(|p| p.name == name)
    }

    /// Returns true if the usage carries the given tag.
    #[must_use]
    pub fn has_pattern(&self, tag: &str) -> bool {
        self.patterns.iter().any(|p| p == tag)
    }

    /// Counts issues of the given kind.
    #[must_use]
    pub fn issue_count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

/// A file that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFailure {
    /// Path relative to the scan root.
    pub file: PathBuf,
    /// Error message.
    pub message: String,
    /// Line number (1-indexed), for syntax errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Column (0-indexed), for syntax errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

/// Aggregate counters; always derived from the usage list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatistics {
    /// Number of tracked usages.
    pub total_components: usize,
    /// Usages whose import resolved to an Archbase module.
    pub archbase_components: usize,
    /// Usages bound to a V1 DataSource.
    pub v1_components: usize,
    /// Usages bound to a V2 DataSource.
    pub v2_components: usize,
    /// Files analyzed successfully.
    pub files_scanned: usize,
    /// Files that failed to read or parse.
    pub files_failed: usize,
    /// Total issues across all usages.
    pub issues_found: usize,
}

/// Project-level pattern summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    /// Patterns present in the project.
    pub detected: BTreeSet<String>,
    /// Known patterns neither present nor recommended.
    pub missing: BTreeSet<String>,
    /// Patterns the project is close to adopting.
    pub recommended: BTreeSet<String>,
}

/// Banded effort estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Effort {
    /// Few issues.
    #[default]
    Low,
    /// Moderate number of issues.
    Medium,
    /// Many issues.
    High,
}

impl std::fmt::Display for Effort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// V1 to V2 migration overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    /// Usages that should move to the V2 DataSource.
    pub v1_to_v2_candidates: Vec<ComponentUsageFact>,
    /// Effort band derived from the total issue count.
    pub estimated_effort: Effort,
    /// Free-text recommendations.
    pub recommendations: Vec<String>,
}

/// A dependency whose installed version lags behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedDependency {
    /// Package name.
    pub name: String,
    /// Declared version.
    pub current: String,
    /// Latest known version.
    pub latest: String,
}

/// Dependency information read from `package.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    /// Declared `@archbase/react` version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archbase_version: Option<String>,
    /// Declared `react` version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub react_version: Option<String>,
    /// Recommended packages that are not declared.
    pub missing_dependencies: Vec<String>,
    /// Always empty: no registry lookups are performed.
    pub outdated_dependencies: Vec<OutdatedDependency>,
    /// Set when `package.json` exists but could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_error: Option<String>,
}

/// Result of scanning a project directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectScanResult {
    /// Document version.
    pub schema_version: u32,
    /// Absolute scan root.
    pub root: PathBuf,
    /// Usages in file-enumeration order, then source order.
    pub components: Vec<ComponentUsageFact>,
    /// Successfully analyzed files in enumeration order.
    pub scanned_files: Vec<PathBuf>,
    /// Files that could not be analyzed.
    pub failures: Vec<ScanFailure>,
    /// Derived counters.
    pub statistics: ScanStatistics,
    /// Derived pattern summary.
    pub patterns: PatternSummary,
    /// Derived migration overview.
    pub migration: MigrationSummary,
    /// Dependency information.
    pub dependencies: DependencyReport,
}

impl ProjectScanResult {
    /// Returns the usages found in one file.
    pub fn components_in<'a>(
        &'a self,
        file: &'a std::path::Path,
    ) -> impl Iterator<Item = &'a ComponentUsageFact> + 'a {
        self.components.iter().filter(move |c| c.file == file)
    }

    /// Returns true if any file failed or any usage has an error issue.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
            || self
                .components
                .iter()
                .any(|c| c.issue_count(IssueKind::Error) > 0)
    }

    /// Iterates over all issues with their owning usage.
    pub fn issues(&self) -> impl Iterator<Item = (&ComponentUsageFact, &ComponentIssue)> {
        self.components
            .iter()
            .flat_map(|c| c.issues.iter().map(move |i| (c, i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_serializes_kind_as_type() {
        let issue = ComponentIssue::new(IssueKind::Error, "Missing required prop: dataSource")
            .with_fix("Add dataSource prop to ArchbaseEdit")
            .at(3, 4);
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["line"], 3);
        assert_eq!(json["fix"], "Add dataSource prop to ArchbaseEdit");
    }

    #[test]
    fn issue_without_location_omits_fields() {
        let json = serde_json::to_value(ComponentIssue::new(IssueKind::Warning, "x")).unwrap();
        assert!(json.get("line").is_none());
        assert!(json.get("fix").is_none());
    }

    #[test]
    fn versions_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&DataSourceVersion::Mixed).unwrap(),
            "\"mixed\""
        );
        assert_eq!(DataSourceVersion::V1.to_string(), "v1");
    }

    #[test]
    fn effort_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&Effort::High).unwrap(), "\"High\"");
    }

    #[test]
    fn issue_kinds_order_by_severity() {
        assert!(IssueKind::Error > IssueKind::Warning);
        assert!(IssueKind::Warning > IssueKind::Suggestion);
    }

    #[test]
    fn prop_info_uses_camel_case_keys() {
        let prop = PropInfo {
            name: "dataSource".into(),
            prop_type: PropType::Variable,
            value: Some(serde_json::Value::String("ds".into())),
            is_required: Some(true),
        };
        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json["type"], "variable");
        assert_eq!(json["isRequired"], true);
    }
}
