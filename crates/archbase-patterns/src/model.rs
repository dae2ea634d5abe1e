//! Result types of a pattern analysis.

use archbase_core::thresholds::Priority;
use archbase_core::{DataSourceVersion, ScanFailure};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Prop name to occurrence count.
pub type PropFrequency = BTreeMap<String, usize>;

/// Full output of [`crate::PatternAnalyzer::analyze_project`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysisResult {
    /// Document version.
    pub schema_version: u32,
    /// Files parsed successfully.
    pub files_analyzed: usize,
    /// Files that could not be read or parsed.
    pub failures: Vec<ScanFailure>,
    /// Generalized patterns worth a template.
    pub patterns: Vec<DetectedPattern>,
    /// DataSource usage grouped by component and version.
    pub data_source_usage: Vec<DataSourceUsagePattern>,
    /// Form shapes grouped by validation, layout and complexity.
    pub form_patterns: Vec<FormPattern>,
    /// Per-component usage statistics.
    pub component_usage: Vec<ComponentUsageStats>,
    /// Validation schema usage per library.
    pub validation_patterns: Vec<ValidationPattern>,
    /// Page layouts.
    pub page_structures: Vec<PageStructurePattern>,
    /// Recommendations in rule order.
    pub recommendations: Vec<Recommendation>,
}

impl ProjectAnalysisResult {
    /// Number of form occurrences with the given validation library.
    #[must_use]
    pub fn forms_with(&self, library: ValidationLibrary) -> usize {
        self.form_patterns
            .iter()
            .filter(|f| f.validation_library == library)
            .map(|f| f.frequency)
            .sum()
    }

    /// Returns true if any DataSource group has the given version.
    #[must_use]
    pub fn uses_data_source(&self, version: DataSourceVersion) -> bool {
        self.data_source_usage.iter().any(|d| d.version == version)
    }

    /// Looks up a recommendation by id.
    #[must_use]
    pub fn recommendation(&self, id: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.id == id)
    }
}

/// Kind of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// A form.
    Form,
    /// A read-only view.
    View,
    /// A routed page.
    Page,
    /// A single component configuration.
    Component,
    /// A page layout.
    Layout,
}

/// A generalized, reusable shape found in the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPattern {
    /// Unique pattern name.
    pub name: String,
    /// Pattern kind.
    #[serde(rename = "type")]
    pub kind: PatternKind,
    /// Number of grouped occurrences.
    pub frequency: usize,
    /// `high` at or above the frequency threshold, else `medium`.
    pub priority: Priority,
    /// Files the occurrences came from.
    pub files: Vec<PathBuf>,
    /// Human readable summary.
    pub description: String,
    /// Template path a generator would use.
    pub template: String,
    /// Template parameters.
    pub parameters: BTreeMap<String, serde_json::Value>,
    /// Representative snippets.
    pub examples: Vec<PatternExample>,
}

/// A snippet illustrating a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternExample {
    /// Source file.
    pub file: PathBuf,
    /// Source excerpt.
    pub code: String,
    /// What the excerpt shows.
    pub description: String,
}

/// DataSource usages of one component with one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceUsagePattern {
    /// Component name.
    pub component: String,
    /// DataSource version.
    pub version: DataSourceVersion,
    /// Number of usages.
    pub usage_count: usize,
    /// Prop frequency over all usages.
    pub common_props: PropFrequency,
    /// Union of usage pattern tags.
    pub patterns: BTreeSet<String>,
    /// Distinct files in enumeration order.
    pub files: Vec<PathBuf>,
}

/// Validation library used by a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLibrary {
    /// `yup` schemas.
    Yup,
    /// `zod` schemas.
    Zod,
    /// An inline validate function.
    Custom,
    /// No validation.
    None,
}

impl fmt::Display for ValidationLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Yup => "yup",
            Self::Zod => "zod",
            Self::Custom => "custom",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Form complexity by distinct field type count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormComplexity {
    /// Up to two field types.
    Low,
    /// Three to five.
    Medium,
    /// Six or more.
    High,
}

impl fmt::Display for FormComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

/// Form occurrences sharing validation library, layout and complexity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPattern {
    /// Union of field types.
    pub field_types: BTreeSet<String>,
    /// Validation library.
    pub validation_library: ValidationLibrary,
    /// Layout name, `vertical` unless set on the form.
    pub layout: String,
    /// Union of form features.
    pub common_features: BTreeSet<String>,
    /// Complexity tier.
    pub complexity: FormComplexity,
    /// Number of form occurrences.
    pub frequency: usize,
    /// Files the occurrences came from.
    pub files: Vec<PathBuf>,
}

/// Usage statistics of one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUsageStats {
    /// Component name.
    pub component: String,
    /// Number of usages.
    pub usage_count: usize,
    /// Prop frequency.
    pub common_props: PropFrequency,
    /// Union of usage pattern tags.
    pub patterns: BTreeSet<String>,
    /// Contexts inferred from file paths.
    pub contexts: BTreeSet<String>,
}

/// Validation library usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPattern {
    /// Library.
    #[serde(rename = "type")]
    pub library: ValidationLibrary,
    /// Rules seen in schema method calls.
    pub rules: BTreeSet<String>,
    /// Number of files using the library with at least one rule.
    pub frequency: usize,
    /// Those files.
    pub examples: Vec<PathBuf>,
}

/// Navigation presence on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    /// Navigation elements were found.
    Present,
    /// None found.
    Absent,
}

/// Pages sharing one layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStructurePattern {
    /// `sidebar`, `header`, `dashboard` or `unknown`.
    pub layout: String,
    /// Union of sections.
    pub sections: BTreeSet<String>,
    /// Whether any grouped page has navigation.
    pub navigation: Navigation,
    /// Whether any grouped page references authentication.
    pub authentication: bool,
    /// Number of pages.
    pub frequency: usize,
    /// Page files.
    pub files: Vec<PathBuf>,
}

/// Kind of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    /// A new generator template.
    Template,
    /// A new generator parameter.
    Parameter,
    /// A code pattern to adopt.
    Pattern,
    /// A performance or maintenance improvement.
    Optimization,
}

/// One recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Stable identifier of the producing rule.
    pub id: String,
    /// Kind.
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Priority.
    pub priority: Priority,
    /// Implementation hint.
    pub implementation: String,
}
