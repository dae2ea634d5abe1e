//! Fixed classification bands.
//!
//! All numeric cut-offs used for effort, complexity and priority live here.

use crate::types::Effort;
use serde::{Deserialize, Serialize};

/// Highest issue count still estimated as [`Effort::Low`].
pub const EFFORT_LOW_MAX_ISSUES: usize = 10;
/// Highest issue count still estimated as [`Effort::Medium`].
pub const EFFORT_MEDIUM_MAX_ISSUES: usize = 25;

/// Highest file score still rated [`FileComplexity::Low`].
pub const FILE_COMPLEXITY_LOW_MAX: usize = 5;
/// Highest file score still rated [`FileComplexity::Medium`].
pub const FILE_COMPLEXITY_MEDIUM_MAX: usize = 15;
/// Score added when a file uses a side-effect hook.
pub const SIDE_EFFECT_HOOK_WEIGHT: usize = 2;

/// Issue ceiling for a `simple` migration.
pub const MIGRATION_SIMPLE_MAX_ISSUES: usize = 0;
/// Prop ceiling for a `simple` migration.
pub const MIGRATION_SIMPLE_MAX_PROPS: usize = 5;
/// Issue ceiling for a `medium` migration.
pub const MIGRATION_MEDIUM_MAX_ISSUES: usize = 2;
/// Prop ceiling for a `medium` migration.
pub const MIGRATION_MEDIUM_MAX_PROPS: usize = 10;

/// Frequency at which a detected pattern becomes high priority.
pub const HIGH_PRIORITY_MIN_FREQUENCY: usize = 5;
/// Minimum occurrences for a form shape to be reported as a pattern.
pub const FORM_PATTERN_MIN_FREQUENCY: usize = 2;
/// Minimum usages for a DataSource group to be reported as a pattern.
pub const DATASOURCE_PATTERN_MIN_USAGES: usize = 3;
/// Minimum pages sharing a layout for it to be reported as a pattern.
pub const PAGE_PATTERN_MIN_FREQUENCY: usize = 2;
/// Unvalidated form count at which the upgrade recommendation becomes high priority.
pub const VALIDATION_UPGRADE_HIGH_MIN_FORMS: usize = 5;

/// Form field type counts above these are `high`/`medium`.
pub const FORM_HIGH_MIN_FIELD_TYPES: usize = 6;
/// See [`FORM_HIGH_MIN_FIELD_TYPES`].
pub const FORM_MEDIUM_MIN_FIELD_TYPES: usize = 3;

/// Maps a total issue count to an effort band.
#[must_use]
pub fn effort_for_issues(issues: usize) -> Effort {
    if issues <= EFFORT_LOW_MAX_ISSUES {
        Effort::Low
    } else if issues <= EFFORT_MEDIUM_MAX_ISSUES {
        Effort::Medium
    } else {
        Effort::High
    }
}

/// Complexity of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileComplexity {
    /// Few hooks and usages.
    #[default]
    Low,
    /// Moderate.
    Medium,
    /// Heavy.
    High,
}

/// Rates a file from its hook and usage counts.
#[must_use]
pub fn file_complexity(distinct_hooks: usize, usages: usize, side_effects: bool) -> FileComplexity {
    let score = distinct_hooks + usages + if side_effects { SIDE_EFFECT_HOOK_WEIGHT } else { 0 };
    if score <= FILE_COMPLEXITY_LOW_MAX {
        FileComplexity::Low
    } else if score <= FILE_COMPLEXITY_MEDIUM_MAX {
        FileComplexity::Medium
    } else {
        FileComplexity::High
    }
}

/// Complexity of migrating one usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationComplexity {
    /// No issues and few props.
    Simple,
    /// A couple of issues or a moderate prop count.
    Medium,
    /// Everything else.
    Complex,
}

impl std::fmt::Display for MigrationComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Medium => write!(f, "medium"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

/// Classifies a usage by issue and prop count.
#[must_use]
pub fn migration_complexity(issues: usize, props: usize) -> MigrationComplexity {
    if issues <= MIGRATION_SIMPLE_MAX_ISSUES && props <= MIGRATION_SIMPLE_MAX_PROPS {
        MigrationComplexity::Simple
    } else if issues <= MIGRATION_MEDIUM_MAX_ISSUES && props <= MIGRATION_MEDIUM_MAX_PROPS {
        MigrationComplexity::Medium
    } else {
        MigrationComplexity::Complex
    }
}

/// Priority of a pattern or recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to have.
    Low,
    /// Worth doing.
    Medium,
    /// Do first.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Priority of a detected pattern with the given frequency.
#[must_use]
pub fn pattern_priority(frequency: usize) -> Priority {
    if frequency >= HIGH_PRIORITY_MIN_FREQUENCY {
        Priority::High
    } else {
        Priority::Medium
    }
}
