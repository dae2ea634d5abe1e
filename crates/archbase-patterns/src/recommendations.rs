//! Declarative recommendation rules.
//!
//! Each rule pairs a condition over the aggregated result with a builder.
//! Rules are evaluated independently and emitted in list order.

use crate::model::{ProjectAnalysisResult, Recommendation, RecommendationKind, ValidationLibrary};
use archbase_core::thresholds::{self, Priority};
use archbase_core::DataSourceVersion;

/// A condition and the recommendation it produces.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRule {
    /// Stable identifier, copied into the recommendation.
    pub id: &'static str,
    /// Returns true if the rule fires.
    pub condition: fn(&ProjectAnalysisResult) -> bool,
    /// Builds the recommendation.
    pub build: fn(&ProjectAnalysisResult) -> Recommendation,
}

impl RecommendationRule {
    /// Evaluates the rule.
    #[must_use]
    pub fn evaluate(&self, result: &ProjectAnalysisResult) -> Option<Recommendation> {
        (self.condition)(result).then(|| {
            let mut rec = (self.build)(result);
            rec.id = self.id.to_owned();
            rec
        })
    }
}

fn recommendation(
    kind: RecommendationKind,
    title: &str,
    description: impl Into<String>,
    priority: Priority,
    implementation: impl Into<String>,
) -> Recommendation {
    Recommendation {
        id: String::new(),
        kind,
        title: title.to_owned(),
        description: description.into(),
        priority,
        implementation: implementation.into(),
    }
}

fn only_v1(r: &ProjectAnalysisResult) -> bool {
    r.uses_data_source(DataSourceVersion::V1)
        && !r.uses_data_source(DataSourceVersion::V2)
        && !r.uses_data_source(DataSourceVersion::Mixed)
}

fn high_frequency_patterns(r: &ProjectAnalysisResult) -> usize {
    r.patterns
        .iter()
        .filter(|p| p.priority == Priority::High)
        .count()
}

fn has_library(r: &ProjectAnalysisResult, library: ValidationLibrary) -> bool {
    r.validation_patterns.iter().any(|v| v.library == library)
}

fn unvalidated_forms(r: &ProjectAnalysisResult) -> usize {
    r.forms_with(ValidationLibrary::None)
}

fn mixed_versions(r: &ProjectAnalysisResult) -> bool {
    r.uses_data_source(DataSourceVersion::Mixed)
        || (r.uses_data_source(DataSourceVersion::V1) && r.uses_data_source(DataSourceVersion::V2))
}

/// The shipped rules in emission order.
pub const RULES: &[RecommendationRule] = &[
    RecommendationRule {
        id: "datasource-v2-support",
        condition: only_v1,
        build: |_| {
            recommendation(
                RecommendationKind::Parameter,
                "Add DataSource V2 support",
                "The project only uses DataSource V1. Consider migrating to V2 for better performance.",
                Priority::Medium,
                "Add a --datasource-version=v2 parameter to the generators",
            )
        },
    },
    RecommendationRule {
        id: "dedicated-templates",
        condition: |r| high_frequency_patterns(r) > 0,
        build: |r| {
            recommendation(
                RecommendationKind::Template,
                "Create dedicated templates",
                format!(
                    "Found {} frequent patterns that deserve dedicated templates.",
                    high_frequency_patterns(r)
                ),
                Priority::High,
                "Create specific templates for the most used patterns",
            )
        },
    },
    RecommendationRule {
        id: "validation-flexibility",
        condition: |r| has_library(r, ValidationLibrary::Yup) && has_library(r, ValidationLibrary::Zod),
        build: |_| {
            recommendation(
                RecommendationKind::Parameter,
                "Make the validation library configurable",
                "The project uses both Yup and Zod. Add a parameter to choose between them.",
                Priority::Medium,
                "Add a --validation=yup|zod parameter to the form generators",
            )
        },
    },
    RecommendationRule {
        id: "validation-upgrade",
        condition: |r| unvalidated_forms(r) > 0,
        build: |r| {
            let count = unvalidated_forms(r);
            let priority = if count >= thresholds::VALIDATION_UPGRADE_HIGH_MIN_FORMS {
                Priority::High
            } else {
                Priority::Medium
            };
            recommendation(
                RecommendationKind::Pattern,
                "Add validation to forms",
                format!("{count} form(s) have no validation schema."),
                priority,
                "Attach a yup or zod schema to every ArchbaseFormTemplate",
            )
        },
    },
    RecommendationRule {
        id: "datasource-consolidation",
        condition: mixed_versions,
        build: |_| {
            recommendation(
                RecommendationKind::Optimization,
                "Consolidate DataSource versions",
                "DataSource V1 and V2 are used side by side.",
                Priority::Low,
                "Run `archbase migrate v1-to-v2` to move the remaining V1 usages",
            )
        },
    },
];

/// Evaluates `rules` against `result` in order.
#[must_use]
pub fn evaluate(rules: &[RecommendationRule], result: &ProjectAnalysisResult) -> Vec<Recommendation> {
    rules.iter().filter_map(|r| r.evaluate(result)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataSourceUsagePattern, FormComplexity, FormPattern, ValidationPattern};
    use archbase_core::SCHEMA_VERSION;

    fn empty() -> ProjectAnalysisResult {
        ProjectAnalysisResult {
            schema_version: SCHEMA_VERSION,
            files_analyzed: 0,
            failures: Vec::new(),
            patterns: Vec::new(),
            data_source_usage: Vec::new(),
            form_patterns: Vec::new(),
            component_usage: Vec::new(),
            validation_patterns: Vec::new(),
            page_structures: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    fn ds(version: DataSourceVersion) -> DataSourceUsagePattern {
        DataSourceUsagePattern {
            component: "ArchbaseEdit".into(),
            version,
            usage_count: 1,
            common_props: Default::default(),
            patterns: Default::default(),
            files: Vec::new(),
        }
    }

    fn forms(library: ValidationLibrary, frequency: usize) -> FormPattern {
        FormPattern {
            field_types: Default::default(),
            validation_library: library,
            layout: "vertical".into(),
            common_features: Default::default(),
            complexity: FormComplexity::Low,
            frequency,
            files: Vec::new(),
        }
    }

    fn ids(r: &ProjectAnalysisResult) -> Vec<String> {
        evaluate(RULES, r).into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn nothing_fires_on_empty_project() {
        assert!(evaluate(RULES, &empty()).is_empty());
    }

    #[test]
    fn v1_only_project() {
        let mut r = empty();
        r.data_source_usage.push(ds(DataSourceVersion::V1));
        assert_eq!(ids(&r), vec!["datasource-v2-support"]);
    }

    #[test]
    fn emission_follows_list_order() {
        let mut r = empty();
        r.data_source_usage.push(ds(DataSourceVersion::V1));
        r.data_source_usage.push(ds(DataSourceVersion::V2));
        r.form_patterns.push(forms(ValidationLibrary::None, 1));
        for library in [ValidationLibrary::Zod, ValidationLibrary::Yup] {
            r.validation_patterns.push(ValidationPattern {
                library,
                rules: Default::default(),
                frequency: 1,
                examples: Vec::new(),
            });
        }
        assert_eq!(
            ids(&r),
            vec!["validation-flexibility", "validation-upgrade", "datasource-consolidation"]
        );
    }

    #[test]
    fn validation_upgrade_priority_band() {
        let mut r = empty();
        r.form_patterns.push(forms(ValidationLibrary::None, 4));
        r.form_patterns.push(forms(ValidationLibrary::Yup, 9));
        let rec = &evaluate(RULES, &r)[0];
        assert_eq!(rec.priority, Priority::Medium);
        assert_eq!(rec.description, "4 form(s) have no validation schema.");

        r.form_patterns.push(forms(ValidationLibrary::None, 1));
        assert_eq!(evaluate(RULES, &r)[0].priority, Priority::High);
    }
}
