//! # archbase-patterns
//!
//! Extracts reusable generation patterns from Archbase React projects.
//!
//! Where [`archbase_core::ProjectScanner`] flags issues, [`PatternAnalyzer`]
//! groups usages by structural similarity: DataSource bindings, form
//! shapes, validation schemas and page layouts. Groups seen often enough
//! become [`DetectedPattern`]s, and a declarative rule list turns the
//! aggregate into [`Recommendation`]s.
//!
//! ## Example
//!
//! ```ignore
//! use archbase_patterns::{export, PatternAnalyzer};
//!
//! let result = PatternAnalyzer::new("./my-app").analyze_project()?;
//! export(&result, "analysis.json".as_ref())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod model;
mod observation;

/// Recommendation rules.
pub mod recommendations;

pub use analyzer::{analyze_project, export, AnalysisError, PatternAnalyzer, PATTERN_EXCLUDES};
pub use model::{
    ComponentUsageStats, DataSourceUsagePattern, DetectedPattern, FormComplexity, FormPattern,
    Navigation, PageStructurePattern, PatternExample, PatternKind, ProjectAnalysisResult,
    PropFrequency, Recommendation, RecommendationKind, ValidationLibrary, ValidationPattern,
};
pub use observation::FORM_TEMPLATE;
pub use recommendations::RecommendationRule;
