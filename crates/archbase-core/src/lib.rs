//! # archbase-core
//!
//! Component fact extraction and project scanning for Archbase React code.
//!
//! This crate provides:
//!
//! - [`SourceParser`] for turning TypeScript/JavaScript text into syntax trees
//! - [`ComponentFactExtractor`] for per-usage [`ComponentUsageFact`]s
//! - [`ProjectScanner`] for whole-tree scans and incremental rescans
//! - [`catalog`] and [`thresholds`] with the library knowledge both build on
//!
//! ## Example
//!
//! ```ignore
//! use archbase_core::ProjectScanner;
//!
//! let scanner = ProjectScanner::builder().root("./my-app").build()?;
//! let mut result = scanner.scan();
//! let delta = scanner.rescan_file(&mut result, "src/pages/Form.tsx".as_ref());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod scanner;
mod types;

/// Reductions from usage facts to summaries.
pub mod aggregate;
/// Library knowledge: tracked components, prop rules, factories.
pub mod catalog;
/// Configuration file types.
pub mod config;
/// File discovery.
pub mod discovery;
/// Usage and file-level fact extraction.
pub mod extractor;
/// Import binding resolution.
pub mod imports;
/// `package.json` inspection.
pub mod manifest;
/// Syntax tree front end.
pub mod parser;
/// Pattern predicates over usages.
pub mod predicates;
/// Named numeric thresholds.
pub mod thresholds;

pub use aggregate::{FileOutcome, RescanDelta};
pub use config::{Config, ConfigError};
pub use error::{FileError, ScanError};
pub use extractor::{ComponentAnalysis, ComponentFactExtractor};
pub use parser::{Dialect, ParseOptions, ParsedSource, SourceParser, SyntaxError};
pub use scanner::{scan_project, scan_project_with_config, ProjectScanner, ProjectScannerBuilder};
pub use types::{
    ComponentIssue, ComponentUsageFact, DataSourceVersion, DependencyReport, Effort, IssueKind,
    MigrationSummary, OutdatedDependency, PatternSummary, ProjectScanResult, PropInfo, PropType,
    ScanFailure, ScanStatistics, SCHEMA_VERSION,
};
