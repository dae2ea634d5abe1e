//! # archbase-migrate
//!
//! Rule-based source migrations for Archbase React projects.
//!
//! A [`MigrationRule`] is either an ordered list of attribute renames or a
//! syntax-tree rewriter. [`MigrationEngine`] runs an immutable rule list over
//! a file, threading each successful rule's output into the next, and can
//! drive whole-project and analysis-driven batch runs.
//!
//! ## Example
//!
//! ```ignore
//! use archbase_migrate::{MigrationEngine, MigrationOptions};
//!
//! let engine = MigrationEngine::default();
//! let options = MigrationOptions::new("./my-app").dry_run(true);
//! let summary = engine.migrate_batch(&options)?;
//! println!("{} changes", summary.total_changes);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod rule;
mod text_pattern;
mod types;

/// The DataSource V1 to V2 rewriter.
pub mod datasource_v1_to_v2;
/// The shipped rules.
pub mod registry;

pub use engine::{
    backup_path, BatchSummary, FileMigration, MigrationAnalysis, MigrationEngine, MigrationIssue,
    MigrationOptions,
};
pub use error::MigrationError;
pub use rule::{AstRewriter, MigrationRule, RewriterBox, Transform};
pub use text_pattern::{apply_renames, AttributeRename};
pub use types::{line_column, ChangeKind, MigrationChange, MigrationResult};
