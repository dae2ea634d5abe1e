//! Subcommand implementations.

pub mod analyze;
pub mod init;
pub mod list_rules;
pub mod migrate;
pub mod output;
pub mod scan;
