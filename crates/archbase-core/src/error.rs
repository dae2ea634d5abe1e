//! Error types for scanning.

use crate::config::ConfigError;
use crate::parser::SyntaxError;
use crate::types::ScanFailure;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a scan before any file is analyzed.
#[derive(Debug, Error)]
pub enum ScanError {
    /// IO error outside of per-file analysis.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid options, such as a missing root directory.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors confined to a single file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file could not be parsed.
    #[error(transparent)]
    Syntax(#[from] Box<SyntaxError>),
}

impl From<SyntaxError> for FileError {
    fn from(e: SyntaxError) -> Self {
        Self::Syntax(Box::new(e))
    }
}

impl FileError {
    /// Converts the error into a failure record for `file`.
    #[must_use]
    pub fn to_failure(&self, file: &Path) -> ScanFailure {
        match self {
            Self::Read { source, .. } => ScanFailure {
                file: file.to_path_buf(),
                message: source.to_string(),
                line: None,
                column: None,
            },
            Self::Syntax(e) => ScanFailure {
                file: file.to_path_buf(),
                message: e.message.clone(),
                line: Some(e.line),
                column: Some(e.column),
            },
        }
    }
}
