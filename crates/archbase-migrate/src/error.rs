//! Migration errors.

use archbase_core::ScanError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors outside of individual rule runs.
///
/// Rule failures never surface here; they are collected in
/// [`crate::MigrationResult::errors`].
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A file could not be read or written.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The project scan could not start.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl MigrationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
