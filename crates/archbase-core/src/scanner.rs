//! Project scanning: discovery, per-file extraction and aggregation.

use crate::aggregate::{FileOutcome, RescanDelta};
use crate::config::{self, Config};
use crate::discovery::{FileDiscovery, GlobList};
use crate::error::{FileError, ScanError};
use crate::extractor::ComponentFactExtractor;
use crate::manifest;
use crate::parser::{ParseOptions, SourceParser};
use crate::types::{ComponentUsageFact, ProjectScanResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builder for a [`ProjectScanner`].
#[derive(Debug, Default)]
pub struct ProjectScannerBuilder {
    root: Option<PathBuf>,
    include: Vec<String>,
    exclude: Vec<String>,
    deep: Option<bool>,
    respect_gitignore: Option<bool>,
    config: Option<Config>,
    extractor: Option<ComponentFactExtractor>,
}

impl ProjectScannerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory to scan.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Adds multiple include glob patterns.
    #[must_use]
    pub fn includes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Walks subdirectories when `true` (default).
    #[must_use]
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = Some(deep);
        self
    }

    /// Honors `.gitignore` files when `true` (default).
    #[must_use]
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = Some(respect);
        self
    }

    /// Takes scanner defaults from a configuration.
    #[must_use]
    pub fn config(mut self, config: &Config) -> Self {
        self.config = Some(config.clone());
        self
    }

    /// Replaces the fact extractor.
    #[must_use]
    pub fn extractor(mut self, extractor: ComponentFactExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Builds the scanner.
    ///
    /// Explicit patterns replace the configured ones; the configured ones
    /// replace the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not an existing directory or a glob
    /// pattern is invalid.
    pub fn build(self) -> Result<ProjectScanner, ScanError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        if !root.is_dir() {
            return Err(ScanError::Configuration(format!(
                "root is not a directory: {}",
                root.display()
            )));
        }

        let scanner_config = self.config.map(|c| c.scanner).unwrap_or_default();
        let include = if self.include.is_empty() {
            scanner_config.include
        } else {
            self.include
        };
        let exclude = if self.exclude.is_empty() {
            scanner_config.exclude
        } else {
            self.exclude
        };

        let discovery = FileDiscovery::new(root, GlobList::new(&include)?, GlobList::new(&exclude)?)
            .deep(self.deep.unwrap_or(scanner_config.deep))
            .respect_gitignore(
                self.respect_gitignore
                    .unwrap_or(scanner_config.respect_gitignore),
            );

        Ok(ProjectScanner {
            discovery,
            parser: SourceParser::new(),
            extractor: self.extractor.unwrap_or_default(),
        })
    }
}

/// Scans a project tree for Archbase component usages.
///
/// Use [`ProjectScanner::builder()`] to construct an instance.
#[derive(Debug)]
pub struct ProjectScanner {
    discovery: FileDiscovery,
    parser: SourceParser,
    extractor: ComponentFactExtractor,
}

impl ProjectScanner {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> ProjectScannerBuilder {
        ProjectScannerBuilder::new()
    }

    /// Absolute scan root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.discovery.root()
    }

    /// Root-relative paths of the files a scan would analyze.
    #[must_use]
    pub fn discover(&self) -> Vec<PathBuf> {
        self.discovery.discover()
    }

    /// Reads, parses and extracts one root-relative file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn analyze_file(&self, relative: &Path) -> Result<Vec<ComponentUsageFact>, FileError> {
        let path = self.root().join(relative);
        let source = std::fs::read_to_string(&path).map_err(|source| FileError::Read {
            path: path.clone(),
            source,
        })?;
        let parsed = self
            .parser
            .parse(&source, relative, ParseOptions::component())?;
        Ok(self.extractor.extract_usages(&parsed))
    }

    fn outcome(&self, relative: &Path) -> FileOutcome {
        match self.analyze_file(relative) {
            Ok(facts) => {
                debug!("{}: {} usages", relative.display(), facts.len());
                FileOutcome::Analyzed(facts)
            }
            Err(e) => {
                warn!("Failed to analyze {}: {e}", relative.display());
                FileOutcome::Failed(e.to_failure(relative))
            }
        }
    }

    /// Scans every discovered file.
    ///
    /// Per-file failures are recorded in the result and never abort the scan.
    #[must_use]
    pub fn scan(&self) -> ProjectScanResult {
        info!("Scanning {}", self.root().display());
        let files = self.discover();
        info!("Found {} files to scan", files.len());

        let mut components = Vec::new();
        let mut scanned = Vec::new();
        let mut failures = Vec::new();
        for file in files {
            match self.outcome(&file) {
                FileOutcome::Analyzed(facts) => {
                    components.extend(facts);
                    scanned.push(file);
                }
                FileOutcome::Failed(failure) => failures.push(failure),
                FileOutcome::Removed => {}
            }
        }

        let result = ProjectScanResult::from_parts(
            self.root().to_path_buf(),
            components,
            scanned,
            failures,
            manifest::read_dependencies(self.root()),
        );
        info!(
            "Scan complete: {} usages in {} files ({} failed, {} issues)",
            result.statistics.total_components,
            result.statistics.files_scanned,
            result.statistics.files_failed,
            result.statistics.issues_found
        );
        result
    }

    /// Re-analyzes one file and folds the outcome into `result`.
    ///
    /// `path` may be absolute (under the root) or root-relative. A file that
    /// no longer exists or no longer matches the filters is removed.
    pub fn rescan_file(&self, result: &mut ProjectScanResult, path: &Path) -> RescanDelta {
        let relative = path.strip_prefix(self.root()).unwrap_or(path).to_path_buf();
        let outcome = if self.root().join(&relative).is_file() && self.discovery.accepts(&relative) {
            self.outcome(&relative)
        } else {
            debug!("Dropping {} from scan result", relative.display());
            FileOutcome::Removed
        };
        let delta = result.replace_file(&relative, outcome);
        info!(
            "Rescanned {}: {} new, {} fixed issues",
            relative.display(),
            delta.new_issues,
            delta.fixed_issues
        );
        delta
    }
}

/// Scans `root` with configuration defaults.
///
/// # Errors
///
/// Returns an error if the root is not an existing directory.
pub fn scan_project(root: impl Into<PathBuf>) -> Result<ProjectScanResult, ScanError> {
    Ok(ProjectScanner::builder()
        .root(root)
        .config(&Config::default())
        .build()?
        .scan())
}

/// Scans `root` using `archbase.toml` from the root when present.
///
/// # Errors
///
/// Returns an error if the root is missing or the configuration file is
/// invalid.
pub fn scan_project_with_config(root: impl Into<PathBuf>) -> Result<ProjectScanResult, ScanError> {
    let root = root.into();
    let config_path = root.join(config::CONFIG_FILE_NAME);
    let config = if config_path.is_file() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };
    Ok(ProjectScanner::builder()
        .root(root)
        .config(&config)
        .build()?
        .scan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_root_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let err = ProjectScanner::builder()
            .root(dir.path().join("absent"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ScanError::Configuration(_)));
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = ProjectScanner::builder()
            .root(dir.path())
            .include("src/[")
            .build()
            .unwrap_err();
        assert!(matches!(err, ScanError::Glob(_)));
    }

    #[test]
    fn explicit_patterns_override_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.tsx"), "").unwrap();
        std::fs::write(dir.path().join("b.ts"), "").unwrap();
        let scanner = ProjectScanner::builder()
            .root(dir.path())
            .include("**/*.tsx")
            .build()
            .unwrap();
        assert_eq!(scanner.discover(), vec![PathBuf::from("a.tsx")]);
    }

    #[test]
    fn config_file_is_applied() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(config::CONFIG_FILE_NAME),
            "[scanner]\ninclude = [\"**/*.jsx\"]\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Form.jsx"),
            "import { ArchbaseEdit } from '@archbase/react';\nconst F = () => <ArchbaseEdit />;\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Other.tsx"),
            "import { ArchbaseEdit } from '@archbase/react';\nconst F = () => <ArchbaseEdit />;\n",
        )
        .unwrap();
        let result = scan_project_with_config(dir.path()).unwrap();
        assert_eq!(result.scanned_files, vec![PathBuf::from("Form.jsx")]);
    }
}
