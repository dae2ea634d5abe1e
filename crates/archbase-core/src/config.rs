//! Configuration types for archbase tooling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// File name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "archbase.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// File discovery settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Migration settings.
    #[serde(default)]
    pub migration: MigrationConfig,

    /// Per-rule configurations keyed by rule id.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled. Rules are enabled unless configured otherwise.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        self.rules
            .get(rule_id)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }
}

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Glob patterns a file must match (relative to the root).
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns that remove files from the scan.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Descend into subdirectories.
    #[serde(default = "default_true")]
    pub deep: bool,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            deep: true,
            respect_gitignore: true,
        }
    }
}

/// Default include globs: component source extensions.
#[must_use]
pub fn default_include() -> Vec<String> {
    ["**/*.tsx", "**/*.ts", "**/*.jsx", "**/*.js"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Default exclude globs: dependency installs and build output.
#[must_use]
pub fn default_exclude() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/dist/**",
        "**/build/**",
        "**/.git/**",
        "**/coverage/**",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_true() -> bool {
    true
}

/// What a migration run does when one rule fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep edits from rules that succeeded.
    #[default]
    KeepApplied,
    /// Discard the whole file's edits.
    RollbackFile,
}

/// Migration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Write `<file>.backup` before overwriting.
    #[serde(default = "default_true")]
    pub backup: bool,

    /// Behavior when a rule fails.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            backup: true,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.scanner.deep);
        assert_eq!(config.scanner.include, default_include());
        assert!(config.migration.backup);
        assert_eq!(config.migration.failure_policy, FailurePolicy::KeepApplied);
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::parse(
            r#"
[scanner]
include = ["src/**/*.tsx"]
exclude = ["**/legacy/**"]
deep = false

[migration]
backup = false
failure_policy = "rollback-file"

[rules.event-handler-upgrade]
enabled = false
"#,
        )
        .unwrap();

        assert_eq!(config.scanner.include, vec!["src/**/*.tsx"]);
        assert_eq!(config.scanner.exclude, vec!["**/legacy/**"]);
        assert!(!config.scanner.deep);
        assert!(config.scanner.respect_gitignore);
        assert!(!config.migration.backup);
        assert_eq!(config.migration.failure_policy, FailurePolicy::RollbackFile);
        assert!(!config.is_rule_enabled("event-handler-upgrade"));
        assert!(config.is_rule_enabled("datasource-v1-to-v2"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::parse("[scanner\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_file(std::path::Path::new("/nonexistent/archbase.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
