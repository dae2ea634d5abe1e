//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# archbase configuration

[scanner]
# Glob patterns a file must match, relative to the project root
include = ["**/*.tsx", "**/*.ts", "**/*.jsx", "**/*.js"]

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/.git/**",
    "**/coverage/**",
]

# Descend into subdirectories
deep = true

# Respect .gitignore files
respect_gitignore = true

[migration]
# Write <file>.backup before overwriting a migrated file
backup = true

# What to do with a file when one rule fails:
#   "keep-applied"  keep edits from the rules that succeeded
#   "rollback-file" leave the file untouched
failure_policy = "keep-applied"

# Rule configurations
# Every rule is enabled unless disabled here

[rules.datasource-v1-to-v2]
enabled = true

# [rules.form-validation-upgrade]
# enabled = false

# [rules.event-handler-upgrade]
# enabled = false
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("archbase.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created archbase.toml");
    println!("\nNext steps:");
    println!("  1. Edit archbase.toml to configure discovery and rules");
    println!("  2. Run: archbase scan");
    println!("  3. Run: archbase migrate analyze");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archbase_core::config::FailurePolicy;
    use archbase_core::Config;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert!(config.scanner.deep);
        assert!(config.migration.backup);
        assert_eq!(config.migration.failure_policy, FailurePolicy::KeepApplied);
        assert!(config.is_rule_enabled("datasource-v1-to-v2"));
        assert!(config.is_rule_enabled("event-handler-upgrade"));
    }
}
