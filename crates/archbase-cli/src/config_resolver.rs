//! Locates `archbase.toml` for a command.
//!
//! The first hit wins: the `--config` path, then `archbase.toml` or
//! `.archbase.toml` in the scanned project, then `config.toml` under the
//! user config dir (`$ARCHBASE_CONFIG_DIR` or `~/.archbase`). With none of
//! these the built-in defaults apply.

use anyhow::{Context, Result};
use archbase_core::Config;
use std::path::{Path, PathBuf};

const PROJECT_CONFIG_NAMES: &[&str] = &["archbase.toml", ".archbase.toml"];
const USER_CONFIG_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    Explicit(PathBuf),
    Project(PathBuf),
    User(PathBuf),
    Defaults,
}

impl ConfigSource {
    fn locate(project_dir: &Path, explicit: Option<&Path>, user_dir: Option<&Path>) -> Self {
        if let Some(p) = explicit {
            return Self::Explicit(p.to_path_buf());
        }
        if let Some(found) = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|p| p.is_file())
        {
            return Self::Project(found);
        }
        user_dir
            .map(|dir| dir.join(USER_CONFIG_NAME))
            .filter(|p| p.is_file())
            .map_or(Self::Defaults, Self::User)
    }

    fn read(&self) -> Result<Config> {
        let path = match self {
            Self::Explicit(p) | Self::Project(p) => p,
            Self::User(p) => {
                tracing::info!("Using user config: {}", p.display());
                p
            }
            Self::Defaults => {
                tracing::debug!("No archbase.toml found, using defaults");
                return Ok(Config::default());
            }
        };
        tracing::debug!("Reading config from {}", path.display());
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os("ARCHBASE_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".archbase")))
}

/// Loads the config that applies to `project_dir`.
///
/// # Errors
///
/// Fails when the located file cannot be read or parsed.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    ConfigSource::locate(project_dir, explicit, user_config_dir().as_deref()).read()
}
