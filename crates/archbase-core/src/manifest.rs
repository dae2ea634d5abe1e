//! `package.json` dependency report.

use crate::catalog;
use crate::types::DependencyReport;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Manifest file name looked up in the scan root.
pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

/// Builds the dependency report for a project root.
///
/// A missing manifest yields an empty report. A malformed one is recorded in
/// [`DependencyReport::manifest_error`].
#[must_use]
pub fn read_dependencies(root: &Path) -> DependencyReport {
    let path = root.join(MANIFEST_FILE);
    if !path.is_file() {
        debug!("No {MANIFEST_FILE} in {}", root.display());
        return DependencyReport::default();
    }

    let manifest = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| {
            serde_json::from_str::<PackageManifest>(&content).map_err(|e| e.to_string())
        });

    match manifest {
        Ok(manifest) => dependency_report(&manifest),
        Err(message) => {
            warn!("Could not read {}: {message}", path.display());
            DependencyReport {
                manifest_error: Some(message),
                ..DependencyReport::default()
            }
        }
    }
}

/// Builds the report from manifest text.
///
/// # Errors
///
/// Returns an error if the text is not a valid manifest.
pub fn parse_dependencies(content: &str) -> Result<DependencyReport, serde_json::Error> {
    let manifest: PackageManifest = serde_json::from_str(content)?;
    Ok(dependency_report(&manifest))
}

fn dependency_report(manifest: &PackageManifest) -> DependencyReport {
    let version = |name: &str| {
        manifest
            .dependencies
            .get(name)
            .or_else(|| manifest.dev_dependencies.get(name))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    };
    let declared = |name: &str| {
        manifest.dependencies.contains_key(name) || manifest.dev_dependencies.contains_key(name)
    };

    DependencyReport {
        archbase_version: version(catalog::LIBRARY_MODULE),
        react_version: version("react"),
        missing_dependencies: catalog::RECOMMENDED_DEPENDENCIES
            .iter()
            .filter(|&&d| !declared(d))
            .map(|d| (*d).to_owned())
            .collect(),
        outdated_dependencies: Vec::new(),
        manifest_error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reports_versions_and_missing_packages() {
        let report = parse_dependencies(
            r#"{
  "dependencies": { "react": "^18.2.0", "@archbase/react": "2.1.0", "@mantine/core": "7.0.0" },
  "devDependencies": { "@emotion/react": "11.0.0" }
}"#,
        )
        .unwrap();
        assert_eq!(report.react_version.as_deref(), Some("^18.2.0"));
        assert_eq!(report.archbase_version.as_deref(), Some("2.1.0"));
        assert_eq!(report.missing_dependencies, vec!["@mantine/hooks", "react-query"]);
        assert!(report.outdated_dependencies.is_empty());
    }

    #[test]
    fn missing_manifest_is_empty_report() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_dependencies(dir.path()), DependencyReport::default());
    }

    #[test]
    fn malformed_manifest_is_recorded() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        let report = read_dependencies(dir.path());
        assert!(report.manifest_error.is_some());
        assert!(report.missing_dependencies.is_empty());
    }
}
