use archbase_core::aggregate;
use archbase_core::{DataSourceVersion, IssueKind, ProjectScanner};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const V1_FORM: &str = r#"import { ArchbaseEdit, ArchbaseDataSource } from '@archbase/react';

const ds = new ArchbaseDataSource('users', { records: [] });

export function UserForm() {
  return <ArchbaseEdit dataSource={ds} dataField="name" label="Name" />;
}
"#;

const V2_FORM: &str = r#"import { ArchbaseEdit, ArchbaseRemoteDataSource } from '@archbase/react';

const ds = new ArchbaseRemoteDataSource({ name: 'users', service });

export function UserForm() {
  return <ArchbaseEdit dataSource={ds} dataField="name" label="Name" />;
}
"#;

const MISSING_FIELD: &str = r#"import { ArchbaseSelect } from '@archbase/react';

export const Picker = () => <ArchbaseSelect dataSource={ds} />;
"#;

const BROKEN: &str = "export const Broken = ( => <div>;\nconst = ;\n";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/forms/UserForm.tsx", V1_FORM);
    write(dir.path(), "src/forms/Picker.tsx", MISSING_FIELD);
    write(dir.path(), "src/Broken.tsx", BROKEN);
    write(dir.path(), "src/styles.css", "body {}");
    write(dir.path(), "node_modules/@archbase/react/index.js", V1_FORM);
    write(
        dir.path(),
        "package.json",
        r#"{ "dependencies": { "react": "18.2.0", "@archbase/react": "2.0.0" } }"#,
    );
    dir
}

fn scanner(root: &Path) -> ProjectScanner {
    ProjectScanner::builder().root(root).build().unwrap()
}

#[test]
fn partial_failure_does_not_abort_scan() {
    let dir = project();
    let result = scanner(dir.path()).scan();

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].file, PathBuf::from("src/Broken.tsx"));
    assert!(result.failures[0].line.is_some());
    assert_eq!(
        result.scanned_files,
        vec![
            PathBuf::from("src/forms/Picker.tsx"),
            PathBuf::from("src/forms/UserForm.tsx"),
        ]
    );
    assert_eq!(result.statistics.files_scanned, 2);
    assert_eq!(result.statistics.files_failed, 1);
    assert_eq!(result.statistics.total_components, 2);
    assert!(result.has_errors());
}

#[test]
fn statistics_match_fact_list() {
    let dir = project();
    let result = scanner(dir.path()).scan();
    assert_eq!(
        result.statistics,
        aggregate::statistics(
            &result.components,
            result.scanned_files.len(),
            result.failures.len()
        )
    );
    assert_eq!(result.statistics.v1_components, 1);
    let picker: Vec<_> = result.components_in(Path::new("src/forms/Picker.tsx")).collect();
    assert_eq!(picker[0].issue_count(IssueKind::Error), 1);
}

#[test]
fn manifest_is_reported() {
    let dir = project();
    let result = scanner(dir.path()).scan();
    assert_eq!(result.dependencies.react_version.as_deref(), Some("18.2.0"));
    assert_eq!(result.dependencies.archbase_version.as_deref(), Some("2.0.0"));
    assert!(result
        .dependencies
        .missing_dependencies
        .contains(&"@mantine/core".to_owned()));
}

#[test]
fn rescan_after_edit_switches_version() {
    let dir = project();
    let scanner = scanner(dir.path());
    let mut result = scanner.scan();
    assert_eq!(result.migration.v1_to_v2_candidates.len(), 2);

    write(dir.path(), "src/forms/UserForm.tsx", V2_FORM);
    let delta = scanner.rescan_file(&mut result, Path::new("src/forms/UserForm.tsx"));

    assert_eq!(delta.new_issues, 0);
    let form: Vec<_> = result
        .components_in(Path::new("src/forms/UserForm.tsx"))
        .collect();
    assert_eq!(form[0].data_source_version, DataSourceVersion::V2);
    assert_eq!(result.statistics.v1_components, 0);
    assert_eq!(result.statistics.v2_components, 1);
    assert_eq!(result.migration.v1_to_v2_candidates.len(), 1);
}

#[test]
fn rescan_is_idempotent_and_matches_full_scan() {
    let dir = project();
    let scanner = scanner(dir.path());
    let mut result = scanner.scan();

    write(dir.path(), "src/Broken.tsx", MISSING_FIELD);
    scanner.rescan_file(&mut result, &dir.path().join("src/Broken.tsx"));
    let once = result.clone();
    scanner.rescan_file(&mut result, Path::new("src/Broken.tsx"));

    assert_eq!(result, once);
    assert_eq!(result, scanner.scan());
    assert!(result.failures.is_empty());
}

#[test]
fn rescan_of_deleted_file_removes_it() {
    let dir = project();
    let scanner = scanner(dir.path());
    let mut result = scanner.scan();

    fs::remove_file(dir.path().join("src/forms/Picker.tsx")).unwrap();
    let delta = scanner.rescan_file(&mut result, Path::new("src/forms/Picker.tsx"));

    assert_eq!(delta.fixed_issues, 1);
    assert_eq!(delta.current_issues, 0);
    assert_eq!(result.statistics.files_scanned, 1);
    assert_eq!(result, scanner.scan());
}
