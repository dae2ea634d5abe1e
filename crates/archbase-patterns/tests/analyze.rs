use archbase_core::thresholds::Priority;
use archbase_patterns::{export, PatternAnalyzer, PatternKind, ValidationLibrary};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const YUP_FORM: &str = r#"import * as yup from 'yup';
import { ArchbaseFormTemplate, ArchbaseEdit, ArchbaseCheckbox } from '@archbase/react';

const schema = yup.object({ name: yup.string().required(), email: yup.string().email() });

export const CustomerForm = () => (
  <ArchbaseFormTemplate dataSource={ds} validationSchema={schema}>
    <ArchbaseEdit dataSource={ds} dataField="name" />
    <ArchbaseCheckbox dataSource={ds} dataField="active" />
  </ArchbaseFormTemplate>
);
"#;

const PLAIN_FORM: &str = r#"import { ArchbaseFormTemplate, ArchbaseEdit } from '@archbase/react';

export const NoteForm = () => (
  <ArchbaseFormTemplate dataSource={ds}>
    <ArchbaseEdit dataSource={ds} dataField="title" />
  </ArchbaseFormTemplate>
);
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/forms/CustomerForm.tsx", YUP_FORM);
    write(dir.path(), "src/forms/SupplierForm.tsx", YUP_FORM);
    write(dir.path(), "src/forms/NoteForm.tsx", PLAIN_FORM);
    dir
}

#[test]
fn yup_forms_group_into_one_pattern() {
    let dir = project();
    let result = PatternAnalyzer::new(dir.path()).analyze_project().unwrap();

    assert_eq!(result.files_analyzed, 3);
    let yup: Vec<_> = result
        .form_patterns
        .iter()
        .filter(|f| f.validation_library == ValidationLibrary::Yup)
        .collect();
    assert_eq!(yup.len(), 1);
    assert_eq!(yup[0].frequency, 2);
    assert_eq!(yup[0].layout, "vertical");

    let forms: Vec<_> = result
        .patterns
        .iter()
        .filter(|p| p.kind == PatternKind::Form)
        .collect();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].frequency, 2);
    assert_eq!(forms[0].priority, Priority::Medium);
    assert_eq!(forms[0].examples.len(), 1);
}

#[test]
fn unvalidated_form_triggers_upgrade() {
    let dir = project();
    let result = PatternAnalyzer::new(dir.path()).analyze_project().unwrap();

    assert_eq!(result.forms_with(ValidationLibrary::None), 1);
    let rec = result.recommendation("validation-upgrade").unwrap();
    assert_eq!(rec.priority, Priority::Medium);
    assert!(result.recommendation("validation-flexibility").is_none());

    let yup = &result.validation_patterns[0];
    assert_eq!(yup.library, ValidationLibrary::Yup);
    assert_eq!(yup.frequency, 2);
    assert!(yup.rules.contains("required"));
    assert!(yup.rules.contains("email"));
}

#[test]
fn test_and_declaration_files_are_skipped() {
    let dir = project();
    write(dir.path(), "src/forms/CustomerForm.test.tsx", YUP_FORM);
    write(dir.path(), "src/types.d.ts", "declare const x: number;\n");
    write(dir.path(), "src/Broken.tsx", "export const = (;\n");

    let result = PatternAnalyzer::new(dir.path()).analyze_project().unwrap();
    assert_eq!(result.files_analyzed, 3);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].file, PathBuf::from("src/Broken.tsx"));
}

#[test]
fn missing_root_fails_fast() {
    let dir = TempDir::new().unwrap();
    assert!(PatternAnalyzer::new(dir.path().join("nope"))
        .analyze_project()
        .is_err());
}

#[test]
fn export_writes_camel_case_json() {
    let dir = project();
    let result = PatternAnalyzer::new(dir.path()).analyze_project().unwrap();
    let out = dir.path().join("analysis.json");
    export(&result, &out).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    assert_eq!(json["schemaVersion"], 1);
    assert_eq!(json["formPatterns"][0]["validationLibrary"], "yup");
    assert!(json["recommendations"].is_array());
}
