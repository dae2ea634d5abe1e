//! DataSource V1 to V2 syntax-tree rewrite.

use crate::rule::AstRewriter;
use crate::types::{ChangeKind, MigrationChange, MigrationResult};
use archbase_core::catalog;
use archbase_core::imports::ImportMap;
use archbase_core::parser::ParsedSource;
use archbase_core::{ParseOptions, SourceParser};
use std::path::Path;
use tree_sitter::Node;

/// V1 factory names and their V2 replacements.
pub const RENAMES: &[(&str, &str)] = &[
    ("ArchbaseDataSource", "ArchbaseRemoteDataSource"),
    ("useArchbaseDataSource", "useArchbaseRemoteDataSource"),
];

const FORCE_UPDATE: &str = "forceUpdate";
const SET_FIELD_VALUE: &str = "setFieldValue";
const FORCE_UPDATE_CALL_REMOVED: &str = "Removed forceUpdate() call (automatic in V2)";

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
    change: MigrationChange,
}

fn renamed(name: &str) -> Option<&'static str> {
    RENAMES.iter().find(|(old, _)| *old == name).map(|(_, new)| *new)
}

/// Renames V1 factories, drops `forceUpdate` and flags `setFieldValue`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataSourceV1ToV2;

impl AstRewriter for DataSourceV1ToV2 {
    fn rewrite(&self, source: &str, path: &Path) -> MigrationResult {
        let parsed = match SourceParser::new().parse(source, path, ParseOptions::component()) {
            Ok(parsed) => parsed,
            Err(e) => return MigrationResult::failure(format!("Failed to parse file: {e}")),
        };
        let mut rewrite = Rewrite {
            parsed: &parsed,
            imports: ImportMap::collect(&parsed),
            edits: Vec::new(),
            warnings: Vec::new(),
        };
        rewrite.imports_and_references();
        rewrite.force_update_attributes();
        rewrite.method_calls();
        let (code, changes) = apply_edits(source, rewrite.edits);
        MigrationResult::success(code, changes, rewrite.warnings)
    }
}

struct Rewrite<'p> {
    parsed: &'p ParsedSource,
    imports: ImportMap,
    edits: Vec<Edit>,
    warnings: Vec<String>,
}

impl Rewrite<'_> {
    fn position(node: Node<'_>) -> (usize, usize) {
        let p = node.start_position();
        (p.row + 1, p.column)
    }

    fn replace(&mut self, node: Node<'_>, text: &str, description: String) {
        let (line, column) = Self::position(node);
        let before = self.parsed.text(node).to_owned();
        self.edits.push(Edit {
            start: node.start_byte(),
            end: node.end_byte(),
            text: text.to_owned(),
            change: MigrationChange::new(ChangeKind::Replace, description)
                .at(line, column)
                .with_text(before, text),
        });
    }

    fn edit_for_remove(&self, start: usize, end: usize, node: Node<'_>, description: &str) -> Edit {
        let (line, column) = Self::position(node);
        let mut change = MigrationChange::new(ChangeKind::Remove, description).at(line, column);
        change.before = Some(self.parsed.text(node).to_owned());
        Edit {
            start,
            end,
            text: String::new(),
            change,
        }
    }

    fn remove(&mut self, start: usize, end: usize, node: Node<'_>, description: &str) {
        let edit = self.edit_for_remove(start, end, node, description);
        self.edits.push(edit);
    }

    fn already_imported(&self, name: &str) -> bool {
        self.imports
            .bindings()
            .iter()
            .any(|b| b.is_archbase() && b.exported_name() == name)
    }

    fn imports_and_references(&mut self) {
        let parsed = self.parsed;
        let mut renamed_locals = Vec::new();

        for spec in parsed.nodes_of_kind("import_specifier") {
            let Some(statement) = archbase_core::parser::ancestor(spec, |n| n.kind() == "import_statement") else {
                continue;
            };
            let from_archbase = statement
                .child_by_field_name("source")
                .is_some_and(|s| catalog::is_archbase_module(parsed.string_value(s)));
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let old = parsed.text(name);
            let Some(new) = renamed(old).filter(|_| from_archbase) else {
                continue;
            };
            if self.already_imported(new) {
                self.warnings.push(format!(
                    "{new} is already imported at line {}; {old} was left in place",
                    statement.start_position().row + 1
                ));
                continue;
            }
            self.replace(name, new, format!("Updated import from {old} to {new}"));
            if spec.child_by_field_name("alias").is_none() {
                renamed_locals.push((old, new, name.id()));
            }
        }

        for node in parsed.nodes() {
            match node.kind() {
                "identifier" | "type_identifier" => {
                    let text = parsed.text(node);
                    if let Some((old, new, _)) = renamed_locals
                        .iter()
                        .find(|(old, _, id)| *old == text && *id != node.id())
                    {
                        if node.parent().is_some_and(|p| p.kind() == "import_specifier") {
                            continue;
                        }
                        self.replace(node, new, format!("Renamed {old} reference to {new}"));
                    }
                }
                "member_expression" | "nested_type_identifier" => {
                    let (object, property) = if node.kind() == "member_expression" {
                        (node.child_by_field_name("object"), node.child_by_field_name("property"))
                    } else {
                        (node.child_by_field_name("module"), node.child_by_field_name("name"))
                    };
                    let (Some(object), Some(property)) = (object, property) else {
                        continue;
                    };
                    let namespace = self
                        .imports
                        .resolve(parsed.text(object))
                        .is_some_and(|b| b.is_archbase() && b.is_namespace());
                    let old = parsed.text(property);
                    if let Some(new) = renamed(old).filter(|_| namespace) {
                        self.replace(property, new, format!("Renamed {old} reference to {new}"));
                    }
                }
                _ => {}
            }
        }
    }

    fn force_update_attributes(&mut self) {
        let parsed = self.parsed;
        for attr in parsed.nodes_of_kind("jsx_attribute") {
            let mut cursor = attr.walk();
            let name = attr.named_children(&mut cursor).next();
            if !name.is_some_and(|n| parsed.text(n) == FORCE_UPDATE) {
                continue;
            }
            let source = parsed.source().as_bytes();
            let mut start = attr.start_byte();
            while start > 0 && source[start - 1].is_ascii_whitespace() {
                start -= 1;
            }
            self.remove(
                start,
                attr.end_byte(),
                attr,
                "Removed forceUpdate prop (no longer needed in V2)",
            );
        }
    }

    fn method_calls(&mut self) {
        let parsed = self.parsed;
        for call in parsed.nodes_of_kind("call_expression") {
            let Some(callee) = call.child_by_field_name("function") else {
                continue;
            };
            if callee.kind() != "member_expression" {
                continue;
            }
            let (Some(object), Some(property)) = (
                callee.child_by_field_name("object"),
                callee.child_by_field_name("property"),
            ) else {
                continue;
            };
            let line = call.start_position().row + 1;
            match parsed.text(property) {
                FORCE_UPDATE if object.kind() == "this" => {}
                FORCE_UPDATE => match call.parent().filter(|p| p.kind() == "expression_statement") {
                    Some(statement) if in_statement_list(statement) => {
                        let (start, end) = line_span(parsed.source(), statement);
                        self.remove(start, end, statement, FORCE_UPDATE_CALL_REMOVED);
                    }
                    // Sole body of an `if`/`else`/loop: keep a statement in its place.
                    Some(statement) => {
                        let mut edit = self.edit_for_remove(
                            statement.start_byte(),
                            statement.end_byte(),
                            statement,
                            FORCE_UPDATE_CALL_REMOVED,
                        );
                        edit.text = "{}".to_owned();
                        edit.change.after = Some("{}".to_owned());
                        self.edits.push(edit);
                    }
                    None => self.warnings.push(format!(
                        "forceUpdate() at line {line} is used as a value and was not removed"
                    )),
                },
                SET_FIELD_VALUE => self.warnings.push(format!(
                    "setFieldValue call at line {line} should be reviewed for V2 reactive patterns"
                )),
                _ => {}
            }
        }
    }
}

/// Returns true if `statement` sits in a list of statements and can be dropped.
fn in_statement_list(statement: Node<'_>) -> bool {
    statement
        .parent()
        .is_some_and(|p| matches!(p.kind(), "program" | "statement_block" | "switch_case" | "switch_default"))
}

/// Byte span of `node`, widened to whole lines when nothing else shares them.
fn line_span(source: &str, node: Node<'_>) -> (usize, usize) {
    let (start, end) = (node.start_byte(), node.end_byte());
    let bytes = source.as_bytes();
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[end..].find('\n').map_or(source.len(), |i| end + i + 1);
    let blank_before = bytes[line_start..start].iter().all(|b| *b == b' ' || *b == b'\t');
    let blank_after = source[end..line_end].trim().is_empty();
    if blank_before && blank_after {
        (line_start, line_end)
    } else {
        (start, end)
    }
}

/// Applies non-overlapping edits back to front.
///
/// Edits nested inside an earlier edit's span are dropped.
fn apply_edits(source: &str, mut edits: Vec<Edit>) -> (String, Vec<MigrationChange>) {
    edits.sort_by_key(|e| (e.start, std::cmp::Reverse(e.end)));
    let mut kept: Vec<Edit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if kept.last().is_some_and(|k| edit.start < k.end) {
            continue;
        }
        kept.push(edit);
    }

    let mut code = source.to_owned();
    for edit in kept.iter().rev() {
        code.replace_range(edit.start..edit.end, &edit.text);
    }
    (code, kept.into_iter().map(|e| e.change).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(src: &str) -> MigrationResult {
        DataSourceV1ToV2.rewrite(src, Path::new("src/UserForm.tsx"))
    }

    const WITH_FORCE_UPDATE: &str = r#"import { ArchbaseEdit, ArchbaseDataSource } from '@archbase/react';

const ds = new ArchbaseDataSource('users', { records: [] });

export function UserForm() {
  ds.forceUpdate();
  return <ArchbaseEdit dataSource={ds} dataField="name" />;
}
"#;

    #[test]
    fn removes_force_update_statement() {
        let result = rewrite(WITH_FORCE_UPDATE);
        assert!(result.success);
        let code = result.code.unwrap();
        assert!(!code.contains("forceUpdate"));
        assert!(code.contains("import { ArchbaseEdit, ArchbaseRemoteDataSource } from '@archbase/react';"));
        assert!(code.contains("new ArchbaseRemoteDataSource('users'"));
        assert!(code.contains("export function UserForm() {\n  return <ArchbaseEdit"));

        let removals: Vec<_> = result
            .changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Remove)
            .collect();
        assert_eq!(removals.len(), 1);
        assert!(removals[0].description.contains("forceUpdate"));
        assert_eq!(removals[0].line, Some(6));
    }

    #[test]
    fn second_pass_has_no_changes() {
        let first = rewrite(WITH_FORCE_UPDATE);
        let second = rewrite(first.code.as_deref().unwrap());
        assert!(second.success);
        assert!(second.changes.is_empty());
        assert_eq!(second.code, first.code);
    }

    #[test]
    fn aliased_import_keeps_local_name() {
        let result = rewrite(
            "import { ArchbaseDataSource as DS } from '@archbase/react';\nconst ds = new DS('x');\n",
        );
        assert_eq!(
            result.code.as_deref(),
            Some("import { ArchbaseRemoteDataSource as DS } from '@archbase/react';\nconst ds = new DS('x');\n")
        );
        assert_eq!(result.changes.len(), 1);
    }

    #[test]
    fn other_modules_are_untouched() {
        let src = "import { ArchbaseDataSource } from './local';\nconst ds = new ArchbaseDataSource();\n";
        let result = rewrite(src);
        assert_eq!(result.code.as_deref(), Some(src));
        assert!(result.changes.is_empty());
    }

    #[test]
    fn removes_force_update_attribute() {
        let result = rewrite(
            "import { ArchbaseEdit } from '@archbase/react';\nconst x = <ArchbaseEdit dataSource={ds} forceUpdate />;\n",
        );
        assert_eq!(
            result.code.as_deref(),
            Some("import { ArchbaseEdit } from '@archbase/react';\nconst x = <ArchbaseEdit dataSource={ds} />;\n")
        );
        assert_eq!(result.changes[0].kind, ChangeKind::Remove);
    }

    #[test]
    fn warns_on_expression_use_and_set_field_value() {
        let result = rewrite(
            "const ok = ds.forceUpdate() && true;\nds.setFieldValue('a', 1);\nthis.forceUpdate();\n",
        );
        assert!(result.changes.is_empty());
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("line 1"));
        assert!(result.warnings[1].contains("setFieldValue"));
    }

    #[test]
    fn unbraced_body_keeps_an_empty_block() {
        let src = "function save() {}\nfunction run(ds, ready) {\n  if (ready) ds.forceUpdate();\n  save();\n  for (;;) ds.forceUpdate();\n}\n";
        let result = rewrite(src);
        assert_eq!(
            result.code.as_deref(),
            Some("function save() {}\nfunction run(ds, ready) {\n  if (ready) {}\n  save();\n  for (;;) {}\n}\n")
        );
        assert_eq!(result.changes.len(), 2);
        assert!(result.changes.iter().all(|c| c.kind == ChangeKind::Remove));
        assert_eq!(result.changes[0].line, Some(3));

        let second = rewrite(result.code.as_deref().unwrap());
        assert!(second.changes.is_empty());
    }

    #[test]
    fn else_body_keeps_an_empty_block() {
        let result = rewrite("if (a) go();\nelse ds.forceUpdate();\nsave();\n");
        assert_eq!(result.code.as_deref(), Some("if (a) go();\nelse {}\nsave();\n"));
    }

    #[test]
    fn parse_failure_fails_the_rule() {
        let result = rewrite("const = (;\n");
        assert!(!result.success);
        assert!(result.code.is_none());
        assert_eq!(result.errors.len(), 1);
    }
}
