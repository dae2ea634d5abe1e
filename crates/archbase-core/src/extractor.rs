//! Component fact extraction.
//!
//! Walks one parsed file and turns every tracked JSX call site into a
//! [`ComponentUsageFact`]. Extraction is a pure function of the source text.

use crate::catalog;
use crate::imports::{ImportBinding, ImportMap};
use crate::parser::{self, ParsedSource};
use crate::predicates::{self, PatternPredicate, UsageContext};
use crate::thresholds::{self, FileComplexity};
use crate::types::{ComponentIssue, ComponentUsageFact, DataSourceVersion, IssueKind, PropInfo, PropType};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tree_sitter::Node;

/// Hooks whose initializer may hold a DataSource construction.
const WRAPPING_HOOKS: &[&str] = &["useMemo", "useState", "useRef", "useCallback"];

/// Max depth when unwrapping an initializer expression.
const TRACE_DEPTH: usize = 4;

/// A prop declared in a `*Props` interface or type alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredProp {
    /// Prop name.
    pub name: String,
    /// Type annotation as written, or `unknown`.
    #[serde(rename = "type")]
    pub type_text: String,
    /// `false` when the declaration carries the optional marker.
    pub required: bool,
}

/// File-level DataSource summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceUsage {
    /// Whether the file binds or constructs a DataSource.
    pub has_data_source: bool,
    /// Combined version of all bindings in the file.
    pub version: DataSourceVersion,
    /// Distinct `dataField` values in source order.
    pub fields: Vec<String>,
}

/// Full single-file analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAnalysis {
    /// First component declared in the file.
    pub name: Option<String>,
    /// File path as parsed.
    pub file: PathBuf,
    /// Props declared by `*Props` types.
    pub props: Vec<DeclaredProp>,
    /// Import bindings.
    pub imports: Vec<ImportBinding>,
    /// DataSource summary.
    pub data_source_usage: DataSourceUsage,
    /// File complexity band.
    pub complexity: FileComplexity,
    /// Distinct hooks called anywhere in the file.
    pub hooks: Vec<String>,
    /// Archbase exports the file depends on.
    pub dependencies: Vec<String>,
    /// Tracked call sites.
    pub usages: Vec<ComponentUsageFact>,
}

/// Facts shared by every call site in a file.
struct FileFacts {
    imports: ImportMap,
    uses_v1: bool,
    uses_v2: bool,
    hooks: Vec<String>,
}

impl FileFacts {
    fn collect(parsed: &ParsedSource) -> Self {
        let imports = ImportMap::collect(parsed);
        let mut facts = Self {
            imports,
            uses_v1: false,
            uses_v2: false,
            hooks: Vec::new(),
        };

        for node in parsed.nodes() {
            let callee = match node.kind() {
                "new_expression" => node.child_by_field_name("constructor"),
                "call_expression" => node.child_by_field_name("function"),
                _ => None,
            };
            let Some(callee) = callee else {
                continue;
            };

            match callee_name(parsed, &facts.imports, callee).and_then(factory_version) {
                Some(DataSourceVersion::V1) => facts.uses_v1 = true,
                Some(DataSourceVersion::V2) => facts.uses_v2 = true,
                _ => {}
            }

            if node.kind() == "call_expression" {
                if callee.kind() == "member_expression" {
                    let method = callee
                        .child_by_field_name("property")
                        .map(|p| parsed.text(p));
                    if method.is_some_and(|m| catalog::V2_ONLY_METHODS.contains(&m)) {
                        facts.uses_v2 = true;
                    }
                }
                if let Some(hook) = hook_name(parsed, callee) {
                    if !facts.hooks.iter().any(|h| h == hook) {
                        facts.hooks.push(hook.to_owned());
                    }
                }
            }
        }
        facts
    }

    fn file_version(&self) -> DataSourceVersion {
        match (self.uses_v1, self.uses_v2) {
            (true, true) => DataSourceVersion::Mixed,
            (true, false) => DataSourceVersion::V1,
            (false, true) => DataSourceVersion::V2,
            (false, false) => DataSourceVersion::Unknown,
        }
    }
}

/// Name of a callee, following import aliases.
fn callee_name<'s>(parsed: &'s ParsedSource, imports: &'s ImportMap, callee: Node<'_>) -> Option<&'s str> {
    match callee.kind() {
        "identifier" => Some(imports.canonical(parsed.text(callee))),
        "member_expression" => callee.child_by_field_name("property").map(|p| parsed.text(p)),
        _ => None,
    }
}

fn factory_version(name: &str) -> Option<DataSourceVersion> {
    if catalog::V1_FACTORIES.contains(&name) {
        Some(DataSourceVersion::V1)
    } else if catalog::V2_FACTORIES.contains(&name) {
        Some(DataSourceVersion::V2)
    } else {
        None
    }
}

/// `useXxx` name of a call's callee, if it is a hook.
fn hook_name<'s>(parsed: &'s ParsedSource, callee: Node<'_>) -> Option<&'s str> {
    let name = match callee.kind() {
        "identifier" => parsed.text(callee),
        "member_expression" => parsed.text(callee.child_by_field_name("property")?),
        _ => return None,
    };
    let rest = name.strip_prefix("use")?;
    rest.chars()
        .next()
        .is_some_and(char::is_uppercase)
        .then_some(name)
}

fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor).next();
    first
}

/// Extracts [`ComponentUsageFact`]s and [`ComponentAnalysis`] from parsed files.
#[derive(Debug, Clone)]
pub struct ComponentFactExtractor {
    predicates: Vec<PatternPredicate>,
}

impl Default for ComponentFactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentFactExtractor {
    /// Creates an extractor with the default predicate battery.
    #[must_use]
    pub fn new() -> Self {
        Self {
            predicates: predicates::default_predicates(),
        }
    }

    /// Creates an extractor with an explicit predicate list.
    #[must_use]
    pub fn with_predicates(predicates: Vec<PatternPredicate>) -> Self {
        Self { predicates }
    }

    /// Registers an additional predicate.
    #[must_use]
    pub fn predicate(mut self, predicate: PatternPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Tracked call sites in source order.
    #[must_use]
    pub fn extract_usages(&self, parsed: &ParsedSource) -> Vec<ComponentUsageFact> {
        let facts = FileFacts::collect(parsed);
        self.usages(parsed, &facts)
    }

    fn usages(&self, parsed: &ParsedSource, facts: &FileFacts) -> Vec<ComponentUsageFact> {
        parsed
            .nodes()
            .into_iter()
            .filter(|n| matches!(n.kind(), "jsx_opening_element" | "jsx_self_closing_element"))
            .filter_map(|n| self.usage_at(parsed, facts, n))
            .collect()
    }

    /// Full analysis of one file.
    #[must_use]
    pub fn extract(&self, parsed: &ParsedSource) -> ComponentAnalysis {
        let facts = FileFacts::collect(parsed);
        let usages = self.usages(parsed, &facts);

        let mut versions: BTreeSet<DataSourceVersion> = usages
            .iter()
            .filter(|u| u.has_data_source)
            .map(|u| u.data_source_version)
            .filter(|v| *v != DataSourceVersion::Unknown)
            .collect();
        if facts.file_version() != DataSourceVersion::Unknown {
            versions.insert(facts.file_version());
        }
        let version = if versions.contains(&DataSourceVersion::Mixed)
            || (versions.contains(&DataSourceVersion::V1) && versions.contains(&DataSourceVersion::V2))
        {
            DataSourceVersion::Mixed
        } else {
            versions.into_iter().next().unwrap_or_default()
        };

        let mut fields: Vec<String> = Vec::new();
        for usage in &usages {
            let field = usage
                .prop("dataField")
                .and_then(|p| p.value.as_ref())
                .and_then(Value::as_str);
            if let Some(field) = field {
                if !fields.iter().any(|f| f == field) {
                    fields.push(field.to_owned());
                }
            }
        }

        let mut dependencies: Vec<String> = Vec::new();
        for binding in facts.imports.bindings().iter().filter(|b| b.is_archbase()) {
            let name = binding.exported_name().to_owned();
            if !dependencies.contains(&name) {
                dependencies.push(name);
            }
        }

        let side_effects = facts
            .hooks
            .iter()
            .any(|h| catalog::SIDE_EFFECT_HOOKS.contains(&h.as_str()));

        ComponentAnalysis {
            name: declared_component(parsed),
            file: parsed.path().to_path_buf(),
            props: declared_props(parsed),
            imports: facts.imports.bindings().to_vec(),
            data_source_usage: DataSourceUsage {
                has_data_source: usages.iter().any(|u| u.has_data_source)
                    || facts.uses_v1
                    || facts.uses_v2,
                version,
                fields,
            },
            complexity: thresholds::file_complexity(facts.hooks.len(), usages.len(), side_effects),
            hooks: facts.hooks,
            dependencies,
            usages,
        }
    }

    fn usage_at(
        &self,
        parsed: &ParsedSource,
        facts: &FileFacts,
        element: Node<'_>,
    ) -> Option<ComponentUsageFact> {
        let tag = element.child_by_field_name("name")?;
        let (name, import_path, import_resolved) = resolve_tag(parsed, &facts.imports, tag)?;
        let pos = element.start_position();

        let attrs = collect_props(parsed, element, &name);
        let props: Vec<PropInfo> = attrs.iter().map(|a| a.prop.clone()).collect();

        let has_data_source = props
            .iter()
            .any(|p| catalog::DATA_SOURCE_PROPS.contains(&p.name.as_str()));
        let data_source_version = if has_data_source {
            props
                .iter()
                .find(|p| p.name == "dataSource" && p.prop_type == PropType::Variable)
                .and_then(|p| p.value.as_ref())
                .and_then(Value::as_str)
                .and_then(|ident| trace_binding(parsed, &facts.imports, ident))
                .unwrap_or_else(|| facts.file_version())
        } else {
            DataSourceVersion::Unknown
        };

        let scope_hooks = outermost_function(element)
            .map(|f| scope_hooks(parsed, f))
            .unwrap_or_default();
        let wrappers = wrapping_calls(parsed, &facts.imports, element);

        let ctx = UsageContext {
            name: &name,
            props: &props,
            has_data_source,
            version: data_source_version,
            scope_hooks: &scope_hooks,
            wrappers: &wrappers,
            file_uses_v2: facts.uses_v2,
        };
        let patterns = predicates::tag(&self.predicates, &ctx);
        let issues = detect_issues(&name, pos.row + 1, pos.column, &attrs);

        Some(ComponentUsageFact {
            name,
            import_path,
            import_resolved,
            file: parsed.path().to_path_buf(),
            line: pos.row + 1,
            column: pos.column,
            props,
            has_data_source,
            data_source_version,
            patterns,
            issues,
        })
    }
}

/// Resolves a JSX tag to `(component, import path, resolved)`.
///
/// Tags imported from non-Archbase modules are user components and yield
/// `None`. Unimported tracked names get the library module as a best-effort
/// path.
fn resolve_tag(parsed: &ParsedSource, imports: &ImportMap, tag: Node<'_>) -> Option<(String, String, bool)> {
    match tag.kind() {
        "identifier" => {
            let local = parsed.text(tag);
            match imports.resolve(local) {
                Some(binding) if binding.is_archbase() => {
                    let name = binding.exported_name();
                    catalog::is_tracked(name).then(|| (name.to_owned(), binding.source.clone(), true))
                }
                Some(_) => None,
                None => catalog::is_tracked(local)
                    .then(|| (local.to_owned(), catalog::LIBRARY_MODULE.to_owned(), false)),
            }
        }
        "member_expression" | "nested_identifier" => {
            let object = tag.child_by_field_name("object")?;
            let property = tag.child_by_field_name("property")?;
            if object.kind() != "identifier" {
                return None;
            }
            let binding = imports.resolve(parsed.text(object))?;
            if !binding.is_archbase() || binding.is_aliased() {
                return None;
            }
            let name = parsed.text(property);
            catalog::is_tracked(name).then(|| (name.to_owned(), binding.source.clone(), true))
        }
        _ => None,
    }
}

struct Attribute {
    prop: PropInfo,
    line: usize,
    column: usize,
}

fn collect_props(parsed: &ParsedSource, element: Node<'_>, component: &str) -> Vec<Attribute> {
    let mut out = Vec::new();
    let mut cursor = element.walk();
    for attr in element.named_children(&mut cursor) {
        if attr.kind() != "jsx_attribute" {
            continue;
        }
        let mut attr_cursor = attr.walk();
        let mut parts = attr.named_children(&mut attr_cursor);
        let Some(name_node) = parts.next() else {
            continue;
        };
        let (prop_type, value) = match parts.next() {
            None => (PropType::Boolean, Some(Value::Bool(true))),
            Some(v) if v.kind() == "string" => (
                PropType::String,
                Some(Value::String(parsed.string_value(v).to_owned())),
            ),
            Some(v) if v.kind() == "jsx_expression" => {
                first_named_child(v).map_or((PropType::Any, None), |e| infer_expression(parsed, e))
            }
            Some(_) => (PropType::Any, None),
        };
        let name = parsed.text(name_node).to_owned();
        let is_required = catalog::is_required_prop(component, &name).then_some(true);
        let pos = attr.start_position();
        out.push(Attribute {
            prop: PropInfo {
                name,
                prop_type,
                value,
                is_required,
            },
            line: pos.row + 1,
            column: pos.column,
        });
    }
    out
}

fn infer_expression(parsed: &ParsedSource, expr: Node<'_>) -> (PropType, Option<Value>) {
    match expr.kind() {
        "string" | "template_string" => (
            PropType::String,
            Some(Value::String(parsed.string_value(expr).to_owned())),
        ),
        "number" => (PropType::Number, number_value(parsed.text(expr))),
        "true" => (PropType::Boolean, Some(Value::Bool(true))),
        "false" => (PropType::Boolean, Some(Value::Bool(false))),
        "identifier" => (
            PropType::Variable,
            Some(Value::String(parsed.text(expr).to_owned())),
        ),
        "arrow_function" | "function_expression" | "function" => (PropType::Function, None),
        "object" => (PropType::Object, None),
        "array" => (PropType::Array, None),
        "parenthesized_expression" => {
            first_named_child(expr).map_or((PropType::Any, None), |e| infer_expression(parsed, e))
        }
        _ => (PropType::Any, None),
    }
}

fn number_value(text: &str) -> Option<Value> {
    text.parse::<i64>().map(Value::from).ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
    })
}

/// Traces a local DataSource identifier to its declarator and classifies the
/// initializer. `None` when the binding cannot be traced.
fn trace_binding(parsed: &ParsedSource, imports: &ImportMap, ident: &str) -> Option<DataSourceVersion> {
    parsed
        .nodes_of_kind("variable_declarator")
        .into_iter()
        .filter(|decl| {
            decl.child_by_field_name("name")
                .is_some_and(|name| binds(parsed, name, ident))
        })
        .filter_map(|decl| decl.child_by_field_name("value"))
        .find_map(|value| initializer_version(parsed, imports, value, 0))
}

fn binds(parsed: &ParsedSource, pattern: Node<'_>, ident: &str) -> bool {
    parser::preorder(pattern).into_iter().any(|n| {
        matches!(n.kind(), "identifier" | "shorthand_property_identifier_pattern")
            && parsed.text(n) == ident
    })
}

fn initializer_version(
    parsed: &ParsedSource,
    imports: &ImportMap,
    value: Node<'_>,
    depth: usize,
) -> Option<DataSourceVersion> {
    if depth > TRACE_DEPTH {
        return None;
    }
    match value.kind() {
        "await_expression" | "parenthesized_expression" | "as_expression" | "non_null_expression"
        | "satisfies_expression" => {
            initializer_version(parsed, imports, first_named_child(value)?, depth + 1)
        }
        "new_expression" => {
            let ctor = value.child_by_field_name("constructor")?;
            callee_name(parsed, imports, ctor).and_then(factory_version)
        }
        "call_expression" => {
            let function = value.child_by_field_name("function")?;
            let name = callee_name(parsed, imports, function)?;
            if let Some(version) = factory_version(name) {
                return Some(version);
            }
            if !WRAPPING_HOOKS.contains(&name) {
                return None;
            }
            let args = value.child_by_field_name("arguments")?;
            let first = first_named_child(args)?;
            if parser::is_function(&first) {
                let body = first.child_by_field_name("body")?;
                if body.kind() == "statement_block" {
                    parser::preorder(body)
                        .into_iter()
                        .filter(|n| matches!(n.kind(), "new_expression" | "call_expression"))
                        .find_map(|n| initializer_version(parsed, imports, n, depth + 1))
                } else {
                    initializer_version(parsed, imports, body, depth + 1)
                }
            } else {
                initializer_version(parsed, imports, first, depth + 1)
            }
        }
        _ => None,
    }
}

/// Outermost function enclosing `node`, which is the component body.
fn outermost_function(node: Node<'_>) -> Option<Node<'_>> {
    let mut found = None;
    let mut current = node.parent();
    while let Some(n) = current {
        if parser::is_function(&n) {
            found = Some(n);
        }
        current = n.parent();
    }
    found
}

fn scope_hooks(parsed: &ParsedSource, scope: Node<'_>) -> BTreeSet<String> {
    parser::descendants_of_kind(scope, "call_expression")
        .into_iter()
        .filter_map(|call| call.child_by_field_name("function"))
        .filter_map(|callee| hook_name(parsed, callee))
        .map(str::to_owned)
        .collect()
}

fn wrapping_calls(parsed: &ParsedSource, imports: &ImportMap, element: Node<'_>) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = element.parent();
    while let Some(n) = current {
        if n.kind() == "call_expression" {
            let name = n
                .child_by_field_name("function")
                .and_then(|f| callee_name(parsed, imports, f));
            if let Some(name) = name {
                out.push(name.to_owned());
            }
        }
        current = n.parent();
    }
    out
}

fn detect_issues(component: &str, line: usize, column: usize, attrs: &[Attribute]) -> Vec<ComponentIssue> {
    let Some(rules) = catalog::rules_for(component) else {
        return Vec::new();
    };
    let find = |name: &str| attrs.iter().find(|a| a.prop.name == name);
    let mut issues = Vec::new();

    for required in rules.required {
        if find(required).is_none() {
            issues.push(
                ComponentIssue::new(IssueKind::Error, format!("Missing required prop: {required}"))
                    .with_fix(format!("Add {required} prop to {component}"))
                    .at(line, column),
            );
        }
    }

    for (prop, reason) in rules.deprecated {
        if let Some(attr) = find(prop) {
            issues.push(
                ComponentIssue::new(IssueKind::Warning, format!("Deprecated prop {prop}: {reason}"))
                    .with_fix(format!("Remove {prop} from {component}"))
                    .at(attr.line, attr.column),
            );
        }
    }

    for (old, new) in rules.replaced {
        if let Some(attr) = find(old) {
            issues.push(
                ComponentIssue::new(IssueKind::Suggestion, format!("Prop {old} can be replaced by {new}"))
                    .with_fix(format!("Rename {old} to {new}"))
                    .at(attr.line, attr.column),
            );
        }
    }

    issues
}

fn is_pascal_case(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// First PascalCase function or function-valued binding in the file.
fn declared_component(parsed: &ParsedSource) -> Option<String> {
    parsed.nodes().into_iter().find_map(|node| {
        let name = match node.kind() {
            "function_declaration" => node.child_by_field_name("name")?,
            "variable_declarator" => {
                let value = node.child_by_field_name("value")?;
                let is_component_value = parser::is_function(&value)
                    || (value.kind() == "call_expression"
                        && !parser::descendants_of_kind(value, "arrow_function").is_empty());
                if !is_component_value {
                    return None;
                }
                node.child_by_field_name("name")?
            }
            _ => return None,
        };
        let text = parsed.text(name);
        (name.kind() == "identifier" && is_pascal_case(text)).then(|| text.to_owned())
    })
}

/// Props from interfaces and type aliases whose name contains `Props`.
fn declared_props(parsed: &ParsedSource) -> Vec<DeclaredProp> {
    let mut out = Vec::new();
    for node in parsed.nodes() {
        let body = match node.kind() {
            "interface_declaration" => node.child_by_field_name("body"),
            "type_alias_declaration" => node.child_by_field_name("value"),
            _ => continue,
        };
        let is_props = node
            .child_by_field_name("name")
            .is_some_and(|n| parsed.text(n).contains("Props"));
        let Some(body) = body.filter(|_| is_props) else {
            continue;
        };

        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() != "property_signature" {
                continue;
            }
            let Some(name) = member.child_by_field_name("name") else {
                continue;
            };
            let mut member_cursor = member.walk();
            let optional = member.children(&mut member_cursor).any(|c| c.kind() == "?");
            let type_text = member
                .child_by_field_name("type")
                .map_or("unknown", |t| parsed.text(t).trim_start_matches(':').trim());
            out.push(DeclaredProp {
                name: parsed.string_value(name).to_owned(),
                type_text: type_text.to_owned(),
                required: !optional,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, SourceParser};

    fn parse(src: &str) -> ParsedSource {
        SourceParser::new()
            .parse(src, "src/UserForm.tsx", ParseOptions::component())
            .unwrap()
    }

    fn usages(src: &str) -> Vec<ComponentUsageFact> {
        ComponentFactExtractor::new().extract_usages(&parse(src))
    }

    const V1_FORM: &str = r#"import { ArchbaseEdit, ArchbaseDataSource } from '@archbase/react';

const ds = new ArchbaseDataSource('users', { records: [] });

export function UserForm() {
  return <ArchbaseEdit dataSource={ds} dataField="name" label="Name" />;
}
"#;

    #[test]
    fn legacy_binding_is_v1_without_issues() {
        let facts = usages(V1_FORM);
        assert_eq!(facts.len(), 1);
        let edit = &facts[0];
        assert_eq!(edit.name, "ArchbaseEdit");
        assert_eq!(edit.import_path, "@archbase/react");
        assert!(edit.import_resolved);
        assert_eq!(edit.file, PathBuf::from("src/UserForm.tsx"));
        assert_eq!(edit.line, 6);
        assert!(edit.has_data_source);
        assert_eq!(edit.data_source_version, DataSourceVersion::V1);
        assert!(edit.issues.is_empty(), "{:?}", edit.issues);
        assert!(edit.has_pattern("data-bound"));
    }

    #[test]
    fn props_are_typed_in_source_order() {
        let facts = usages(
            r#"import { ArchbaseEdit } from '@archbase/react';
const x = <ArchbaseEdit dataSource={ds} dataField="name" maxLength={20} disabled readOnly={false} onChange={() => {}} style={{ a: 1 }} options={[1]} value={a.b} />;
"#,
        );
        let props = &facts[0].props;
        let kinds: Vec<_> = props.iter().map(|p| (p.name.as_str(), p.prop_type)).collect();
        assert_eq!(
            kinds,
            vec![
                ("dataSource", PropType::Variable),
                ("dataField", PropType::String),
                ("maxLength", PropType::Number),
                ("disabled", PropType::Boolean),
                ("readOnly", PropType::Boolean),
                ("onChange", PropType::Function),
                ("style", PropType::Object),
                ("options", PropType::Array),
                ("value", PropType::Any),
            ]
        );
        assert_eq!(props[2].value, Some(Value::from(20)));
        assert_eq!(props[3].value, Some(Value::Bool(true)));
        assert_eq!(props[0].is_required, Some(true));
        assert_eq!(props[2].is_required, None);
    }

    #[test]
    fn remote_factory_hook_is_v2() {
        let facts = usages(
            r#"import { ArchbaseDataGrid, useArchbaseRemoteDataSource } from '@archbase/react';
export const Users = () => {
  const { dataSource } = useArchbaseRemoteDataSource({ service });
  return <ArchbaseDataGrid dataSource={dataSource} />;
};
"#,
        );
        assert_eq!(facts[0].data_source_version, DataSourceVersion::V2);
        assert!(facts[0].has_pattern("crud-with-datagrid"));
    }

    #[test]
    fn aliased_factory_is_resolved_through_imports() {
        let facts = usages(
            r#"import { ArchbaseEdit, ArchbaseDataSource as Legacy } from '@archbase/react';
function F() {
  const ds = useMemo(() => new Legacy('x'), []);
  return <ArchbaseEdit dataSource={ds} dataField="a" />;
}
"#,
        );
        assert_eq!(facts[0].data_source_version, DataSourceVersion::V1);
        assert!(facts[0].has_pattern("memoized"));
    }

    #[test]
    fn untraceable_binding_falls_back_to_file_evidence() {
        let facts = usages(
            r#"import { ArchbaseEdit, ArchbaseDataSource, ArchbaseRemoteDataSource } from '@archbase/react';
const a = new ArchbaseDataSource('a');
const b = new ArchbaseRemoteDataSource({ url: '/b' });
function F(props) {
  return <ArchbaseEdit dataSource={props.ds} dataField="a" />;
}
"#,
        );
        assert_eq!(facts[0].data_source_version, DataSourceVersion::Mixed);
    }

    #[test]
    fn no_evidence_is_unknown() {
        let facts = usages(
            r#"import { ArchbaseEdit } from '@archbase/react';
function F({ ds }) { return <ArchbaseEdit dataSource={ds} dataField="a" />; }
"#,
        );
        assert_eq!(facts[0].data_source_version, DataSourceVersion::Unknown);
    }

    #[test]
    fn user_components_are_skipped() {
        let facts = usages(
            r#"import { ArchbaseEdit } from './my-components';
const x = <ArchbaseEdit dataSource={ds} />;
const y = <div><span /></div>;
"#,
        );
        assert!(facts.is_empty());
    }

    #[test]
    fn unimported_tracked_tag_gets_best_effort_path() {
        let facts = usages("const x = <ArchbaseButton onClick={go}>Save</ArchbaseButton>;\n");
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].import_path, "@archbase/react");
        assert!(!facts[0].import_resolved);
        assert!(facts[0].issues.is_empty());
    }

    #[test]
    fn namespace_member_tag_is_tracked() {
        let facts = usages(
            "import * as AB from '@archbase/react';\nconst x = <AB.ArchbaseModal opened />;\n",
        );
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].name, "ArchbaseModal");
    }

    #[test]
    fn issue_table_produces_all_kinds() {
        let facts = usages(
            r#"import { ArchbaseDataGrid, ArchbaseModal } from '@archbase/react';
const g = <ArchbaseDataGrid forceUpdate onRowClick={select} />;
const m = <ArchbaseModal title="x" />;
"#,
        );
        let grid = &facts[0];
        let kinds: Vec<_> = grid.issues.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![IssueKind::Error, IssueKind::Warning, IssueKind::Suggestion]);
        assert_eq!(grid.issues[0].message, "Missing required prop: dataSource");
        assert_eq!(grid.issues[0].line, Some(2));
        assert!(grid.issues[2].message.contains("onRowSelect"));

        assert_eq!(facts[1].issues.len(), 1);
        assert!(facts[1].issues[0].message.contains("opened"));
    }

    #[test]
    fn state_and_effect_hooks_tag_usage() {
        let facts = usages(
            r#"import { ArchbaseEdit } from '@archbase/react';
export function F() {
  const [v, setV] = useState('');
  useEffect(() => {}, []);
  return <div>{items.map(i => <ArchbaseEdit key={i} dataSource={ds} dataField="a" />)}</div>;
}
"#,
        );
        assert!(facts[0].has_pattern("stateful"));
        assert!(facts[0].has_pattern("with-effects"));
    }

    #[test]
    fn usages_preserve_source_order() {
        let facts = usages(
            r#"import { ArchbaseEdit, ArchbaseSelect } from '@archbase/react';
const a = <><ArchbaseSelect dataSource={d} dataField="s" /><ArchbaseEdit dataSource={d} dataField="e" /></>;
"#,
        );
        let names: Vec<_> = facts.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ArchbaseSelect", "ArchbaseEdit"]);
        assert!(facts[0].column < facts[1].column);
    }

    #[test]
    fn extraction_is_idempotent() {
        let parsed = parse(V1_FORM);
        let extractor = ComponentFactExtractor::new();
        assert_eq!(extractor.extract_usages(&parsed), extractor.extract_usages(&parsed));
        assert_eq!(usages(V1_FORM), usages(V1_FORM));
    }

    #[test]
    fn custom_predicate_is_applied() {
        let extractor = ComponentFactExtractor::new()
            .predicate(PatternPredicate::new("labelled", |ctx| ctx.has_prop("label")));
        let facts = extractor.extract_usages(&parse(V1_FORM));
        assert!(facts[0].has_pattern("labelled"));
    }

    #[test]
    fn full_analysis_of_component_file() {
        let analysis = ComponentFactExtractor::new().extract(&parse(
            r#"import React, { useState, useEffect } from 'react';
import { ArchbaseEdit, ArchbaseDataSource } from '@archbase/react';

interface UserFormProps {
  userId: string;
  onSave?: () => void;
}

export const UserForm = ({ userId, onSave }: UserFormProps) => {
  const [ds] = useState(() => new ArchbaseDataSource('user'));
  useEffect(() => { ds.forceUpdate(); }, [userId]);
  return <ArchbaseEdit dataSource={ds} dataField="email" />;
};
"#,
        ));
        assert_eq!(analysis.name.as_deref(), Some("UserForm"));
        assert_eq!(
            analysis.props,
            vec![
                DeclaredProp {
                    name: "userId".into(),
                    type_text: "string".into(),
                    required: true
                },
                DeclaredProp {
                    name: "onSave".into(),
                    type_text: "() => void".into(),
                    required: false
                },
            ]
        );
        assert_eq!(analysis.hooks, vec!["useState", "useEffect"]);
        assert_eq!(analysis.dependencies, vec!["ArchbaseEdit", "ArchbaseDataSource"]);
        assert!(analysis.data_source_usage.has_data_source);
        assert_eq!(analysis.data_source_usage.version, DataSourceVersion::V1);
        assert_eq!(analysis.data_source_usage.fields, vec!["email"]);
        assert_eq!(analysis.complexity, FileComplexity::Low);
        assert_eq!(analysis.usages.len(), 1);
        assert_eq!(analysis.imports.len(), 5);
    }
}
