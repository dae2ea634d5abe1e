//! Per-file observations feeding the project aggregation.

use crate::model::ValidationLibrary;
use archbase_core::catalog;
use archbase_core::imports::ImportMap;
use archbase_core::parser::{self, ParsedSource};
use archbase_core::{ComponentFactExtractor, ComponentUsageFact};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tree_sitter::Node;

/// Component whose elements are counted as forms.
pub const FORM_TEMPLATE: &str = "ArchbaseFormTemplate";

/// Props that hold a custom validation function.
const VALIDATION_PROPS: &[&str] = &["validate", "validation", "validationRules", "validator"];

/// Props that select a form layout.
const LAYOUT_PROPS: &[&str] = &["layout", "orientation"];

const DEFAULT_LAYOUT: &str = "vertical";

/// Schema method name to rule name.
const SCHEMA_RULES: &[(&str, &str)] = &[
    ("required", "required"),
    ("email", "email"),
    ("min", "min-length"),
    ("max", "max-length"),
    ("matches", "regex"),
    ("regex", "regex"),
    ("string", "string"),
    ("number", "number"),
];

const ELEMENT_KINDS: &[&str] = &["jsx_opening_element", "jsx_self_closing_element"];

/// One form template element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOccurrence {
    pub field_types: BTreeSet<String>,
    pub validation: ValidationLibrary,
    pub layout: String,
    pub features: BTreeSet<String>,
    pub snippet: String,
}

/// Layout facts of a page-like file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageObservation {
    pub layout: String,
    pub sections: BTreeSet<String>,
    pub navigation: bool,
    pub authentication: bool,
}

/// Everything the analyzer needs from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileObservation {
    pub file: PathBuf,
    pub usages: Vec<ComponentUsageFact>,
    pub forms: Vec<FormOccurrence>,
    pub validation: BTreeMap<ValidationLibrary, BTreeSet<String>>,
    pub page: Option<PageObservation>,
}

impl FileObservation {
    /// Observes a parsed file.
    pub fn collect(parsed: &ParsedSource, extractor: &ComponentFactExtractor) -> Self {
        let imports = ImportMap::collect(parsed);
        let elements: Vec<Node<'_>> = parsed
            .nodes()
            .into_iter()
            .filter(|n| ELEMENT_KINDS.contains(&n.kind()))
            .collect();
        let library = schema_library(&imports);

        Self {
            file: parsed.path().to_path_buf(),
            usages: extractor.extract_usages(parsed),
            forms: elements
                .iter()
                .filter(|e| tag_name(parsed, &imports, **e).as_deref() == Some(FORM_TEMPLATE))
                .map(|e| form_occurrence(parsed, &imports, *e, library))
                .collect(),
            validation: schema_rules(parsed, &imports),
            page: page_observation(parsed, &imports, &elements),
        }
    }
}

/// Library of an import source, if it is a schema library.
fn library_of(source: &str) -> Option<ValidationLibrary> {
    if source == "yup" {
        Some(ValidationLibrary::Yup)
    } else if source == "zod" || source.starts_with("zod/") {
        Some(ValidationLibrary::Zod)
    } else {
        None
    }
}

fn schema_library(imports: &ImportMap) -> Option<ValidationLibrary> {
    imports.sources().into_iter().filter_map(library_of).min()
}

/// Canonical name of an element's tag.
fn tag_name(parsed: &ParsedSource, imports: &ImportMap, element: Node<'_>) -> Option<String> {
    let tag = element.child_by_field_name("name")?;
    match tag.kind() {
        "identifier" => Some(imports.canonical(parsed.text(tag)).to_owned()),
        "member_expression" | "nested_identifier" => tag
            .child_by_field_name("property")
            .map(|p| parsed.text(p).to_owned()),
        _ => Some(parsed.text(tag).to_owned()),
    }
}

/// Name and value nodes of each attribute on an element.
fn attributes<'t>(parsed: &ParsedSource, element: Node<'t>) -> Vec<(String, Option<Node<'t>>)> {
    let mut out = Vec::new();
    let mut cursor = element.walk();
    for attr in element.named_children(&mut cursor) {
        if attr.kind() != "jsx_attribute" {
            continue;
        }
        let mut inner = attr.walk();
        let mut parts = attr.named_children(&mut inner);
        if let Some(name) = parts.next() {
            out.push((parsed.text(name).to_owned(), parts.next()));
        }
    }
    out
}

/// Expression inside `{...}`, or the node itself.
fn unwrap_expression(node: Node<'_>) -> Node<'_> {
    if node.kind() == "jsx_expression" {
        let mut cursor = node.walk();
        let inner = node.named_children(&mut cursor).next();
        inner.unwrap_or(node)
    } else {
        node
    }
}

fn feature_of(name: &str) -> Option<&'static str> {
    if name.contains("FormBuilder") {
        Some("form-builder")
    } else if name.contains("Wizard") {
        Some("wizard")
    } else if name.contains("Step") {
        Some("multi-step")
    } else {
        None
    }
}

fn form_occurrence(
    parsed: &ParsedSource,
    imports: &ImportMap,
    form: Node<'_>,
    library: Option<ValidationLibrary>,
) -> FormOccurrence {
    let inner: Vec<Node<'_>> = match form.kind() {
        "jsx_opening_element" => form
            .parent()
            .map(parser::preorder)
            .unwrap_or_default()
            .into_iter()
            .filter(|n| ELEMENT_KINDS.contains(&n.kind()) && n.id() != form.id())
            .collect(),
        _ => Vec::new(),
    };
    let inner_names: Vec<String> = inner
        .iter()
        .filter_map(|n| tag_name(parsed, imports, *n))
        .collect();

    let mut enclosing = Vec::new();
    let mut current = form.parent();
    while let Some(node) = current {
        if node.kind() == "jsx_element" {
            if let Some(open) = node.child_by_field_name("open_tag") {
                if open.id() != form.id() {
                    enclosing.extend(tag_name(parsed, imports, open));
                }
            }
        }
        current = node.parent();
    }

    let attrs = attributes(parsed, form);
    let custom = attrs.iter().any(|(name, value)| {
        VALIDATION_PROPS.contains(&name.as_str())
            && value.is_some_and(|v| parser::is_function(&unwrap_expression(v)))
    });
    let layout = attrs
        .iter()
        .filter(|(name, _)| LAYOUT_PROPS.contains(&name.as_str()))
        .find_map(|(_, value)| value.filter(|v| v.kind() == "string"))
        .map_or_else(|| DEFAULT_LAYOUT.to_owned(), |v| parsed.string_value(v).to_owned());

    let validation = match library {
        Some(lib) => lib,
        None if custom => ValidationLibrary::Custom,
        None => ValidationLibrary::None,
    };

    FormOccurrence {
        field_types: inner_names
            .iter()
            .filter_map(|n| catalog::field_type(n))
            .map(str::to_owned)
            .collect(),
        validation,
        layout,
        features: inner_names
            .iter()
            .chain(&enclosing)
            .filter_map(|n| feature_of(n))
            .map(str::to_owned)
            .collect(),
        snippet: parsed.text(form).to_owned(),
    }
}

/// Leftmost identifier of a call/member chain.
fn chain_root(mut node: Node<'_>) -> Option<Node<'_>> {
    loop {
        node = match node.kind() {
            "call_expression" => node.child_by_field_name("function")?,
            "member_expression" => node.child_by_field_name("object")?,
            "identifier" => return Some(node),
            _ => return None,
        };
    }
}

fn schema_rules(
    parsed: &ParsedSource,
    imports: &ImportMap,
) -> BTreeMap<ValidationLibrary, BTreeSet<String>> {
    let mut out: BTreeMap<ValidationLibrary, BTreeSet<String>> = BTreeMap::new();
    for call in parsed.nodes_of_kind("call_expression") {
        let Some(function) = call.child_by_field_name("function") else {
            continue;
        };
        let Some(root) = chain_root(function) else {
            continue;
        };
        let Some(binding) = imports.resolve(parsed.text(root)) else {
            continue;
        };
        let Some(library) = library_of(&binding.source) else {
            continue;
        };
        let method = match function.kind() {
            "member_expression" => function
                .child_by_field_name("property")
                .map_or("", |p| parsed.text(p)),
            "identifier" => binding.exported_name(),
            _ => "",
        };
        if let Some((_, rule)) = SCHEMA_RULES.iter().find(|(m, _)| *m == method) {
            out.entry(library).or_default().insert((*rule).to_owned());
        }
    }
    out
}

fn page_observation(
    parsed: &ParsedSource,
    imports: &ImportMap,
    elements: &[Node<'_>],
) -> Option<PageObservation> {
    let tags: Vec<String> = elements
        .iter()
        .filter_map(|e| tag_name(parsed, imports, *e))
        .map(|t| t.to_lowercase())
        .collect();
    let any_tag = |needles: &[&str]| tags.iter().any(|t| needles.iter().any(|n| t.contains(n)));

    let navigation = tags.iter().any(|t| t == "nav")
        || any_tag(&["navigation", "navlink", "menu", "breadcrumb"])
        || imports.imports_module(|s| s.starts_with("react-router") || s == "next/link");

    let mut sections = BTreeSet::new();
    if any_tag(&["header"]) {
        sections.insert("header");
    }
    if any_tag(&["sidebar", "navbar", "aside"]) {
        sections.insert("sidebar");
    }
    if any_tag(&["footer"]) {
        sections.insert("footer");
    }
    if any_tag(&["main"]) {
        sections.insert("main");
    }
    if navigation {
        sections.insert("navigation");
    }
    if sections.is_empty() {
        return None;
    }

    let path = parsed.path().to_string_lossy().to_lowercase();
    let layout = if sections.contains("sidebar") {
        "sidebar"
    } else if sections.contains("header") {
        "header"
    } else if path.contains("dashboard") || any_tag(&["dashboard"]) {
        "dashboard"
    } else {
        "unknown"
    };

    let auth_words = ["auth", "login", "session"];
    let authentication = any_tag(&auth_words)
        || imports.bindings().iter().any(|b| {
            let local = b.local.to_lowercase();
            let source = b.source.to_lowercase();
            auth_words
                .iter()
                .any(|w| local.contains(w) || source.contains(w))
        });

    Some(PageObservation {
        layout: layout.to_owned(),
        sections: sections.into_iter().map(str::to_owned).collect(),
        navigation,
        authentication,
    })
}
