//! Import binding resolution.
//!
//! Maps locally bound identifiers to the module that declares them, so call
//! sites can be told apart as library or user components.

use crate::catalog;
use crate::parser::ParsedSource;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

/// `imported` value for default imports.
pub const DEFAULT_IMPORT: &str = "default";
/// `imported` value for namespace imports and whole-module requires.
pub const NAMESPACE_IMPORT: &str = "*";

/// One locally bound imported identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBinding {
    /// Identifier bound in this file.
    pub local: String,
    /// Exported name, [`DEFAULT_IMPORT`] or [`NAMESPACE_IMPORT`].
    pub imported: String,
    /// Module specifier.
    pub source: String,
    /// Line of the declaration (1-indexed).
    pub line: usize,
}

impl ImportBinding {
    /// Returns true if the binding comes from an Archbase module.
    #[must_use]
    pub fn is_archbase(&self) -> bool {
        catalog::is_archbase_module(&self.source)
    }

    /// Returns true for `import * as x` and `const x = require(..)`.
    #[must_use]
    pub fn is_namespace(&self) -> bool {
        self.imported == NAMESPACE_IMPORT
    }

    /// Name the module exports this binding under.
    ///
    /// Default and namespace bindings have no exported name and fall back to
    /// the local one.
    #[must_use]
    pub fn exported_name(&self) -> &str {
        if self.imported == DEFAULT_IMPORT || self.is_namespace() {
            &self.local
        } else {
            &self.imported
        }
    }

    /// Returns true if the binding renames the export.
    #[must_use]
    pub fn is_aliased(&self) -> bool {
        self.exported_name() != self.local
    }
}

/// All import bindings of one file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    bindings: Vec<ImportBinding>,
}

impl ImportMap {
    /// Collects ES imports and static `require` destructuring.
    #[must_use]
    pub fn collect(parsed: &ParsedSource) -> Self {
        let mut map = Self::default();
        for node in parsed.nodes() {
            match node.kind() {
                "import_statement" => map.collect_import(parsed, node),
                "variable_declarator" => map.collect_require(parsed, node),
                _ => {}
            }
        }
        map
    }

    fn push(&mut self, local: &str, imported: &str, source: &str, line: usize) {
        self.bindings.push(ImportBinding {
            local: local.to_owned(),
            imported: imported.to_owned(),
            source: source.to_owned(),
            line,
        });
    }

    fn collect_import(&mut self, parsed: &ParsedSource, node: Node<'_>) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let source = parsed.string_value(source).to_owned();
        let line = node.start_position().row + 1;

        let mut cursor = node.walk();
        for clause in node.named_children(&mut cursor) {
            if clause.kind() != "import_clause" {
                continue;
            }
            let mut clause_cursor = clause.walk();
            for part in clause.named_children(&mut clause_cursor) {
                match part.kind() {
                    "identifier" => self.push(parsed.text(part), DEFAULT_IMPORT, &source, line),
                    "namespace_import" => {
                        let mut ns_cursor = part.walk();
                        let ident = part
                            .named_children(&mut ns_cursor)
                            .find(|n| n.kind() == "identifier");
                        if let Some(ident) = ident {
                            self.push(parsed.text(ident), NAMESPACE_IMPORT, &source, line);
                        }
                    }
                    "named_imports" => {
                        let mut spec_cursor = part.walk();
                        for spec in part.named_children(&mut spec_cursor) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = parsed.string_value(name);
                            let local = spec
                                .child_by_field_name("alias")
                                .map_or(imported, |a| parsed.text(a));
                            self.push(local, imported, &source, line);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn collect_require(&mut self, parsed: &ParsedSource, node: Node<'_>) {
        let (Some(name), Some(value)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("value"),
        ) else {
            return;
        };
        let Some(source) = require_source(parsed, value) else {
            return;
        };
        let line = node.start_position().row + 1;

        match name.kind() {
            "identifier" => self.push(parsed.text(name), NAMESPACE_IMPORT, &source, line),
            "object_pattern" => {
                let mut cursor = name.walk();
                for prop in name.named_children(&mut cursor) {
                    match prop.kind() {
                        "shorthand_property_identifier_pattern" => {
                            let ident = parsed.text(prop);
                            self.push(ident, ident, &source, line);
                        }
                        "pair_pattern" => {
                            let key = prop.child_by_field_name("key");
                            let value = prop.child_by_field_name("value");
                            if let (Some(key), Some(value)) = (key, value) {
                                if value.kind() == "identifier" {
                                    self.push(
                                        parsed.text(value),
                                        parsed.string_value(key),
                                        &source,
                                        line,
                                    );
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    /// Resolves a local identifier. `None` when the identifier is not imported.
    #[must_use]
    pub fn resolve(&self, local: &str) -> Option<&ImportBinding> {
        self.bindings.iter().find(|b| b.local == local)
    }

    /// Follows an import alias back to the exported name.
    ///
    /// Identifiers that are not imported are returned unchanged.
    #[must_use]
    pub fn canonical<'a>(&'a self, local: &'a str) -> &'a str {
        self.resolve(local).map_or(local, ImportBinding::exported_name)
    }

    /// All bindings in source order.
    #[must_use]
    pub fn bindings(&self) -> &[ImportBinding] {
        &self.bindings
    }

    /// Distinct module specifiers in first-seen order.
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for b in &self.bindings {
            if !out.contains(&b.source.as_str()) {
                out.push(&b.source);
            }
        }
        out
    }

    /// Returns true if any binding's module satisfies `pred`.
    pub fn imports_module(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.bindings.iter().any(|b| pred(&b.source))
    }
}

/// Module specifier of a `require('..')` call, if `node` is one.
fn require_source(parsed: &ParsedSource, node: Node<'_>) -> Option<String> {
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    if function.kind() != "identifier" || parsed.text(function) != "require" {
        return None;
    }
    let args = node.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    let first = args.named_children(&mut cursor).next()?;
    (first.kind() == "string").then(|| parsed.string_value(first).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, SourceParser};

    fn imports(src: &str) -> ImportMap {
        let parsed = SourceParser::new()
            .parse(src, "a.tsx", ParseOptions::component())
            .unwrap();
        ImportMap::collect(&parsed)
    }

    #[test]
    fn named_default_and_namespace_imports() {
        let map = imports(
            "import React, { useState } from 'react';\n\
             import { ArchbaseEdit as Edit, ArchbaseSelect } from '@archbase/react';\n\
             import * as yup from 'yup';\n",
        );
        assert_eq!(map.bindings().len(), 5);

        let edit = map.resolve("Edit").unwrap();
        assert_eq!(edit.imported, "ArchbaseEdit");
        assert_eq!(edit.source, "@archbase/react");
        assert!(edit.is_archbase());
        assert!(edit.is_aliased());
        assert_eq!(edit.line, 2);

        assert_eq!(map.resolve("React").unwrap().imported, DEFAULT_IMPORT);
        assert!(map.resolve("yup").unwrap().is_namespace());
        assert_eq!(map.canonical("Edit"), "ArchbaseEdit");
        assert_eq!(map.canonical("Unbound"), "Unbound");
    }

    #[test]
    fn require_destructuring() {
        let map = imports(
            "const { ArchbaseEdit, ArchbaseDataSource: DS } = require('@archbase/react');\n\
             const lib = require(\"lodash\");\n",
        );
        assert_eq!(map.resolve("ArchbaseEdit").unwrap().source, "@archbase/react");
        assert_eq!(map.resolve("DS").unwrap().imported, "ArchbaseDataSource");
        assert!(map.resolve("lib").unwrap().is_namespace());
    }

    #[test]
    fn unresolved_identifier_is_none() {
        let map = imports("const x = 1;\n");
        assert!(map.resolve("x").is_none());
        assert!(map.sources().is_empty());
    }

    #[test]
    fn sources_are_distinct_in_order() {
        let map = imports(
            "import { a } from 'x';\nimport { b } from 'y';\nimport { c } from 'x';\n",
        );
        assert_eq!(map.sources(), vec!["x", "y"]);
        assert!(map.imports_module(|s| s == "y"));
    }
}
