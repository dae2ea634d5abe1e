//! Tree-sitter front end for TypeScript/JavaScript component files.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

/// Source language flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// TypeScript (the static-typing superset).
    #[default]
    TypeScript,
    /// Plain JavaScript.
    JavaScript,
}

/// Options accepted by [`SourceParser::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Source language flavor.
    pub dialect: Dialect,
    /// Accept element-literal (JSX) syntax.
    pub jsx: bool,
}

impl ParseOptions {
    /// TypeScript with JSX, which every component file is parsed as.
    #[must_use]
    pub fn component() -> Self {
        Self {
            dialect: Dialect::TypeScript,
            jsx: true,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::component()
    }
}

/// A file that could not be parsed.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("syntax error in {}:{line}:{column}: {message}", .path.display())]
#[diagnostic(code(archbase::syntax))]
pub struct SyntaxError {
    /// File path as given to the parser.
    pub path: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed).
    pub column: usize,
    /// Description of the offending node.
    pub message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{message}")]
    span: SourceSpan,
}

impl SyntaxError {
    fn new(path: &Path, source: &str, offset: usize, line: usize, column: usize, message: String) -> Self {
        let len = usize::from(offset < source.len());
        Self {
            path: path.to_path_buf(),
            line,
            column,
            message,
            src: NamedSource::new(path.display().to_string(), source.to_owned()),
            span: SourceSpan::from((offset, len)),
        }
    }
}

/// Parses component source text into syntax trees.
///
/// Each call performs a fresh parse; nothing is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceParser;

impl SourceParser {
    /// Creates a parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn language(options: ParseOptions) -> Language {
        match (options.dialect, options.jsx) {
            (Dialect::TypeScript, false) => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            // The TSX grammar is a superset of JavaScript with JSX.
            _ => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Parses `source`, attributing errors to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError`] located at the first error or missing node.
    pub fn parse(
        &self,
        source: &str,
        path: impl AsRef<Path>,
        options: ParseOptions,
    ) -> Result<ParsedSource, SyntaxError> {
        let path = path.as_ref();
        let mut parser = Parser::new();
        parser.set_language(&Self::language(options)).map_err(|e| {
            SyntaxError::new(path, source, 0, 1, 0, format!("grammar unavailable: {e}"))
        })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::new(path, source, 0, 1, 0, "parse aborted".to_owned()))?;

        let root = tree.root_node();
        if root.has_error() {
            let bad = preorder(root)
                .into_iter()
                .find(|n| n.is_error() || n.is_missing())
                .unwrap_or(root);
            let pos = bad.start_position();
            let message = if bad.is_missing() {
                format!("missing `{}`", bad.kind())
            } else {
                let snippet: String = bad
                    .utf8_text(source.as_bytes())
                    .unwrap_or("")
                    .chars()
                    .take(24)
                    .collect();
                format!("unexpected `{}`", snippet.trim())
            };
            return Err(SyntaxError::new(
                path,
                source,
                bad.start_byte(),
                pos.row + 1,
                pos.column,
                message,
            ));
        }

        Ok(ParsedSource {
            path: path.to_path_buf(),
            source: source.to_owned(),
            tree,
        })
    }
}

/// A successfully parsed file.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl ParsedSource {
    /// Root node of the tree.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Original source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path the source was parsed as.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text covered by `node`.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Text of a string literal node without its quotes.
    #[must_use]
    pub fn string_value(&self, node: Node<'_>) -> &str {
        self.text(node).trim_matches(|c| c == '"' || c == '\'' || c == '`')
    }

    /// All nodes in pre-order.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node<'_>> {
        preorder(self.root())
    }

    /// All nodes of the given kind in pre-order.
    #[must_use]
    pub fn nodes_of_kind(&self, kind: &str) -> Vec<Node<'_>> {
        descendants_of_kind(self.root(), kind)
    }
}

/// Pre-order traversal of `root` and its descendants.
#[must_use]
pub fn preorder(root: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut cursor = root.walk();
    let mut climbing = false;
    loop {
        if climbing {
            if cursor.goto_next_sibling() {
                climbing = false;
            } else if !cursor.goto_parent() {
                break;
            }
        } else {
            out.push(cursor.node());
            if !cursor.goto_first_child() {
                climbing = true;
            }
        }
    }
    out
}

/// Descendants of `root` (inclusive) with the given kind, in pre-order.
#[must_use]
pub fn descendants_of_kind<'t>(root: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    preorder(root)
        .into_iter()
        .filter(|n| n.kind() == kind)
        .collect()
}

/// Nearest ancestor of `node` matching `pred`.
pub fn ancestor<'t>(node: Node<'t>, pred: impl Fn(&Node<'t>) -> bool) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if pred(&n) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Node kinds that introduce a function body.
pub const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "arrow_function",
    "method_definition",
    "generator_function_declaration",
];

/// Returns true if `node` is a function-like node.
#[must_use]
pub fn is_function(node: &Node<'_>) -> bool {
    FUNCTION_KINDS.contains(&node.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<ParsedSource, SyntaxError> {
        SourceParser::new().parse(src, "src/App.tsx", ParseOptions::component())
    }

    #[test]
    fn parses_tsx_with_types() {
        let parsed = parse(
            "interface P { a?: string }\nexport const App = (p: P) => <div>{p.a}</div>;\n",
        )
        .unwrap();
        assert_eq!(parsed.root().kind(), "program");
        assert!(!parsed.nodes_of_kind("jsx_element").is_empty());
        assert!(!parsed.nodes_of_kind("interface_declaration").is_empty());
    }

    #[test]
    fn reports_location_of_first_error() {
        let err = parse("const a = 1;\nconst b = <div>;\n").unwrap_err();
        assert_eq!(err.path, PathBuf::from("src/App.tsx"));
        assert!(err.line >= 2, "line was {}", err.line);
        assert!(err.to_string().contains("src/App.tsx"));
    }

    #[test]
    fn javascript_dialect_accepts_jsx() {
        let parsed = SourceParser::new()
            .parse(
                "export default function A() { return <span/>; }",
                "a.jsx",
                ParseOptions {
                    dialect: Dialect::JavaScript,
                    jsx: false,
                },
            )
            .unwrap();
        assert_eq!(parsed.nodes_of_kind("jsx_self_closing_element").len(), 1);
    }

    #[test]
    fn plain_typescript_without_jsx() {
        let parsed = SourceParser::new()
            .parse(
                "const x = <number>y;",
                "a.ts",
                ParseOptions {
                    dialect: Dialect::TypeScript,
                    jsx: false,
                },
            )
            .unwrap();
        assert!(parsed.nodes_of_kind("jsx_element").is_empty());
    }

    #[test]
    fn parsing_is_deterministic() {
        let src = "import { A } from 'x';\nconst v = <A b={1} />;\n";
        let first = parse(src).unwrap();
        let second = parse(src).unwrap();
        assert_eq!(first.root().to_sexp(), second.root().to_sexp());
    }

    #[test]
    fn preorder_visits_root_first() {
        let parsed = parse("let a = 1;").unwrap();
        let nodes = parsed.nodes();
        assert_eq!(nodes[0].kind(), "program");
        assert!(nodes.iter().any(|n| n.kind() == "number"));
    }

    #[test]
    fn preorder_stays_within_subtree() {
        let parsed = parse("let a = 1;\nlet b = 2;").unwrap();
        let mut cursor = parsed.root().walk();
        let first = parsed.root().named_children(&mut cursor).next().unwrap();
        let inner = preorder(first);
        assert!(inner.iter().all(|n| n.end_byte() <= first.end_byte()));
    }
}
