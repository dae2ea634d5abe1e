//! Attribute renames.
//!
//! Matches are taken from the `jsx_attribute` nodes of a parse. Files that do
//! not parse fall back to a regex that requires an attribute value opener
//! after the `=`, so these rules never fail on malformed input.

use crate::types::{line_column, ChangeKind, MigrationChange, MigrationResult};
use archbase_core::{ParseOptions, ParsedSource, SourceParser};
use regex::Regex;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// Renames a JSX attribute wherever it appears as `name=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRename {
    /// Attribute to rename.
    pub from: &'static str,
    /// New attribute name.
    pub to: &'static str,
}

impl AttributeRename {
    /// Creates a rename.
    #[must_use]
    pub const fn new(from: &'static str, to: &'static str) -> Self {
        Self { from, to }
    }

    /// The attribute name preceded by whitespace and followed by `=` and a value opener.
    fn pattern(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(
            r#"\s(?P<name>{})\s*=\s*[{{"']"#,
            regex::escape(self.from)
        ))
    }

    fn description(&self) -> String {
        format!("Updated {} to {}", self.from, self.to)
    }

    /// Name spans of matching attributes in a parsed file.
    fn attribute_spans(&self, parsed: &ParsedSource) -> Vec<Range<usize>> {
        let mut spans: Vec<Range<usize>> = parsed
            .nodes_of_kind("jsx_attribute")
            .into_iter()
            .filter_map(|attr| {
                let mut cursor = attr.walk();
                let name = attr.named_children(&mut cursor).next()?;
                (name.kind() == "property_identifier" && parsed.text(name) == self.from)
                    .then(|| name.start_byte()..name.end_byte())
            })
            .collect();
        spans.sort_by_key(|s| s.start);
        spans
    }

    /// Name spans found by text matching.
    fn text_spans(&self, code: &str) -> Result<Vec<Range<usize>>, regex::Error> {
        let re = self.pattern()?;
        Ok(re
            .captures_iter(code)
            .filter_map(|caps| caps.name("name").map(|m| m.range()))
            .collect())
    }
}

/// Applies `renames` in order, one change per renamed attribute.
#[must_use]
pub fn apply_renames(source: &str, path: &Path, renames: &[AttributeRename]) -> MigrationResult {
    let mut code = source.to_owned();
    let mut changes = Vec::new();

    for rename in renames {
        let spans = match SourceParser::new().parse(&code, path, ParseOptions::component()) {
            Ok(parsed) => rename.attribute_spans(&parsed),
            Err(e) => {
                debug!("{}: matching {} as text: {e}", path.display(), rename.from);
                match rename.text_spans(&code) {
                    Ok(spans) => spans,
                    Err(e) => {
                        return MigrationResult::failure(format!("Invalid pattern for {}: {e}", rename.from))
                    }
                }
            }
        };

        for span in &spans {
            let (line, column) = line_column(&code, span.start);
            changes.push(
                MigrationChange::new(ChangeKind::Replace, rename.description())
                    .at(line, column)
                    .with_text(format!("{}=", rename.from), format!("{}=", rename.to)),
            );
        }
        for span in spans.into_iter().rev() {
            code.replace_range(span, rename.to);
        }
    }

    MigrationResult::success(code, changes, Vec::new())
}
