//! Migration result types.

use serde::{Deserialize, Serialize};

/// Kind of a single source change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Text replaced in place.
    Replace,
    /// Text inserted.
    Add,
    /// Text removed.
    Remove,
    /// Text updated otherwise.
    Update,
}

/// One substitution or syntax-tree edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationChange {
    /// Change kind.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// What changed.
    pub description: String,
    /// Line in the input text (1-indexed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Column in the input text (0-indexed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Replaced text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Replacement text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl MigrationChange {
    /// Creates a change without location.
    #[must_use]
    pub fn new(kind: ChangeKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            line: None,
            column: None,
            before: None,
            after: None,
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Records the replaced and replacement text.
    #[must_use]
    pub fn with_text(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self.after = Some(after.into());
        self
    }
}

/// Outcome of running one rule, or a whole pipeline, on a file.
///
/// `code` is present iff `success`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Whether output text was produced.
    pub success: bool,
    /// Output text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Changes in application order.
    pub changes: Vec<MigrationChange>,
    /// Rule failures.
    pub errors: Vec<String>,
    /// Changes that need manual review.
    pub warnings: Vec<String>,
}

impl MigrationResult {
    /// A successful result.
    #[must_use]
    pub fn success(code: String, changes: Vec<MigrationChange>, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            code: Some(code),
            changes,
            errors: Vec::new(),
            warnings,
        }
    }

    /// A failed result with one error.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            code: None,
            changes: Vec::new(),
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }

    /// Returns true if the result carries output text that differs from the input.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.success && !self.changes.is_empty()
    }
}

/// 1-indexed line and 0-indexed byte column of `offset` in `text`.
#[must_use]
pub fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let head = &text.as_bytes()[..offset.min(text.len())];
    let line = head.iter().filter(|b| **b == b'\n').count() + 1;
    let column = head.iter().rev().take_while(|b| **b != b'\n').count();
    (line, column)
}
