//! Migration rules and their two transform kinds.

use crate::text_pattern::{self, AttributeRename};
use crate::types::MigrationResult;
use std::path::Path;

/// A syntax-tree based rewriter.
///
/// Implementations must be pure functions of the input text and path.
pub trait AstRewriter: Send + Sync {
    /// Rewrites `source`. A parse failure is reported as a failed result.
    fn rewrite(&self, source: &str, path: &Path) -> MigrationResult;
}

/// Type alias for boxed rewriters.
pub type RewriterBox = Box<dyn AstRewriter>;

/// How a rule transforms text.
pub enum Transform {
    /// Ordered attribute renames executed as regex substitutions.
    TextPattern(Vec<AttributeRename>),
    /// Syntax-tree rewriting.
    AstRewrite(RewriterBox),
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TextPattern(renames) => f.debug_tuple("TextPattern").field(renames).finish(),
            Self::AstRewrite(_) => f.write_str("AstRewrite(..)"),
        }
    }
}

/// A named, versioned source transformation.
#[derive(Debug)]
pub struct MigrationRule {
    /// Stable identifier, used in configuration and reports.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// What the rule does.
    pub description: &'static str,
    /// Source library version.
    pub from_version: &'static str,
    /// Target library version.
    pub to_version: &'static str,
    /// Components whose presence makes the rule applicable.
    pub component_names: Vec<&'static str>,
    /// The transform.
    pub transform: Transform,
}

impl MigrationRule {
    /// Returns true if `component` is one of the rule's components.
    #[must_use]
    pub fn targets(&self, component: &str) -> bool {
        self.component_names.contains(&component)
    }

    /// Returns true if `code` mentions any of the rule's components.
    #[must_use]
    pub fn mentioned_in(&self, code: &str) -> bool {
        self.component_names.iter().any(|c| code.contains(c))
    }

    /// Short label for the transform kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.transform {
            Transform::TextPattern(_) => "text-pattern",
            Transform::AstRewrite(_) => "ast-rewrite",
        }
    }

    /// Runs the transform on `source`.
    #[must_use]
    pub fn apply(&self, source: &str, path: &Path) -> MigrationResult {
        match &self.transform {
            Transform::TextPattern(renames) => text_pattern::apply_renames(source, path, renames),
            Transform::AstRewrite(rewriter) => rewriter.rewrite(source, path),
        }
    }
}
