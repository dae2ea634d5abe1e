//! Pattern tagging predicates.
//!
//! Each predicate is an independent `(tag, test)` pair evaluated against a
//! [`UsageContext`]. New tags are added by registering another predicate.

use crate::catalog;
use crate::types::{DataSourceVersion, PropInfo, PropType};
use std::collections::BTreeSet;

/// Everything a predicate may inspect about one call site.
#[derive(Debug, Clone, Copy)]
pub struct UsageContext<'a> {
    /// Component name.
    pub name: &'a str,
    /// Props in source order.
    pub props: &'a [PropInfo],
    /// Whether a DataSource prop is present.
    pub has_data_source: bool,
    /// Resolved DataSource version.
    pub version: DataSourceVersion,
    /// Hooks called in the enclosing component function.
    pub scope_hooks: &'a BTreeSet<String>,
    /// Callee names of calls wrapping the element, innermost first.
    pub wrappers: &'a [String],
    /// Whether the file constructs a remote/reactive DataSource.
    pub file_uses_v2: bool,
}

impl UsageContext<'_> {
    /// Returns the prop with the given name.
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&PropInfo> {
        self.props.iter().find(|p| p.name == name)
    }

    /// Returns true if the prop is present.
    #[must_use]
    pub fn has_prop(&self, name: &str) -> bool {
        self.prop(name).is_some()
    }

    /// Returns true if any of the hooks is called in the enclosing function.
    #[must_use]
    pub fn uses_any_hook(&self, hooks: &[&str]) -> bool {
        hooks.iter().any(|h| self.scope_hooks.contains(*h))
    }

    /// Returns true if a wrapping call has one of the given names.
    #[must_use]
    pub fn wrapped_by(&self, names: &[&str]) -> bool {
        self.wrappers.iter().any(|w| names.contains(&w.as_str()))
    }
}

/// A named boolean test over a call site.
#[derive(Debug, Clone, Copy)]
pub struct PatternPredicate {
    /// Tag emitted when the test passes.
    pub name: &'static str,
    /// The test.
    pub test: fn(&UsageContext<'_>) -> bool,
}

impl PatternPredicate {
    /// Creates a predicate.
    #[must_use]
    pub const fn new(name: &'static str, test: fn(&UsageContext<'_>) -> bool) -> Self {
        Self { name, test }
    }
}

/// Error-handling props checked by `validation-with-feedback`.
pub const ERROR_HANDLER_PROPS: &[&str] = &["onValidationError", "onValidationFailed", "onError"];

fn form_with_datasource(ctx: &UsageContext<'_>) -> bool {
    ctx.name == "ArchbaseFormTemplate" && ctx.has_prop("dataSource")
}

fn crud_with_datagrid(ctx: &UsageContext<'_>) -> bool {
    ctx.name == "ArchbaseDataGrid" && (ctx.version == DataSourceVersion::V2 || ctx.file_uses_v2)
}

fn async_loading(ctx: &UsageContext<'_>) -> bool {
    ctx.name.contains("Async") || ctx.has_prop("loading") || ctx.has_prop("isLoading")
}

fn validation_with_feedback(ctx: &UsageContext<'_>) -> bool {
    ERROR_HANDLER_PROPS
        .iter()
        .filter_map(|p| ctx.prop(p))
        .any(|p| p.prop_type == PropType::Variable)
}

fn stateful(ctx: &UsageContext<'_>) -> bool {
    ctx.uses_any_hook(&["useState", "useReducer"])
}

fn with_effects(ctx: &UsageContext<'_>) -> bool {
    ctx.uses_any_hook(catalog::SIDE_EFFECT_HOOKS)
}

fn memoized(ctx: &UsageContext<'_>) -> bool {
    ctx.uses_any_hook(&["useMemo", "useCallback"]) || ctx.wrapped_by(&["memo"])
}

fn with_ref(ctx: &UsageContext<'_>) -> bool {
    ctx.uses_any_hook(&["useRef"]) || ctx.wrapped_by(&["forwardRef"])
}

fn data_bound(ctx: &UsageContext<'_>) -> bool {
    ctx.has_prop("dataSource") && ctx.has_prop("dataField")
}

/// The default predicate battery, in tag order.
#[must_use]
pub fn default_predicates() -> Vec<PatternPredicate> {
    vec![
        PatternPredicate::new("form-with-datasource", form_with_datasource),
        PatternPredicate::new("crud-with-datagrid", crud_with_datagrid),
        PatternPredicate::new("async-loading", async_loading),
        PatternPredicate::new("validation-with-feedback", validation_with_feedback),
        PatternPredicate::new("stateful", stateful),
        PatternPredicate::new("with-effects", with_effects),
        PatternPredicate::new("memoized", memoized),
        PatternPredicate::new("with-ref", with_ref),
        PatternPredicate::new("data-bound", data_bound),
    ]
}

/// Evaluates every predicate and returns the passing tags without duplicates.
#[must_use]
pub fn tag(predicates: &[PatternPredicate], ctx: &UsageContext<'_>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for p in predicates {
        if (p.test)(ctx) && !tags.iter().any(|t| t == p.name) {
            tags.push(p.name.to_owned());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, prop_type: PropType) -> PropInfo {
        PropInfo {
            name: name.into(),
            prop_type,
            value: None,
            is_required: None,
        }
    }

    fn ctx<'a>(
        name: &'a str,
        props: &'a [PropInfo],
        hooks: &'a BTreeSet<String>,
        wrappers: &'a [String],
    ) -> UsageContext<'a> {
        UsageContext {
            name,
            props,
            has_data_source: props.iter().any(|p| p.name == "dataSource"),
            version: DataSourceVersion::Unknown,
            scope_hooks: hooks,
            wrappers,
            file_uses_v2: false,
        }
    }

    #[test]
    fn named_error_handler_tags_feedback() {
        let hooks = BTreeSet::new();
        let props = [prop("onValidationError", PropType::Variable)];
        let tags = tag(&default_predicates(), &ctx("ArchbaseFormTemplate", &props, &hooks, &[]));
        assert_eq!(tags, vec!["validation-with-feedback"]);
    }

    #[test]
    fn inline_error_handler_is_not_feedback() {
        let hooks = BTreeSet::new();
        let props = [prop("onValidationError", PropType::Function)];
        let tags = tag(&default_predicates(), &ctx("ArchbaseFormTemplate", &props, &hooks, &[]));
        assert!(tags.is_empty());
    }

    #[test]
    fn hooks_drive_independent_tags() {
        let hooks: BTreeSet<String> = ["useState", "useEffect", "useRef"]
            .into_iter()
            .map(String::from)
            .collect();
        let props = [
            prop("dataSource", PropType::Variable),
            prop("dataField", PropType::String),
        ];
        let tags = tag(&default_predicates(), &ctx("ArchbaseEdit", &props, &hooks, &[]));
        assert_eq!(tags, vec!["stateful", "with-effects", "with-ref", "data-bound"]);
    }

    #[test]
    fn memo_wrapper_tags_memoized() {
        let hooks = BTreeSet::new();
        let wrappers = vec!["memo".to_owned()];
        let tags = tag(&default_predicates(), &ctx("ArchbaseButton", &[], &hooks, &wrappers));
        assert_eq!(tags, vec!["memoized"]);
    }

    #[test]
    fn duplicate_names_are_collapsed() {
        let hooks = BTreeSet::new();
        let always = PatternPredicate::new("x", |_| true);
        let tags = tag(&[always, always], &ctx("A", &[], &hooks, &[]));
        assert_eq!(tags, vec!["x"]);
    }
}
