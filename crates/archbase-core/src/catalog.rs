//! Static knowledge about the Archbase component library.

/// Canonical module the library is published under.
pub const LIBRARY_MODULE: &str = "@archbase/react";

/// Returns true if an import source refers to an Archbase module.
#[must_use]
pub fn is_archbase_module(source: &str) -> bool {
    source.contains("archbase")
}

/// Components whose JSX call sites are tracked.
pub const TRACKED_COMPONENTS: &[&str] = &[
    "ArchbaseEdit",
    "ArchbaseSelect",
    "ArchbaseDataTable",
    "ArchbaseFormTemplate",
    "ArchbaseDataGrid",
    "ArchbaseRemoteDataSource",
    "ArchbaseLocalDataSource",
    "ArchbaseCheckbox",
    "ArchbaseRadio",
    "ArchbaseSwitch",
    "ArchbaseSlider",
    "ArchbaseTextArea",
    "ArchbasePasswordInput",
    "ArchbaseNumberInput",
    "ArchbaseDatePicker",
    "ArchbaseTimePicker",
    "ArchbaseColorPicker",
    "ArchbaseFileUpload",
    "ArchbaseImageUpload",
    "ArchbaseRichTextEditor",
    "ArchbaseCodeEditor",
    "ArchbaseMarkdownEditor",
    "ArchbaseTagInput",
    "ArchbaseAutocomplete",
    "ArchbaseMultiSelect",
    "ArchbaseTreeSelect",
    "ArchbaseAsyncSelect",
    "ArchbaseButton",
    "ArchbaseIconButton",
    "ArchbaseModal",
    "ArchbaseDrawer",
    "ArchbasePopover",
    "ArchbaseTooltip",
    "ArchbaseNotification",
    "ArchbaseAlert",
    "ArchbaseLoading",
    "ArchbaseSkeleton",
];

/// Returns true if `name` is a tracked component.
#[must_use]
pub fn is_tracked(name: &str) -> bool {
    TRACKED_COMPONENTS.contains(&name)
}

/// Components that have a V2-aware replacement and are therefore migration candidates.
pub const V2_EQUIVALENTS: &[&str] = &[
    "ArchbaseEdit",
    "ArchbaseSelect",
    "ArchbaseTextArea",
    "ArchbaseCheckbox",
    "ArchbaseRadio",
    "ArchbaseSwitch",
    "ArchbaseNumberInput",
    "ArchbasePasswordInput",
    "ArchbaseDatePicker",
    "ArchbaseMultiSelect",
    "ArchbaseAutocomplete",
    "ArchbaseDataGrid",
    "ArchbaseDataTable",
    "ArchbaseFormTemplate",
];

/// Returns true if the component has a V2 equivalent.
#[must_use]
pub fn has_v2_equivalent(name: &str) -> bool {
    V2_EQUIVALENTS.contains(&name)
}

/// Factories and hooks producing a legacy synchronous DataSource.
pub const V1_FACTORIES: &[&str] = &["ArchbaseDataSource", "useArchbaseDataSource"];

/// Factories and hooks producing a remote/reactive DataSource.
pub const V2_FACTORIES: &[&str] = &[
    "ArchbaseRemoteDataSource",
    "useArchbaseRemoteDataSource",
    "ArchbaseDataSourceV2",
    "useArchbaseDataSourceV2",
];

/// Methods that only exist on V2 DataSources.
pub const V2_ONLY_METHODS: &[&str] = &[
    "appendToFieldArray",
    "updateFieldArrayItem",
    "removeFromFieldArray",
];

/// Props that bind a component to a DataSource.
pub const DATA_SOURCE_PROPS: &[&str] = &["dataSource", "dataField"];

/// Hooks that schedule side effects.
pub const SIDE_EFFECT_HOOKS: &[&str] = &["useEffect", "useLayoutEffect", "useInsertionEffect"];

/// Per-component issue rules.
#[derive(Debug, Clone, Copy)]
pub struct ComponentRules {
    /// Component name.
    pub name: &'static str,
    /// Props that must be present.
    pub required: &'static [&'static str],
    /// Deprecated props with the reason shown to the user.
    pub deprecated: &'static [(&'static str, &'static str)],
    /// Props with a preferred replacement, as `(old, new)`.
    pub replaced: &'static [(&'static str, &'static str)],
}

const FORCE_UPDATE: (&str, &str) = (
    "forceUpdate",
    "forceUpdate is not needed with reactive DataSources",
);

const RULES: &[ComponentRules] = &[
    ComponentRules {
        name: "ArchbaseEdit",
        required: &["dataSource", "dataField"],
        deprecated: &[FORCE_UPDATE],
        replaced: &[],
    },
    ComponentRules {
        name: "ArchbaseSelect",
        required: &["dataSource", "dataField"],
        deprecated: &[FORCE_UPDATE],
        replaced: &[],
    },
    ComponentRules {
        name: "ArchbaseTextArea",
        required: &["dataSource", "dataField"],
        deprecated: &[FORCE_UPDATE],
        replaced: &[],
    },
    ComponentRules {
        name: "ArchbaseCheckbox",
        required: &["dataSource", "dataField"],
        deprecated: &[FORCE_UPDATE],
        replaced: &[],
    },
    ComponentRules {
        name: "ArchbaseDataGrid",
        required: &["dataSource"],
        deprecated: &[FORCE_UPDATE],
        replaced: &[("onRowClick", "onRowSelect"), ("onCellClick", "onCellSelect")],
    },
    ComponentRules {
        name: "ArchbaseFormTemplate",
        required: &["dataSource"],
        deprecated: &[FORCE_UPDATE],
        replaced: &[
            ("validation", "validationRules"),
            ("onValidationError", "onValidationFailed"),
        ],
    },
    ComponentRules {
        name: "ArchbaseRemoteDataSource",
        required: &["url"],
        deprecated: &[],
        replaced: &[],
    },
    ComponentRules {
        name: "ArchbaseModal",
        required: &["opened"],
        deprecated: &[],
        replaced: &[],
    },
];

/// Issue rules for a component, if any are defined.
#[must_use]
pub fn rules_for(name: &str) -> Option<&'static ComponentRules> {
    RULES.iter().find(|r| r.name == name)
}

/// Returns true if the component declares `prop` as required.
#[must_use]
pub fn is_required_prop(component: &str, prop: &str) -> bool {
    rules_for(component).is_some_and(|r| r.required.contains(&prop))
}

/// Form field type produced by an editor component inside a form template.
#[must_use]
pub fn field_type(component: &str) -> Option<&'static str> {
    let ty = match component {
        "ArchbaseEdit" => "text",
        "ArchbasePasswordInput" => "password",
        "ArchbaseTextArea" | "ArchbaseRichTextEditor" | "ArchbaseMarkdownEditor" => "textarea",
        "ArchbaseNumberInput" | "ArchbaseSlider" => "number",
        "ArchbaseSelect" | "ArchbaseAsyncSelect" | "ArchbaseTreeSelect" => "select",
        "ArchbaseMultiSelect" | "ArchbaseTagInput" => "multiselect",
        "ArchbaseAutocomplete" => "autocomplete",
        "ArchbaseCheckbox" | "ArchbaseSwitch" => "checkbox",
        "ArchbaseRadio" => "radio",
        "ArchbaseDatePicker" => "date",
        "ArchbaseTimePicker" => "time",
        "ArchbaseColorPicker" => "color",
        "ArchbaseFileUpload" | "ArchbaseImageUpload" => "file",
        _ => return None,
    };
    Some(ty)
}

/// A project-level composition pattern.
#[derive(Debug, Clone, Copy)]
pub struct ProjectPattern {
    /// Pattern tag.
    pub name: &'static str,
    /// Components whose joint presence marks the pattern as detected.
    pub components: &'static [&'static str],
    /// Short description.
    pub description: &'static str,
}

/// Known project-level patterns in reporting order.
pub const PROJECT_PATTERNS: &[ProjectPattern] = &[
    ProjectPattern {
        name: "form-with-datasource",
        components: &["ArchbaseFormTemplate", "ArchbaseRemoteDataSource"],
        description: "Form with DataSource integration",
    },
    ProjectPattern {
        name: "crud-with-datagrid",
        components: &["ArchbaseDataGrid", "ArchbaseRemoteDataSource"],
        description: "CRUD interface with DataGrid",
    },
    ProjectPattern {
        name: "async-loading",
        components: &["ArchbaseLoading", "ArchbaseAsyncSelect"],
        description: "Async operations with loading states",
    },
    ProjectPattern {
        name: "validation-with-feedback",
        components: &["ArchbaseFormTemplate", "ArchbaseAlert"],
        description: "Form validation with user feedback",
    },
];

/// Packages an Archbase project is expected to declare.
pub const RECOMMENDED_DEPENDENCIES: &[&str] =
    &["@mantine/core", "@mantine/hooks", "@emotion/react", "react-query"];
