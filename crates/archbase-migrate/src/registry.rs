//! The shipped migration rules.

use crate::datasource_v1_to_v2::DataSourceV1ToV2;
use crate::rule::{MigrationRule, Transform};
use crate::text_pattern::AttributeRename;
use archbase_core::Config;
use tracing::debug;

/// Id of the DataSource rewrite rule.
pub const DATASOURCE_V1_TO_V2: &str = "datasource-v1-to-v2";
/// Id of the form validation prop rule.
pub const FORM_VALIDATION_UPGRADE: &str = "form-validation-upgrade";
/// Id of the grid event handler rule.
pub const EVENT_HANDLER_UPGRADE: &str = "event-handler-upgrade";

/// Renames V1 DataSource factories and drops manual refresh calls.
#[must_use]
pub fn datasource_v1_to_v2() -> MigrationRule {
    MigrationRule {
        id: DATASOURCE_V1_TO_V2,
        name: "DataSource V1 to V2 Migration",
        description: "Migrates from ArchbaseDataSource to ArchbaseRemoteDataSource",
        from_version: "1.x",
        to_version: "2.x",
        component_names: vec![
            "ArchbaseEdit",
            "ArchbaseSelect",
            "ArchbaseTextArea",
            "ArchbaseDataGrid",
            "ArchbaseDataSource",
        ],
        transform: Transform::AstRewrite(Box::new(DataSourceV1ToV2)),
    }
}

/// Retargets form validation props.
#[must_use]
pub fn form_validation_upgrade() -> MigrationRule {
    MigrationRule {
        id: FORM_VALIDATION_UPGRADE,
        name: "Form Validation Upgrade",
        description: "Updates form validation patterns to V2",
        from_version: "1.x",
        to_version: "2.x",
        component_names: vec!["ArchbaseFormTemplate"],
        transform: Transform::TextPattern(vec![
            AttributeRename::new("validation", "validationRules"),
            AttributeRename::new("onValidationError", "onValidationFailed"),
        ]),
    }
}

/// Retargets grid event handler props.
#[must_use]
pub fn event_handler_upgrade() -> MigrationRule {
    MigrationRule {
        id: EVENT_HANDLER_UPGRADE,
        name: "Event Handler Upgrade",
        description: "Updates event handler patterns for V2",
        from_version: "1.x",
        to_version: "2.x",
        component_names: vec!["ArchbaseDataGrid", "ArchbaseFormTemplate"],
        transform: Transform::TextPattern(vec![
            AttributeRename::new("onRowClick", "onRowSelect"),
            AttributeRename::new("onCellClick", "onCellSelect"),
        ]),
    }
}

/// All shipped rules in registration order.
#[must_use]
pub fn default_rules() -> Vec<MigrationRule> {
    vec![
        datasource_v1_to_v2(),
        form_validation_upgrade(),
        event_handler_upgrade(),
    ]
}

/// Shipped rules minus those disabled in `config`.
#[must_use]
pub fn configured_rules(config: &Config) -> Vec<MigrationRule> {
    default_rules()
        .into_iter()
        .filter(|rule| {
            let enabled = config.is_rule_enabled(rule.id);
            if !enabled {
                debug!("Skipping disabled rule: {}", rule.id);
            }
            enabled
        })
        .collect()
}
