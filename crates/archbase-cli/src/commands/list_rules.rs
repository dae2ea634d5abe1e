//! List rules command implementation.

use archbase_migrate::registry::default_rules;
use archbase_patterns::recommendations::RULES;

/// Runs the list-rules command.
pub fn run() {
    println!("Migration rules:\n");
    println!("{:<26} {:<13} {:<10} Description", "Id", "Kind", "Versions");
    println!("{}", "-".repeat(90));

    for rule in default_rules() {
        println!(
            "{:<26} {:<13} {:<10} {}",
            rule.id,
            rule.kind(),
            format!("{}->{}", rule.from_version, rule.to_version),
            rule.description
        );
        println!("{:<26} components: {}", "", rule.component_names.join(", "));
    }

    println!("\nRecommendation rules:\n");
    for rule in RULES {
        println!("  {}", rule.id);
    }

    println!("\nDisable a migration rule in archbase.toml:");
    println!("  [rules.event-handler-upgrade]");
    println!("  enabled = false");
    println!("\nUse --rules to run specific rules, e.g.:");
    println!("  archbase migrate batch --rules datasource-v1-to-v2");
}
