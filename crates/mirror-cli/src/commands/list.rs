//! The list-extensions command

use colored::Colorize;
use mirror_core::builtin::ALWAYS_ENABLED;
use mirror_core::{ExtensionDescriptor, ExtensionRegistry};
use serde_json::json;

use crate::error::Result;

/// Run the list-extensions command
pub fn run_list_extensions(as_json: bool) -> Result<()> {
    let registry = ExtensionRegistry::builtin();

    if as_json {
        let entries: Vec<_> = registry.iter().map(describe).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "Available Extensions".bold());
    println!();

    for descriptor in registry.iter() {
        let marker = if ALWAYS_ENABLED.contains(&descriptor.key()) {
            " (always enabled)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {:<34} {}{}", descriptor.key().green(), descriptor.name(), marker);
        for hook in descriptor.hook_points() {
            let methods: Vec<_> = descriptor
                .handlers(hook)
                .iter()
                .map(|handler| handler.method())
                .collect();
            println!("      {} {}", hook.name().cyan(), methods.join(", ").dimmed());
        }
    }

    println!();
    println!(
        "{} {} extensions available. Enable one with {}.",
        "Total:".dimmed(),
        registry.len(),
        "mirror build -e <key>".cyan()
    );
    Ok(())
}

fn describe(descriptor: &ExtensionDescriptor) -> serde_json::Value {
    let hooks: Vec<_> = descriptor.hook_points().collect();
    json!({
        "key": descriptor.key(),
        "name": descriptor.name(),
        "always_enabled": ALWAYS_ENABLED.contains(&descriptor.key()),
        "hooks": hooks,
    })
}
