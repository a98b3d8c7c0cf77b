//! List supported agents

use colored::*;
use eyre::Result;

use crate::registry;

pub fn run() -> Result<()> {
    for spec in registry::list() {
        let modes: Vec<String> = spec.rule_modes.iter().map(|m| m.to_string()).collect();
        println!(
            "  {:<10} {} ({}, rules: {})",
            spec.id.bold(),
            spec.display_name,
            spec.dialect,
            modes.join("/")
        );
    }
    Ok(())
}
