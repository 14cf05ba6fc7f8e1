use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use dexlens_core::config::ServiceConfig;
use dexlens_core::instance::ProgramInstance;
use dexlens_core::provider::{default_provider_registry, ProgramProvider};
use dexlens_core::signature::extract_class_fqn;
use serde::Serialize;

use crate::canonicalize_or_current;

/// Id given to the single instance a CLI invocation works with.
pub const CLI_INSTANCE_ID: &str = "cli";

/// Resolve a provider by name, defaulting to the configured one.
pub fn resolve_provider(name: Option<&str>) -> Result<Arc<dyn ProgramProvider>> {
    let registry = default_provider_registry();
    let name = match name {
        Some(n) => n.to_string(),
        None => ServiceConfig::from_env().context("Failed to read configuration")?.provider,
    };
    registry.get(&name).ok_or_else(|| {
        anyhow!("Unknown provider '{}'. Available: {}", name, registry.names().join(", "))
    })
}

/// Load `input` (a file or a directory of inputs) into a fresh instance.
pub fn open_instance(input: &str, provider: Option<&str>) -> Result<ProgramInstance> {
    let path = canonicalize_or_current(input)?;
    let provider = resolve_provider(provider)?;
    let mut instance = ProgramInstance::new(CLI_INSTANCE_ID, &path, provider);
    let loaded = if path.is_dir() { instance.load_dir() } else { instance.load() };
    loaded.with_context(|| format!("Failed to load program from {}", path.display()))?;
    Ok(instance)
}

/// Owning class for a member command: the explicit `--class`, or the class
/// named by the member signature itself.
pub fn member_owner(class: Option<&str>, member: &str) -> Result<String> {
    match class {
        Some(c) => Ok(c.to_string()),
        None => extract_class_fqn(member)
            .with_context(|| format!("Cannot determine the class of '{member}'; pass --class")),
    }
}

/// Print a list either as pretty JSON or one entry per line.
pub fn print_list(label: &str, items: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    println!("{label} ({}):", items.len());
    if items.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for item in items {
        println!("  - {item}");
    }
    Ok(())
}

/// Print a single value, JSON-encoded when requested.
pub fn print_value<T: Serialize + std::fmt::Display>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}
