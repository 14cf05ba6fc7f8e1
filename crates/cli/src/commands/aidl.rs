use anyhow::{Context, Result};
use serde::Serialize;

use crate::commands::{open_instance, print_list};

#[derive(Debug, Serialize)]
pub struct AidlEntry {
    pub interface: String,
    pub implementation: Option<String>,
}

/// List every AIDL interface in the program with its implementation.
pub fn aidl_classes_command(input: &str, provider: Option<&str>, json: bool) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let names = instance.search_aidl_classes()?;
    let entries: Vec<AidlEntry> = names
        .iter()
        .map(|name| -> Result<AidlEntry> {
            let resolved = instance.aidl_interface(name, false)?;
            Ok(AidlEntry {
                interface: name.clone(),
                implementation: resolved.implementation().map(str::to_string),
            })
        })
        .collect::<Result<_>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("AIDL interfaces ({}):", entries.len());
    if entries.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for entry in entries {
        let implementation = entry.implementation.as_deref().unwrap_or("(no implementation)");
        println!("  - {} -> {}", entry.interface, implementation);
    }
    Ok(())
}

pub fn aidl_methods_command(
    input: &str,
    provider: Option<&str>,
    interface: &str,
    json: bool,
) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let methods = instance
        .aidl_methods(interface)
        .with_context(|| format!("Failed to get AIDL methods of {interface}"))?;
    print_list("AIDL methods", &methods, json)
}

pub fn aidl_impl_command(
    input: &str,
    provider: Option<&str>,
    interface: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let resolved = instance
        .aidl_interface(interface, force)
        .with_context(|| format!("Failed to resolve AIDL interface {interface}"))?;
    let implementation = resolved
        .implementation()
        .map(str::to_string)
        .with_context(|| format!("No implementation found for {}", resolved.interface_name()))?;
    super::print_value(&implementation, json)
}
