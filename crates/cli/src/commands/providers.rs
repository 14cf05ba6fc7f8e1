use anyhow::{Context, Result};
use dexlens_core::config::ServiceConfig;
use dexlens_core::provider::default_provider_registry;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub name: String,
    pub description: String,
}

/// List program providers known to this binary.
pub fn list_providers_command(json: bool) -> Result<()> {
    let registry = default_provider_registry();
    let entries: Vec<ProviderInfo> = registry
        .names()
        .into_iter()
        .map(|name| {
            let description = match name.as_str() {
                "snapshot" => "Program models exported as JSON or YAML (.json, .yaml, .yml)"
                    .to_string(),
                other => format!("Provider '{}'", other),
            };
            ProviderInfo { name, description }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Providers: (none)");
        return Ok(());
    }

    println!("Providers:");
    for entry in entries {
        println!("- {}: {}", entry.name, entry.description);
    }

    Ok(())
}

/// Show the configuration read from the environment.
pub fn config_command(json: bool) -> Result<()> {
    let config = ServiceConfig::from_env().context("Failed to read configuration")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Configuration");
    println!("=============");
    println!("Address: {}", config.address());
    println!("Max instances: {}", config.max_instances);
    println!("Provider: {}", config.provider);
    Ok(())
}
